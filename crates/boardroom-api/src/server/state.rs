#[derive(Clone)]
struct AppState {
    inner: std::sync::Arc<Mutex<ServerInner>>,
    stream_tx: broadcast::Sender<StreamMessage>,
}

impl AppState {
    fn new() -> Self {
        let (stream_tx, _) = broadcast::channel(4096);
        Self {
            inner: std::sync::Arc::new(Mutex::new(ServerInner::default())),
            stream_tx,
        }
    }
}

#[derive(Debug, Default)]
struct ServerInner {
    api: Option<GameApi>,
    emitted_event_count: usize,
    emitted_version: u64,
}

fn require_game<'a>(inner: &'a ServerInner, game_id: &str) -> Result<&'a GameApi, HttpApiError> {
    match inner.api.as_ref() {
        Some(api) if api.game_id() == game_id => Ok(api),
        Some(api) => Err(HttpApiError::game_not_found(game_id, Some(api.game_id()))),
        None => Err(HttpApiError::game_not_found(game_id, None)),
    }
}

fn require_game_mut<'a>(
    inner: &'a mut ServerInner,
    game_id: &str,
) -> Result<&'a mut GameApi, HttpApiError> {
    require_game(inner, game_id)?;
    inner
        .api
        .as_mut()
        .ok_or_else(|| HttpApiError::game_not_found(game_id, None))
}

fn collect_delta_messages(inner: &mut ServerInner) -> Vec<StreamMessage> {
    let Some(api) = inner.api.as_ref() else {
        return Vec::new();
    };

    let mut messages = Vec::new();
    let pending = &api.audit_events()[inner.emitted_event_count..];
    for event in pending {
        messages.push(StreamMessage::event_appended(event, api.version()));
    }
    inner.emitted_event_count = api.audit_events().len();

    if api.version() != inner.emitted_version {
        messages.push(StreamMessage::state_changed(api.state(), api.version()));
        inner.emitted_version = api.version();
    }

    if let Some(last_error) = api.last_audit_error() {
        messages.push(StreamMessage::warning(
            api.game_id(),
            api.version(),
            last_error.to_string(),
        ));
    }

    messages
}

fn broadcast_messages(state: &AppState, messages: Vec<StreamMessage>) {
    for message in messages {
        let _ = state.stream_tx.send(message);
    }
}
