#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SubmitActionRequest {
    Raw(Action),
    Wrapped { action: Action },
}

impl SubmitActionRequest {
    fn into_action(self) -> Action {
        match self {
            Self::Raw(action) => action,
            Self::Wrapped { action } => action,
        }
    }
}

async fn submit_action(
    Path(game_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<SubmitActionRequest>,
) -> Result<Json<contracts::ActionResult>, HttpApiError> {
    let action = request.into_action();
    if action.game_id != game_id {
        return Err(HttpApiError::invalid_action(ApiError::new(
            ErrorCode::ValidationError,
            "action.game_id must match path game_id",
            Some(format!(
                "path_game_id={game_id} action_game_id={}",
                action.game_id
            )),
        )));
    }

    let (result, messages) = {
        let mut inner = state.inner.lock().await;
        let (result, entry, status) = {
            let api = require_game_mut(&mut inner, &game_id)?;
            let result = api.submit_action(action);
            let entry = api.action_log().last().cloned();
            let status = api.status();
            (result, entry, status)
        };

        let mut messages = Vec::new();
        if let Some(entry) = entry {
            messages.push(StreamMessage::action_result(&entry, status.version));
        }
        messages.extend(collect_delta_messages(&mut inner));
        messages.push(StreamMessage::game_status(&status));

        (result, messages)
    };

    broadcast_messages(&state, messages);

    Ok(Json(result))
}

#[derive(Debug, Deserialize, Default)]
struct PaginationQuery {
    cursor: Option<usize>,
    page_size: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ActionAuditPage {
    schema_version: String,
    game_id: String,
    cursor: usize,
    next_cursor: Option<usize>,
    entries: Vec<PersistedActionEntry>,
}

async fn get_actions(
    Path(game_id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<ActionAuditPage>, HttpApiError> {
    let response = {
        let inner = state.inner.lock().await;
        let api = require_game(&inner, &game_id)?;
        let entries = api.action_log();
        let (start, end, next_cursor) = paginate(entries.len(), query.cursor, query.page_size)?;

        ActionAuditPage {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            game_id: game_id.clone(),
            cursor: start,
            next_cursor,
            entries: entries[start..end].to_vec(),
        }
    };

    Ok(Json(response))
}

#[derive(Debug, Deserialize, Default)]
struct AuditLogQuery {
    before_sequence: Option<u64>,
    page_size: Option<usize>,
    event_type: Option<String>,
}

async fn get_log(
    Path(game_id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let response = {
        let inner = state.inner.lock().await;
        let api = require_game(&inner, &game_id)?;

        let limit = clamp_page_size(query.page_size);
        let event_type = parse_event_type_filter(query.event_type.as_deref())?;

        let events = api
            .audit_events_page(query.before_sequence, limit, event_type)
            .map_err(HttpApiError::from_persistence)?;

        // Cursor for the next (older) page; the list is newest first.
        let next_before_sequence = if events.len() == limit {
            events.last().map(|event| event.sequence)
        } else {
            None
        };

        QueryResponse {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            query_type: "audit.log".to_string(),
            game_id: game_id.clone(),
            generated_at_version: api.version(),
            data: json!({
                "count": events.len(),
                "next_before_sequence": next_before_sequence,
                "event_type": event_type,
                "events": events,
            }),
        }
    };

    Ok(Json(response))
}
