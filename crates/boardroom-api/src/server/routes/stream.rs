async fn stream_game(
    Path(game_id): Path<String>,
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, HttpApiError> {
    let hello = {
        let inner = state.inner.lock().await;
        let status = require_game(&inner, &game_id)?.status();
        StreamMessage::game_status(&status)
    };

    Ok(ws.on_upgrade(move |socket| stream_socket(socket, state, game_id, hello)))
}

async fn stream_socket(mut socket: WebSocket, state: AppState, game_id: String, hello: StreamMessage) {
    if send_stream_message(&mut socket, &hello).await.is_err() {
        return;
    }

    let mut rx = state.stream_tx.subscribe();

    loop {
        tokio::select! {
            frame = socket.recv() => {
                if !handle_client_frame(&mut socket, frame).await {
                    break;
                }
            }
            broadcasted = rx.recv() => {
                match broadcasted {
                    Ok(message) if message.game_id == game_id => {
                        if send_stream_message(&mut socket, &message).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        let notice = StreamMessage::warning(
                            &game_id,
                            0,
                            format!("stream client lagged and skipped {skipped} message(s)"),
                        );
                        if send_stream_message(&mut socket, &notice).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
}

/// Returns false once the client has gone away.
async fn handle_client_frame(
    socket: &mut WebSocket,
    frame: Option<Result<Message, axum::Error>>,
) -> bool {
    match frame {
        Some(Ok(Message::Ping(payload))) => socket.send(Message::Pong(payload)).await.is_ok(),
        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => false,
        Some(Ok(_)) => true,
    }
}

async fn send_stream_message(
    socket: &mut WebSocket,
    message: &StreamMessage,
) -> Result<(), axum::Error> {
    let payload = serde_json::to_string(message).map_err(axum::Error::new)?;
    socket.send(Message::Text(payload.into())).await
}

#[derive(Debug, Clone, Serialize)]
struct StreamMessage {
    schema_version: String,
    #[serde(rename = "type")]
    message_type: String,
    game_id: String,
    version: u64,
    sequence: Option<u64>,
    reconnect_token: String,
    payload: Value,
}

impl StreamMessage {
    fn envelope(
        message_type: &str,
        token_label: &str,
        game_id: &str,
        version: u64,
        sequence: Option<u64>,
        payload: Value,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            message_type: message_type.to_string(),
            game_id: game_id.to_string(),
            version,
            sequence,
            reconnect_token: reconnect_token(version, sequence, token_label),
            payload,
        }
    }

    fn game_status(status: &GameStatus) -> Self {
        Self::envelope(
            "game.status",
            "status",
            &status.game_id,
            status.version,
            None,
            json!(status),
        )
    }

    fn state_changed(state: &contracts::GameState, version: u64) -> Self {
        Self::envelope(
            "state.changed",
            "state",
            &state.game_id,
            version,
            None,
            json!(state),
        )
    }

    fn event_appended(event: &AuditEvent, version: u64) -> Self {
        Self::envelope(
            "event.appended",
            "event",
            &event.game_id,
            version,
            Some(event.sequence),
            json!(event),
        )
    }

    fn action_result(entry: &PersistedActionEntry, version: u64) -> Self {
        Self::envelope(
            "action.result",
            "action",
            &entry.action.game_id,
            version,
            None,
            json!({
                "action": entry.action,
                "result": entry.result,
            }),
        )
    }

    fn warning(game_id: &str, version: u64, warning: String) -> Self {
        Self::envelope(
            "warning",
            "warning",
            game_id,
            version,
            None,
            json!({ "message": warning }),
        )
    }
}
