async fn get_state(
    Path(game_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let response = {
        let inner = state.inner.lock().await;
        let api = require_game(&inner, &game_id)?;

        QueryResponse {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            query_type: "game.state".to_string(),
            game_id: game_id.clone(),
            generated_at_version: api.version(),
            data: json!({
                "state": api.state(),
                "game_log": api.game_log(),
            }),
        }
    };

    Ok(Json(response))
}

async fn get_player(
    Path((game_id, player_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let response = {
        let inner = state.inner.lock().await;
        let api = require_game(&inner, &game_id)?;

        let Some(player) = api.player(&player_id) else {
            return Err(HttpApiError::invalid_query(
                "player_id not found in this game",
                Some(format!("player_id={player_id}")),
            ));
        };

        let holdings = api
            .state()
            .properties
            .iter()
            .filter(|property| property.owner_id.as_deref() == Some(player_id.as_str()))
            .map(|property| property.id.clone())
            .collect::<Vec<_>>();

        QueryResponse {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            query_type: "player.detail".to_string(),
            game_id: game_id.clone(),
            generated_at_version: api.version(),
            data: json!({
                "player": player,
                "board_holdings": holdings,
                "is_current_player": api.state().current_player_id() == Some(player_id.as_str()),
            }),
        }
    };

    Ok(Json(response))
}
