#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CreateGameRequest {
    Config(GameConfig),
    WithOptions(CreateGameOptions),
}

#[derive(Debug, Deserialize)]
struct CreateGameOptions {
    config: GameConfig,
    sqlite_path: Option<String>,
    replace_existing: Option<bool>,
}

#[derive(Debug, Serialize)]
struct CreateGameResponse {
    schema_version: String,
    game_id: String,
    status: GameStatus,
    replaced_existing_game: bool,
}

#[derive(Debug, Deserialize, Default)]
struct ListGamesQuery {
    sqlite_path: Option<String>,
}

#[derive(Debug, Serialize)]
struct ListGamesResponse {
    schema_version: String,
    active_game_id: Option<String>,
    games: Vec<PersistedGameSummary>,
}

async fn list_games(
    State(state): State<AppState>,
    Query(query): Query<ListGamesQuery>,
) -> Result<Json<ListGamesResponse>, HttpApiError> {
    let sqlite_path = query
        .sqlite_path
        .filter(|path| !path.trim().is_empty())
        .unwrap_or_else(default_sqlite_path);

    let active_game_id = {
        let inner = state.inner.lock().await;
        inner.api.as_ref().map(|api| api.game_id().to_string())
    };

    let store = crate::persistence::SqliteGameStore::open(sqlite_path)
        .map_err(HttpApiError::from_persistence)?;
    let games = store.list_games().map_err(HttpApiError::from_persistence)?;

    Ok(Json(ListGamesResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        active_game_id,
        games,
    }))
}

async fn create_game(
    State(state): State<AppState>,
    Json(request): Json<CreateGameRequest>,
) -> Result<Json<CreateGameResponse>, HttpApiError> {
    let (config, sqlite_path, replace_existing) = match request {
        CreateGameRequest::Config(config) => (config, Some(default_sqlite_path()), true),
        CreateGameRequest::WithOptions(options) => (
            options.config,
            Some(
                options
                    .sqlite_path
                    .filter(|path| !path.trim().is_empty())
                    .unwrap_or_else(default_sqlite_path),
            ),
            options.replace_existing.unwrap_or(true),
        ),
    };

    let (response, messages) = {
        let mut inner = state.inner.lock().await;
        let replaced_existing_game = inner.api.is_some();

        let mut api = GameApi::from_config(&config).map_err(HttpApiError::invalid_action)?;
        if let Some(path) = sqlite_path {
            api.attach_sqlite_store(path)
                .map_err(HttpApiError::from_persistence)?;
            api.initialize_game_storage(replace_existing)
                .map_err(HttpApiError::from_persistence)?;
        }

        let status = api.status();
        inner.api = Some(api);
        inner.emitted_event_count = 0;
        inner.emitted_version = 0;

        let mut messages = Vec::new();
        if replaced_existing_game {
            messages.push(StreamMessage::warning(
                &status.game_id,
                status.version,
                "existing game state was replaced by POST /games".to_string(),
            ));
        }
        messages.extend(collect_delta_messages(&mut inner));
        messages.push(StreamMessage::game_status(&status));

        (
            CreateGameResponse {
                schema_version: SCHEMA_VERSION_V1.to_string(),
                game_id: status.game_id.clone(),
                status,
                replaced_existing_game,
            },
            messages,
        )
    };

    broadcast_messages(&state, messages);

    Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct GameStatusResponse {
    schema_version: String,
    game_id: String,
    status: GameStatus,
}

async fn get_status(
    Path(game_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<GameStatusResponse>, HttpApiError> {
    let response = {
        let inner = state.inner.lock().await;
        let status = require_game(&inner, &game_id)?.status();
        GameStatusResponse {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            game_id: status.game_id.clone(),
            status,
        }
    };

    Ok(Json(response))
}
