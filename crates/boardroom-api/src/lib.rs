//! In-process API facade with action validation, optimistic-concurrency
//! commits, and SQLite persistence.

mod persistence;
mod server;

use std::path::Path;

use boardroom_core::{apply_action, game_created_event, new_game, ActionError};
use contracts::{
    Action, ActionPayload, ActionResult, ActionType, ApiError, AuditEvent, ErrorCode, GameConfig,
    GamePhase, GameState, GameStatus, LogEntry, Player, SCHEMA_VERSION_V1,
};
use persistence::SqliteGameStore;
pub use persistence::{PersistedActionEntry, PersistedGameSummary, PersistenceError};
pub use server::{serve, ServerError};

#[derive(Debug)]
struct PersistenceState {
    store: SqliteGameStore,
    persisted_event_count: usize,
}

#[derive(Debug)]
pub struct GameApi {
    state: GameState,
    version: u64,
    action_audit: Vec<ActionResult>,
    action_log: Vec<PersistedActionEntry>,
    audit_events: Vec<AuditEvent>,
    persistence: Option<PersistenceState>,
    last_audit_error: Option<String>,
}

impl GameApi {
    pub fn from_config(config: &GameConfig) -> Result<Self, ApiError> {
        validate_config(config)?;
        let state = new_game(config);
        let opening_event = game_created_event(&state);
        Ok(Self {
            state,
            version: 1,
            action_audit: Vec::new(),
            action_log: Vec::new(),
            audit_events: vec![opening_event],
            persistence: None,
            last_audit_error: None,
        })
    }

    pub fn attach_sqlite_store(&mut self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let store = SqliteGameStore::open(path)?;
        self.persistence = Some(PersistenceState {
            store,
            persisted_event_count: 0,
        });
        Ok(())
    }

    /// Create the game row and the opening audit event. With
    /// `replace_existing_game` any prior row under this id is dropped
    /// first; without it an existing row is an error.
    pub fn initialize_game_storage(
        &mut self,
        replace_existing_game: bool,
    ) -> Result<(), PersistenceError> {
        let Some(persistence) = self.persistence.as_mut() else {
            return Err(PersistenceError::NotAttached);
        };

        let game_id = self.state.game_id.clone();
        if persistence.store.game_exists(&game_id)? {
            if replace_existing_game {
                persistence.store.delete_game(&game_id)?;
                persistence.persisted_event_count = 0;
            } else {
                return Err(PersistenceError::GameAlreadyExists(game_id));
            }
        }

        self.version = persistence.store.create_game(&self.state)?;
        persistence
            .store
            .append_events(&self.audit_events[persistence.persisted_event_count..])?;
        persistence.persisted_event_count = self.audit_events.len();
        self.last_audit_error = None;
        Ok(())
    }

    /// Validate, load the freshest committed state, apply, and commit
    /// conditionally. A lost race surfaces as a VERSION_CONFLICT
    /// rejection; the caller may reload and retry.
    pub fn submit_action(&mut self, action: Action) -> ActionResult {
        if let Some(error) = self.validate_action(&action) {
            return self.finish_rejected(action, error);
        }

        let expected_version = match self.refresh_from_store() {
            Ok(version) => version,
            Err(error) => return self.finish_rejected(action, error),
        };

        let outcome = match apply_action(&self.state, &action) {
            Ok(outcome) => outcome,
            Err(err) => {
                let error = action_error_to_api(err);
                return self.finish_rejected(action, error);
            }
        };

        let committed_version = if let Some(persistence) = self.persistence.as_mut() {
            match persistence.store.commit_game(&outcome.state, expected_version) {
                Ok(version) => version,
                Err(PersistenceError::VersionConflict { expected, .. }) => {
                    let error = ApiError::new(
                        ErrorCode::VersionConflict,
                        "game state was modified by another writer",
                        Some(format!("expected_version={expected}")),
                    );
                    return self.finish_rejected(action, error);
                }
                Err(err) => {
                    let error = ApiError::new(
                        ErrorCode::StorageFailure,
                        "failed to commit game state",
                        Some(err.to_string()),
                    );
                    return self.finish_rejected(action, error);
                }
            }
        } else {
            expected_version + 1
        };

        self.state = outcome.state;
        self.version = committed_version;
        self.audit_events.push(outcome.audit);
        self.flush_audit_events_if_enabled();

        let result = ActionResult::accepted(&action, committed_version);
        self.record(action, result.clone());
        result
    }

    pub fn status(&self) -> GameStatus {
        GameStatus {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            game_id: self.state.game_id.clone(),
            version: self.version,
            turn_count: self.state.turn_count,
            current_player_id: self
                .state
                .current_player_id()
                .unwrap_or_default()
                .to_string(),
            player_count: self.state.players.len(),
            phase: self.state.phase,
        }
    }

    pub fn game_id(&self) -> &str {
        &self.state.game_id
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.state.player(player_id)
    }

    /// In-game log, newest entry first.
    pub fn game_log(&self) -> Vec<LogEntry> {
        let mut entries = self.state.game_log.clone();
        entries.reverse();
        entries
    }

    pub fn action_audit(&self) -> &[ActionResult] {
        &self.action_audit
    }

    pub fn action_log(&self) -> &[PersistedActionEntry] {
        &self.action_log
    }

    pub fn audit_events(&self) -> &[AuditEvent] {
        &self.audit_events
    }

    /// Page of audit events, newest first. Reads from the store when
    /// attached so concurrent writers are visible.
    pub fn audit_events_page(
        &self,
        before_sequence: Option<u64>,
        limit: usize,
        event_type: Option<&str>,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        if let Some(persistence) = self.persistence.as_ref() {
            return persistence.store.load_events_page(
                &self.state.game_id,
                before_sequence,
                limit,
                event_type,
            );
        }

        let upper = before_sequence.unwrap_or(u64::MAX);
        let mut page = self
            .audit_events
            .iter()
            .filter(|event| event.sequence < upper)
            .filter(|event| event_type.map_or(true, |ty| event.event_type.as_str() == ty))
            .cloned()
            .collect::<Vec<_>>();
        page.sort_by(|a, b| b.sequence.cmp(&a.sequence));
        page.truncate(limit);
        Ok(page)
    }

    pub fn list_games(&self) -> Result<Vec<PersistedGameSummary>, PersistenceError> {
        let Some(persistence) = self.persistence.as_ref() else {
            return Err(PersistenceError::NotAttached);
        };
        persistence.store.list_games()
    }

    pub fn last_audit_error(&self) -> Option<&str> {
        self.last_audit_error.as_deref()
    }

    /// Re-read the committed row so the next apply starts from the
    /// freshest state another process may have written.
    fn refresh_from_store(&mut self) -> Result<u64, ApiError> {
        let Some(persistence) = self.persistence.as_ref() else {
            return Ok(self.version);
        };

        match persistence.store.load_game(&self.state.game_id) {
            Ok((state, version)) => {
                self.state = state;
                self.version = version;
                Ok(version)
            }
            Err(PersistenceError::GameNotFound(game_id)) => Err(ApiError::new(
                ErrorCode::GameNotFound,
                "game is not stored",
                Some(game_id),
            )),
            Err(err) => Err(ApiError::new(
                ErrorCode::StorageFailure,
                "failed to load game state",
                Some(err.to_string()),
            )),
        }
    }

    /// Audit writes are best effort: a failure is remembered but never
    /// turns an already-committed action into a rejection.
    fn flush_audit_events_if_enabled(&mut self) {
        let Some(persistence) = self.persistence.as_mut() else {
            return;
        };

        let pending = &self.audit_events[persistence.persisted_event_count..];
        match persistence.store.append_events(pending) {
            Ok(()) => {
                persistence.persisted_event_count = self.audit_events.len();
                self.last_audit_error = None;
            }
            Err(err) => {
                self.last_audit_error = Some(err.to_string());
            }
        }
    }

    fn finish_rejected(&mut self, action: Action, error: ApiError) -> ActionResult {
        let result = ActionResult::rejected(&action, error);
        self.record(action, result.clone());
        result
    }

    fn record(&mut self, action: Action, result: ActionResult) {
        self.action_audit.push(result.clone());
        let entry = PersistedActionEntry { action, result };
        if let Some(persistence) = self.persistence.as_mut() {
            if let Err(err) = persistence.store.record_action(&entry) {
                self.last_audit_error = Some(err.to_string());
            }
        }
        self.action_log.push(entry);
    }

    fn validate_action(&self, action: &Action) -> Option<ApiError> {
        if action.schema_version != SCHEMA_VERSION_V1 {
            return Some(ApiError::new(
                ErrorCode::ContractVersionUnsupported,
                "Unsupported schema_version",
                Some(format!(
                    "got={} expected={}",
                    action.schema_version, SCHEMA_VERSION_V1
                )),
            ));
        }

        if action.game_id != self.state.game_id {
            return Some(ApiError::new(
                ErrorCode::GameNotFound,
                "action.game_id does not match the active game",
                None,
            ));
        }

        if self.state.phase == GamePhase::Completed {
            return Some(ApiError::new(
                ErrorCode::ValidationError,
                "game is already completed",
                None,
            ));
        }

        if !action_type_matches_payload(action.action_type, &action.payload) {
            return Some(ApiError::new(
                ErrorCode::ValidationError,
                "action_type does not match payload variant",
                None,
            ));
        }

        None
    }
}

fn validate_config(config: &GameConfig) -> Result<(), ApiError> {
    if config.game_id.trim().is_empty() {
        return Err(ApiError::new(
            ErrorCode::ValidationError,
            "game_id must not be empty",
            None,
        ));
    }
    if config.players.len() < 2 {
        return Err(ApiError::new(
            ErrorCode::ValidationError,
            "a game requires at least two players",
            Some(format!("player_count={}", config.players.len())),
        ));
    }
    for (index, seed) in config.players.iter().enumerate() {
        if seed.user_id.trim().is_empty() {
            return Err(ApiError::new(
                ErrorCode::ValidationError,
                "player user_id must not be empty",
                Some(format!("index={index}")),
            ));
        }
        if config.players[..index]
            .iter()
            .any(|other| other.user_id == seed.user_id)
        {
            return Err(ApiError::new(
                ErrorCode::ValidationError,
                "player user_ids must be unique",
                Some(seed.user_id.clone()),
            ));
        }
    }
    Ok(())
}

fn action_type_matches_payload(action_type: ActionType, payload: &ActionPayload) -> bool {
    matches!(
        (action_type, payload),
        (ActionType::BuyProperty, ActionPayload::BuyProperty { .. })
            | (ActionType::CreateIpo, ActionPayload::CreateIpo { .. })
            | (ActionType::IssueDebt, ActionPayload::IssueDebt { .. })
            | (ActionType::SettleDebt, ActionPayload::SettleDebt { .. })
            | (
                ActionType::ExecuteTrade,
                ActionPayload::ExecuteTrade { .. }
            )
            | (
                ActionType::MakePayment,
                ActionPayload::MakePayment { .. }
            )
            | (ActionType::EndTurn, ActionPayload::EndTurn)
    )
}

fn action_error_to_api(err: ActionError) -> ApiError {
    match err {
        ActionError::Validation(message) => {
            ApiError::new(ErrorCode::ValidationError, message, None)
        }
        ActionError::InsufficientFunds {
            required,
            available,
        } => ApiError::new(
            ErrorCode::InsufficientFunds,
            "not enough cash to cover this action",
            Some(format!("required={required} available={available}")),
        ),
        ActionError::PropertyUnavailable(name) => ApiError::new(
            ErrorCode::PropertyUnavailable,
            "property is not open for purchase",
            Some(name),
        ),
        ActionError::DebtNotFound(debt_id) => ApiError::new(
            ErrorCode::DebtNotFound,
            "no such debt on this player",
            Some(debt_id),
        ),
        ActionError::NoAssetsSelected => ApiError::new(
            ErrorCode::NoAssetsSelected,
            "an IPO requires at least one backing asset",
            None,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::PlayerSeed;

    fn test_config() -> GameConfig {
        GameConfig::default()
    }

    fn temp_db_path(name: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();

        std::env::temp_dir().join(format!("boardroom_{name}_{nanos}.sqlite"))
    }

    fn cleanup_db(db_path: &std::path::Path) {
        let _ = std::fs::remove_file(db_path);
        let _ = std::fs::remove_file(db_path.with_extension("sqlite-wal"));
        let _ = std::fs::remove_file(db_path.with_extension("sqlite-shm"));
    }

    fn buy_action(api: &GameApi, seq: u32, actor: &str, property_id: &str, price: i64) -> Action {
        Action::new(
            format!("act_{seq:04}"),
            api.game_id(),
            actor,
            ActionType::BuyProperty,
            ActionPayload::BuyProperty {
                property_id: property_id.to_string(),
                price,
            },
        )
    }

    #[test]
    fn from_config_rejects_duplicate_players() {
        let mut config = test_config();
        config.players.push(PlayerSeed {
            user_id: "player_one".to_string(),
            name: "Imposter".to_string(),
        });
        let err = GameApi::from_config(&config).expect_err("duplicate id");
        assert_eq!(err.error_code, ErrorCode::ValidationError);
    }

    #[test]
    fn accepted_action_bumps_version_and_records_audit() {
        let mut api = GameApi::from_config(&test_config()).expect("valid config");
        assert_eq!(api.version(), 1);

        let result = api.submit_action(buy_action(&api, 1, "player_one", "prop_boardwalk", 400));
        assert!(result.accepted);
        assert_eq!(result.version, Some(2));
        assert_eq!(api.version(), 2);
        assert_eq!(api.audit_events().len(), 2, "game_created plus purchase");
        assert_eq!(api.action_audit().len(), 1);
    }

    #[test]
    fn rejects_mismatched_payload_type() {
        let mut api = GameApi::from_config(&test_config()).expect("valid config");
        let bad = Action::new(
            "act_bad",
            api.game_id(),
            "player_one",
            ActionType::EndTurn,
            ActionPayload::MakePayment {
                recipient_id: "player_two".to_string(),
                amount: 10,
            },
        );

        let result = api.submit_action(bad);
        assert!(!result.accepted);
        let error = result.error.expect("rejection carries an error");
        assert_eq!(error.error_code, ErrorCode::ValidationError);
    }

    #[test]
    fn rejects_wrong_game_id_and_schema_version() {
        let mut api = GameApi::from_config(&test_config()).expect("valid config");

        let wrong_game = Action::new(
            "act_wrong",
            "game_other",
            "player_one",
            ActionType::EndTurn,
            ActionPayload::EndTurn,
        );
        let result = api.submit_action(wrong_game);
        assert_eq!(
            result.error.expect("rejected").error_code,
            ErrorCode::GameNotFound
        );

        let mut stale = Action::new(
            "act_stale",
            api.game_id(),
            "player_one",
            ActionType::EndTurn,
            ActionPayload::EndTurn,
        );
        stale.schema_version = "0.9".to_string();
        let result = api.submit_action(stale);
        assert_eq!(
            result.error.expect("rejected").error_code,
            ErrorCode::ContractVersionUnsupported
        );
    }

    #[test]
    fn domain_errors_map_to_contract_codes() {
        let mut api = GameApi::from_config(&test_config()).expect("valid config");

        let result = api.submit_action(buy_action(&api, 1, "player_one", "prop_boardwalk", 9000));
        assert_eq!(
            result.error.expect("rejected").error_code,
            ErrorCode::InsufficientFunds
        );

        api.submit_action(buy_action(&api, 2, "player_one", "prop_boardwalk", 400));
        let result = api.submit_action(buy_action(&api, 3, "player_two", "prop_boardwalk", 400));
        assert_eq!(
            result.error.expect("rejected").error_code,
            ErrorCode::PropertyUnavailable
        );
    }

    #[test]
    fn persists_state_and_audit_events() {
        let db_path = temp_db_path("persist");
        let mut api = GameApi::from_config(&test_config()).expect("valid config");
        api.attach_sqlite_store(&db_path).expect("attach store");
        api.initialize_game_storage(false).expect("create game row");

        let result = api.submit_action(buy_action(&api, 1, "player_one", "prop_boardwalk", 400));
        assert!(result.accepted);
        assert!(api.last_audit_error().is_none());

        let page = api
            .audit_events_page(None, 10, None)
            .expect("page loads");
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].sequence, 1, "newest first");
        assert_eq!(page[1].sequence, 0);

        cleanup_db(&db_path);
    }

    #[test]
    fn initialize_twice_requires_replace_flag() {
        let db_path = temp_db_path("replace");
        let mut api = GameApi::from_config(&test_config()).expect("valid config");
        api.attach_sqlite_store(&db_path).expect("attach store");
        api.initialize_game_storage(false).expect("first create");

        let err = api
            .initialize_game_storage(false)
            .expect_err("second create must fail");
        assert!(matches!(err, PersistenceError::GameAlreadyExists(_)));

        api.initialize_game_storage(true)
            .expect("replace succeeds");

        cleanup_db(&db_path);
    }

    #[test]
    fn stale_commit_is_a_version_conflict() {
        let db_path = temp_db_path("conflict");
        let mut api = GameApi::from_config(&test_config()).expect("valid config");
        api.attach_sqlite_store(&db_path).expect("attach store");
        api.initialize_game_storage(false).expect("create game row");

        // A second writer commits against the same row first.
        let mut store = SqliteGameStore::open(&db_path).expect("second connection");
        let (state, version) = store.load_game(api.game_id()).expect("load");
        store.commit_game(&state, version).expect("first commit wins");

        let stale = store
            .commit_game(&state, version)
            .expect_err("stale version must not commit");
        assert!(matches!(
            stale,
            PersistenceError::VersionConflict { expected, .. } if expected == version
        ));

        cleanup_db(&db_path);
    }

    #[test]
    fn concurrent_buyers_one_owner() {
        let db_path = temp_db_path("race");
        let config = test_config();

        let mut first = GameApi::from_config(&config).expect("valid config");
        first.attach_sqlite_store(&db_path).expect("attach store");
        first.initialize_game_storage(false).expect("create game row");

        let mut second = GameApi::from_config(&config).expect("valid config");
        second.attach_sqlite_store(&db_path).expect("attach store");

        let won = first.submit_action(buy_action(&first, 1, "player_one", "prop_boardwalk", 400));
        assert!(won.accepted);

        // The loser reloads the committed state and sees the property taken.
        let lost =
            second.submit_action(buy_action(&second, 2, "player_two", "prop_boardwalk", 400));
        assert!(!lost.accepted);
        assert_eq!(
            lost.error.expect("rejected").error_code,
            ErrorCode::PropertyUnavailable
        );

        let owners = second
            .state()
            .properties
            .iter()
            .filter(|property| property.id == "prop_boardwalk")
            .filter_map(|property| property.owner_id.clone())
            .collect::<Vec<_>>();
        assert_eq!(owners, vec!["player_one".to_string()]);

        cleanup_db(&db_path);
    }
}
