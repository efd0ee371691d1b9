use std::fmt;
use std::path::Path;

use contracts::{Action, ActionResult, AuditEvent, GameState};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedActionEntry {
    pub action: Action,
    pub result: ActionResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedGameSummary {
    pub game_id: String,
    pub version: u64,
    pub phase: String,
    pub updated_at: String,
}

#[derive(Debug)]
pub enum PersistenceError {
    Sqlite(rusqlite::Error),
    Serde(serde_json::Error),
    NotAttached,
    GameNotFound(String),
    GameAlreadyExists(String),
    VersionConflict { game_id: String, expected: u64 },
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Self::Serde(err) => write!(f, "serde error: {err}"),
            Self::NotAttached => write!(f, "sqlite store is not attached"),
            Self::GameNotFound(game_id) => write!(f, "game not found: {game_id}"),
            Self::GameAlreadyExists(game_id) => write!(f, "game already exists: {game_id}"),
            Self::VersionConflict { game_id, expected } => write!(
                f,
                "version conflict on game {game_id}: expected version {expected} was superseded"
            ),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

#[derive(Debug)]
pub struct SqliteGameStore {
    conn: Connection,
}

impl SqliteGameStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.configure()?;
        store.migrate()?;
        Ok(store)
    }

    pub fn game_exists(&self, game_id: &str) -> Result<bool, PersistenceError> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM games WHERE game_id = ?1",
                params![game_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn delete_game(&mut self, game_id: &str) -> Result<(), PersistenceError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM game_events WHERE game_id = ?1", params![game_id])?;
        tx.execute("DELETE FROM actions WHERE game_id = ?1", params![game_id])?;
        tx.execute("DELETE FROM games WHERE game_id = ?1", params![game_id])?;
        tx.commit()?;
        Ok(())
    }

    /// Insert a game at version 1. Fails when the row already exists;
    /// callers that want replacement delete first.
    pub fn create_game(&mut self, state: &GameState) -> Result<u64, PersistenceError> {
        if self.game_exists(&state.game_id)? {
            return Err(PersistenceError::GameAlreadyExists(state.game_id.clone()));
        }

        let state_json = serde_json::to_string(state)?;
        self.conn.execute(
            "INSERT INTO games (
                game_id,
                schema_version,
                version,
                phase,
                state_json,
                created_at,
                updated_at
             ) VALUES (?1, ?2, 1, ?3, ?4, ?5, ?5)",
            params![
                state.game_id.as_str(),
                state.schema_version.as_str(),
                format!("{:?}", state.phase),
                state_json,
                version_stamp(1),
            ],
        )?;
        Ok(1)
    }

    pub fn load_game(&self, game_id: &str) -> Result<(GameState, u64), PersistenceError> {
        let row: Option<(String, i64)> = self
            .conn
            .query_row(
                "SELECT state_json, version FROM games WHERE game_id = ?1",
                params![game_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((state_json, version)) = row else {
            return Err(PersistenceError::GameNotFound(game_id.to_string()));
        };

        let state = serde_json::from_str::<GameState>(&state_json)?;
        Ok((state, version.max(0) as u64))
    }

    /// Conditional write: the row is replaced only when its stored
    /// version still equals `expected_version`. Zero affected rows means
    /// another writer committed first and the caller must reload.
    pub fn commit_game(
        &mut self,
        state: &GameState,
        expected_version: u64,
    ) -> Result<u64, PersistenceError> {
        let state_json = serde_json::to_string(state)?;
        let next_version = expected_version + 1;
        let affected = self.conn.execute(
            "UPDATE games SET
                version = ?3,
                phase = ?4,
                state_json = ?5,
                updated_at = ?6
             WHERE game_id = ?1 AND version = ?2",
            params![
                state.game_id.as_str(),
                i64::try_from(expected_version).unwrap_or(i64::MAX),
                i64::try_from(next_version).unwrap_or(i64::MAX),
                format!("{:?}", state.phase),
                state_json,
                version_stamp(next_version),
            ],
        )?;

        if affected == 0 {
            if !self.game_exists(&state.game_id)? {
                return Err(PersistenceError::GameNotFound(state.game_id.clone()));
            }
            return Err(PersistenceError::VersionConflict {
                game_id: state.game_id.clone(),
                expected: expected_version,
            });
        }

        Ok(next_version)
    }

    pub fn record_action(&mut self, entry: &PersistedActionEntry) -> Result<(), PersistenceError> {
        let action_json = serde_json::to_string(&entry.action)?;
        let result_json = serde_json::to_string(&entry.result)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO actions (
                game_id,
                action_id,
                actor_id,
                accepted,
                action_json,
                result_json,
                created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.action.game_id.as_str(),
                entry.action.action_id.as_str(),
                entry.action.actor_id.as_str(),
                if entry.result.accepted { 1_i64 } else { 0_i64 },
                action_json,
                result_json,
                version_stamp(entry.result.version.unwrap_or(0)),
            ],
        )?;
        Ok(())
    }

    pub fn append_events(&mut self, events: &[AuditEvent]) -> Result<(), PersistenceError> {
        let tx = self.conn.transaction()?;
        for event in events {
            let payload_json = serde_json::to_string(event)?;
            tx.execute(
                "INSERT OR IGNORE INTO game_events (
                    game_id,
                    event_id,
                    sequence,
                    turn,
                    event_type,
                    actor_id,
                    payload_json,
                    created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    event.game_id.as_str(),
                    event.event_id.as_str(),
                    i64::try_from(event.sequence).unwrap_or(i64::MAX),
                    i64::try_from(event.turn).unwrap_or(i64::MAX),
                    event.event_type.as_str(),
                    event.actor_id.as_str(),
                    payload_json,
                    event.created_at.as_str(),
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Page of audit events in reverse chronological order. `before_sequence`
    /// is an exclusive upper bound used as the pagination cursor.
    pub fn load_events_page(
        &self,
        game_id: &str,
        before_sequence: Option<u64>,
        limit: usize,
        event_type: Option<&str>,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        let upper = before_sequence
            .map(|seq| i64::try_from(seq).unwrap_or(i64::MAX))
            .unwrap_or(i64::MAX);
        let type_filter = event_type.unwrap_or("%");

        let mut stmt = self.conn.prepare(
            "SELECT payload_json
             FROM game_events
             WHERE game_id = ?1 AND sequence < ?2 AND event_type LIKE ?3
             ORDER BY sequence DESC
             LIMIT ?4",
        )?;

        let rows = stmt.query_map(
            params![game_id, upper, type_filter, limit as i64],
            |row| row.get::<_, String>(0),
        )?;

        let mut events = Vec::new();
        for row in rows {
            let payload = row?;
            events.push(serde_json::from_str::<AuditEvent>(&payload)?);
        }

        Ok(events)
    }

    pub fn count_events(&self, game_id: &str) -> Result<u64, PersistenceError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM game_events WHERE game_id = ?1",
            params![game_id],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    pub fn list_games(&self) -> Result<Vec<PersistedGameSummary>, PersistenceError> {
        let mut stmt = self.conn.prepare(
            "SELECT game_id, version, phase, updated_at
             FROM games
             ORDER BY game_id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            let (game_id, version, phase, updated_at) = row?;
            summaries.push(PersistedGameSummary {
                game_id,
                version: version.max(0) as u64,
                phase,
                updated_at,
            });
        }

        Ok(summaries)
    }

    fn configure(&mut self) -> Result<(), PersistenceError> {
        self.conn.pragma_update(None, "journal_mode", "WAL")?;
        self.conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(())
    }

    fn migrate(&mut self) -> Result<(), PersistenceError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS games (
                game_id TEXT PRIMARY KEY,
                schema_version TEXT NOT NULL,
                version INTEGER NOT NULL,
                phase TEXT NOT NULL,
                state_json TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS actions (
                game_id TEXT NOT NULL,
                action_id TEXT NOT NULL,
                actor_id TEXT NOT NULL,
                accepted INTEGER NOT NULL,
                action_json TEXT NOT NULL,
                result_json TEXT NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (game_id, action_id)
            );

            CREATE TABLE IF NOT EXISTS game_events (
                game_id TEXT NOT NULL,
                event_id TEXT NOT NULL,
                sequence INTEGER NOT NULL,
                turn INTEGER NOT NULL,
                event_type TEXT NOT NULL,
                actor_id TEXT NOT NULL,
                payload_json TEXT NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (game_id, event_id),
                UNIQUE (game_id, sequence)
            );

            CREATE INDEX IF NOT EXISTS idx_game_events_game_sequence ON game_events(game_id, sequence);
            CREATE INDEX IF NOT EXISTS idx_game_events_game_type_sequence ON game_events(game_id, event_type, sequence);
            CREATE INDEX IF NOT EXISTS idx_actions_game_actor ON actions(game_id, actor_id);
            ",
        )?;

        self.conn.execute(
            "INSERT OR IGNORE INTO schema_migrations(version, name, applied_at)
             VALUES(1, 'initial_v1', 'v-000000')",
            [],
        )?;

        Ok(())
    }
}

fn version_stamp(version: u64) -> String {
    format!("v-{version:06}")
}
