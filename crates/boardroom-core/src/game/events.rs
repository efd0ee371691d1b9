use contracts::{AuditEvent, AuditEventType, GameState, LogEntry, SCHEMA_VERSION_V1};
use serde_json::Value;

/// Deterministic timestamp derived from game progress. Real wall-clock
/// time never enters the engine, so replays are byte-stable.
pub fn turn_stamp(turn: u64, action_count: u64) -> String {
    format!("turn-{turn:04}-{action_count:06}")
}

pub fn push_log(state: &mut GameState, message: String) {
    let created_at = turn_stamp(state.turn_count, state.action_count);
    state.game_log.push(LogEntry {
        created_at,
        message,
    });
}

/// One audit event per applied action. `sequence` mirrors the action
/// counter, which the caller has already advanced for this action.
pub fn build_audit_event(
    state: &GameState,
    event_type: AuditEventType,
    actor_id: &str,
    details: Value,
) -> AuditEvent {
    AuditEvent {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        game_id: state.game_id.clone(),
        event_id: format!("evt_{:06}", state.action_count),
        sequence: state.action_count,
        turn: state.turn_count,
        created_at: turn_stamp(state.turn_count, state.action_count),
        event_type,
        actor_id: actor_id.to_string(),
        details: Some(details),
    }
}

/// The sequence-zero event recorded when a game is first stored.
pub fn game_created_event(state: &GameState) -> AuditEvent {
    AuditEvent {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        game_id: state.game_id.clone(),
        event_id: "evt_000000".to_string(),
        sequence: 0,
        turn: 0,
        created_at: turn_stamp(0, 0),
        event_type: AuditEventType::GameCreated,
        actor_id: "system".to_string(),
        details: Some(serde_json::json!({
            "player_count": state.players.len(),
            "players": state
                .players
                .iter()
                .map(|player| player.user_id.clone())
                .collect::<Vec<_>>(),
        })),
    }
}
