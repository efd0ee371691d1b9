use contracts::GameState;
use serde_json::Value;

use super::{events, ActionError};

/// Advance the turn pointer. Always succeeds for a known player; the
/// pointer wraps around the seating order and the turn counter climbs.
pub fn end_turn(state: &mut GameState, actor_id: &str) -> Result<Value, ActionError> {
    let player_count = state.players.len();
    let previous_index = state.current_player_index;
    state.current_player_index = (previous_index + 1) % player_count;
    state.turn_count += 1;

    let actor_name = state
        .player(actor_id)
        .map(|player| player.name.clone())
        .unwrap_or_else(|| actor_id.to_string());
    let next_name = state.players[state.current_player_index].name.clone();

    events::push_log(
        state,
        format!("{actor_name} ended their turn. It's now {next_name}'s turn."),
    );

    Ok(serde_json::json!({
        "previous_player_index": previous_index,
        "current_player_index": state.current_player_index,
        "turn_count": state.turn_count,
    }))
}
