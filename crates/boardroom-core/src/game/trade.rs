use contracts::GameState;
use serde_json::Value;

use super::{events, take_assets, ActionError};

/// Settle a negotiated trade between two players. Both cash legs apply
/// unconditionally; trades are the one place a balance may go negative,
/// matching table rules where obligations can outrun cash on hand.
#[allow(clippy::too_many_arguments)]
pub fn execute_trade(
    state: &mut GameState,
    actor_id: &str,
    counterparty_id: &str,
    cash_to_counterparty: i64,
    cash_to_actor: i64,
    asset_ids_to_counterparty: &[String],
    asset_ids_to_actor: &[String],
) -> Result<Value, ActionError> {
    if counterparty_id == actor_id {
        return Err(ActionError::Validation(
            "cannot trade with yourself".to_string(),
        ));
    }
    if cash_to_counterparty < 0 || cash_to_actor < 0 {
        return Err(ActionError::Validation(
            "cash legs must not be negative".to_string(),
        ));
    }

    let actor_index = state
        .players
        .iter()
        .position(|player| player.user_id == actor_id)
        .ok_or_else(|| ActionError::Validation(format!("unknown player: {actor_id}")))?;
    let counterparty_index = state
        .players
        .iter()
        .position(|player| player.user_id == counterparty_id)
        .ok_or_else(|| {
            ActionError::Validation(format!("unknown counterparty: {counterparty_id}"))
        })?;

    let outgoing = take_assets(&mut state.players[actor_index], asset_ids_to_counterparty)?;
    let incoming = take_assets(&mut state.players[counterparty_index], asset_ids_to_actor)?;

    let (actor_name, counterparty_name) = {
        let actor = &mut state.players[actor_index];
        actor.cash -= cash_to_counterparty;
        actor.cash += cash_to_actor;
        actor.properties.extend(incoming.iter().cloned());
        let actor_name = actor.name.clone();

        let counterparty = &mut state.players[counterparty_index];
        counterparty.cash += cash_to_counterparty;
        counterparty.cash -= cash_to_actor;
        counterparty.properties.extend(outgoing.iter().cloned());
        (actor_name, counterparty.name.clone())
    };

    for asset in &outgoing {
        super::set_board_owner(state, &asset.id, counterparty_id, &counterparty_name);
    }
    for asset in &incoming {
        super::set_board_owner(state, &asset.id, actor_id, &actor_name);
    }

    events::push_log(
        state,
        format!(
            "{actor_name} traded with {counterparty_name}: ${cash_to_counterparty} and {} assets out, ${cash_to_actor} and {} assets in.",
            outgoing.len(),
            incoming.len()
        ),
    );

    Ok(serde_json::json!({
        "counterparty_id": counterparty_id,
        "cash_to_counterparty": cash_to_counterparty,
        "cash_to_actor": cash_to_actor,
        "asset_ids_to_counterparty": asset_ids_to_counterparty,
        "asset_ids_to_actor": asset_ids_to_actor,
    }))
}
