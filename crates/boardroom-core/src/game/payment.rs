use contracts::GameState;
use serde_json::Value;

use super::{events, find_player_mut, ActionError};

/// Direct cash transfer between two players, for rent and side deals.
/// Unlike trades, a payment must be covered by the payer's balance.
pub fn make_payment(
    state: &mut GameState,
    actor_id: &str,
    recipient_id: &str,
    amount: i64,
) -> Result<Value, ActionError> {
    if amount <= 0 {
        return Err(ActionError::Validation(format!(
            "payment amount must be positive, got {amount}"
        )));
    }
    if recipient_id == actor_id {
        return Err(ActionError::Validation(
            "cannot pay yourself".to_string(),
        ));
    }
    if state.player(recipient_id).is_none() {
        return Err(ActionError::Validation(format!(
            "unknown recipient: {recipient_id}"
        )));
    }

    let payer_name = {
        let payer = find_player_mut(state, actor_id)?;
        if payer.cash < amount {
            return Err(ActionError::InsufficientFunds {
                required: amount,
                available: payer.cash,
            });
        }
        payer.cash -= amount;
        payer.name.clone()
    };

    let recipient_name = {
        let recipient = find_player_mut(state, recipient_id)?;
        recipient.cash += amount;
        recipient.name.clone()
    };

    events::push_log(
        state,
        format!("{payer_name} paid ${amount} to {recipient_name}."),
    );

    Ok(serde_json::json!({
        "recipient_id": recipient_id,
        "amount": amount,
    }))
}
