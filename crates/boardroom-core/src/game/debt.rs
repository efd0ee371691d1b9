use contracts::{Debt, GameState};
use serde_json::Value;

use super::{events, find_player_mut, ActionError};

/// Borrow against the game bank. Collateral is declared, not escrowed:
/// the named assets stay on the borrower's sheet and an empty list is a
/// legitimate unsecured loan.
pub fn issue_debt(
    state: &mut GameState,
    actor_id: &str,
    principal: i64,
    interest_rate: u32,
    collateral_asset_ids: &[String],
) -> Result<Value, ActionError> {
    if principal <= 0 {
        return Err(ActionError::Validation(format!(
            "principal must be positive, got {principal}"
        )));
    }
    if interest_rate == 0 {
        return Err(ActionError::Validation(
            "interest_rate must be positive".to_string(),
        ));
    }

    let debt_id = format!("debt_{:06}", state.action_count + 1);
    let issued_at = events::turn_stamp(state.turn_count, state.action_count);

    let borrower_name = {
        let borrower = find_player_mut(state, actor_id)?;
        let mut collateral = Vec::with_capacity(collateral_asset_ids.len());
        for asset_id in collateral_asset_ids {
            let asset = borrower
                .properties
                .iter()
                .find(|asset| asset.id == *asset_id)
                .cloned()
                .ok_or_else(|| {
                    ActionError::Validation(format!(
                        "collateral asset {asset_id} is not held by {actor_id}"
                    ))
                })?;
            collateral.push(asset);
        }
        borrower.debts.push(Debt {
            id: debt_id.clone(),
            principal,
            interest_rate,
            collateral,
            issued_at,
        });
        borrower.cash += principal;
        borrower.name.clone()
    };

    events::push_log(
        state,
        format!("{borrower_name} took a ${principal} loan at {interest_rate}% interest."),
    );

    Ok(serde_json::json!({
        "debt_id": debt_id,
        "principal": principal,
        "interest_rate": interest_rate,
        "collateral_asset_ids": collateral_asset_ids,
    }))
}

/// Pay down a debt by id. Paying at or above the remaining principal
/// retires the debt; any excess is not refunded.
pub fn settle_debt(
    state: &mut GameState,
    actor_id: &str,
    debt_id: &str,
    amount: i64,
) -> Result<Value, ActionError> {
    if amount <= 0 {
        return Err(ActionError::Validation(format!(
            "payment amount must be positive, got {amount}"
        )));
    }

    let (payer_name, remaining) = {
        let payer = find_player_mut(state, actor_id)?;
        let position = payer
            .debts
            .iter()
            .position(|debt| debt.id == debt_id)
            .ok_or_else(|| ActionError::DebtNotFound(debt_id.to_string()))?;
        if payer.cash < amount {
            return Err(ActionError::InsufficientFunds {
                required: amount,
                available: payer.cash,
            });
        }
        payer.cash -= amount;
        payer.debts[position].principal -= amount;
        let remaining = payer.debts[position].principal;
        if remaining <= 0 {
            payer.debts.remove(position);
        }
        (payer.name.clone(), remaining.max(0))
    };

    if remaining == 0 {
        events::push_log(
            state,
            format!("{payer_name} paid ${amount} and fully settled debt {debt_id}."),
        );
    } else {
        events::push_log(
            state,
            format!("{payer_name} paid ${amount} toward debt {debt_id}; ${remaining} remains."),
        );
    }

    Ok(serde_json::json!({
        "debt_id": debt_id,
        "amount": amount,
        "remaining_principal": remaining,
        "settled": remaining == 0,
    }))
}
