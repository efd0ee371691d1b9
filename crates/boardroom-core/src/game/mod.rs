use std::collections::BTreeMap;
use std::fmt;

use contracts::{Action, ActionPayload, AuditEvent, AuditEventType, GameState, OwnedAsset, Player};

mod debt;
mod events;
mod init;
mod invariants;
mod ipo;
mod payment;
mod purchase;
mod trade;
mod turn;

pub use events::game_created_event;
pub use init::new_game;
pub use invariants::verify_invariants;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    Validation(String),
    InsufficientFunds { required: i64, available: i64 },
    PropertyUnavailable(String),
    DebtNotFound(String),
    NoAssetsSelected,
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "validation failed: {message}"),
            Self::InsufficientFunds {
                required,
                available,
            } => write!(
                f,
                "insufficient funds: required={required} available={available}"
            ),
            Self::PropertyUnavailable(name) => write!(f, "property unavailable: {name}"),
            Self::DebtNotFound(debt_id) => write!(f, "debt not found: {debt_id}"),
            Self::NoAssetsSelected => write!(f, "no assets selected"),
        }
    }
}

impl std::error::Error for ActionError {}

#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub state: GameState,
    pub audit: AuditEvent,
}

/// Apply one action to a snapshot of the game, producing the successor
/// state and exactly one audit event. The input state is never mutated;
/// on error no partial effect is observable.
///
/// There is intentionally no turn check here: any known player may act
/// regardless of `current_player_index`.
pub fn apply_action(state: &GameState, action: &Action) -> Result<ActionOutcome, ActionError> {
    let mut next = state.clone();
    let actor_id = action.actor_id.as_str();
    if next.player(actor_id).is_none() {
        return Err(ActionError::Validation(format!(
            "unknown player: {actor_id}"
        )));
    }

    let (event_type, details) = match &action.payload {
        ActionPayload::BuyProperty { property_id, price } => (
            AuditEventType::PropertyPurchase,
            purchase::buy_property(&mut next, actor_id, property_id, *price)?,
        ),
        ActionPayload::CreateIpo {
            ticker,
            total_shares,
            price_per_share,
            asset_ids,
        } => (
            AuditEventType::IpoCreated,
            ipo::create_ipo(
                &mut next,
                actor_id,
                ticker,
                *total_shares,
                *price_per_share,
                asset_ids,
            )?,
        ),
        ActionPayload::IssueDebt {
            principal,
            interest_rate,
            collateral_asset_ids,
        } => (
            AuditEventType::DebtIssued,
            debt::issue_debt(
                &mut next,
                actor_id,
                *principal,
                *interest_rate,
                collateral_asset_ids,
            )?,
        ),
        ActionPayload::SettleDebt { debt_id, amount } => (
            AuditEventType::DebtPayment,
            debt::settle_debt(&mut next, actor_id, debt_id, *amount)?,
        ),
        ActionPayload::ExecuteTrade {
            counterparty_id,
            cash_to_counterparty,
            cash_to_actor,
            asset_ids_to_counterparty,
            asset_ids_to_actor,
        } => (
            AuditEventType::Trade,
            trade::execute_trade(
                &mut next,
                actor_id,
                counterparty_id,
                *cash_to_counterparty,
                *cash_to_actor,
                asset_ids_to_counterparty,
                asset_ids_to_actor,
            )?,
        ),
        ActionPayload::MakePayment {
            recipient_id,
            amount,
        } => (
            AuditEventType::Payment,
            payment::make_payment(&mut next, actor_id, recipient_id, *amount)?,
        ),
        ActionPayload::EndTurn => (
            AuditEventType::TurnEnd,
            turn::end_turn(&mut next, actor_id)?,
        ),
    };

    recompute_net_worth(&mut next);
    invariants::verify_invariants(&next).map_err(ActionError::Validation)?;

    next.action_count += 1;
    let audit = events::build_audit_event(&next, event_type, actor_id, details);

    Ok(ActionOutcome { state: next, audit })
}

/// Net worth: cash + held asset values + shares at issue price - debt
/// principal. Recomputed for every player after each applied action.
fn recompute_net_worth(state: &mut GameState) {
    let share_price_by_ticker = state
        .corporations
        .iter()
        .map(|corp| (corp.ticker.clone(), corp.price_per_share))
        .collect::<BTreeMap<_, _>>();

    for player in &mut state.players {
        let asset_value = player.properties.iter().map(|asset| asset.value).sum::<i64>();
        let equity_value = player
            .corporations
            .iter()
            .map(|stake| {
                let price = share_price_by_ticker
                    .get(&stake.ticker)
                    .copied()
                    .unwrap_or(0);
                price.saturating_mul(stake.shares_owned as i64)
            })
            .sum::<i64>();
        let debt_total = player.debts.iter().map(|debt| debt.principal).sum::<i64>();
        player.net_worth = player.cash + asset_value + equity_value - debt_total;
    }
}

fn find_player_mut<'a>(
    state: &'a mut GameState,
    user_id: &str,
) -> Result<&'a mut Player, ActionError> {
    state
        .players
        .iter_mut()
        .find(|player| player.user_id == user_id)
        .ok_or_else(|| ActionError::Validation(format!("unknown player: {user_id}")))
}

/// Remove the named assets from a player's holdings, preserving order.
/// Fails when any id is not held; the caller discards the state on error.
fn take_assets(player: &mut Player, asset_ids: &[String]) -> Result<Vec<OwnedAsset>, ActionError> {
    let mut taken = Vec::with_capacity(asset_ids.len());
    for asset_id in asset_ids {
        let position = player
            .properties
            .iter()
            .position(|asset| asset.id == *asset_id)
            .ok_or_else(|| {
                ActionError::Validation(format!(
                    "player {} does not hold asset {asset_id}",
                    player.user_id
                ))
            })?;
        taken.push(player.properties.remove(position));
    }
    Ok(taken)
}

/// Point the board entry for `property_id` at a new holder. The entry
/// stays unavailable; availability only ever flips on first purchase.
fn set_board_owner(state: &mut GameState, property_id: &str, owner_id: &str, owner_name: &str) {
    if let Some(property) = state
        .properties
        .iter_mut()
        .find(|property| property.id == property_id)
    {
        property.owner_id = Some(owner_id.to_string());
        property.owner_name = Some(owner_name.to_string());
        property.available = false;
    }
}

#[cfg(test)]
mod tests;
