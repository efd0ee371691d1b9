use contracts::{Corporation, CorporationStake, GameState, Shareholder};
use serde_json::Value;

use super::{events, find_player_mut, take_assets, ActionError};

/// Float a corporation: the founder contributes board assets and in
/// return holds every issued share. Contributed properties move off the
/// founder's sheet and onto the corporation's, and the board entry is
/// repointed at the corporation so each property has exactly one holder.
pub fn create_ipo(
    state: &mut GameState,
    actor_id: &str,
    ticker: &str,
    total_shares: u64,
    price_per_share: i64,
    asset_ids: &[String],
) -> Result<Value, ActionError> {
    let ticker = ticker.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(ActionError::Validation("ticker must not be empty".to_string()));
    }
    if total_shares == 0 {
        return Err(ActionError::Validation(
            "total_shares must be positive".to_string(),
        ));
    }
    if price_per_share <= 0 {
        return Err(ActionError::Validation(format!(
            "price_per_share must be positive, got {price_per_share}"
        )));
    }
    if asset_ids.is_empty() {
        return Err(ActionError::NoAssetsSelected);
    }
    if state
        .corporations
        .iter()
        .any(|corp| corp.ticker == ticker)
    {
        return Err(ActionError::Validation(format!(
            "ticker {ticker} is already listed"
        )));
    }

    let corp_id = format!("corp_{:06}", state.action_count + 1);
    let corp_name = format!("{ticker} Corporation");

    let (founder_name, assets) = {
        let founder = find_player_mut(state, actor_id)?;
        let assets = take_assets(founder, asset_ids)?;
        founder.corporations.push(CorporationStake {
            ticker: ticker.clone(),
            shares_owned: total_shares,
            total_shares,
        });
        (founder.name.clone(), assets)
    };

    for asset in &assets {
        super::set_board_owner(state, &asset.id, &corp_id, &corp_name);
    }

    let asset_count = assets.len();
    state.corporations.push(Corporation {
        id: corp_id.clone(),
        ticker: ticker.clone(),
        name: corp_name.clone(),
        founder_id: actor_id.to_string(),
        founder_name: founder_name.clone(),
        total_shares,
        price_per_share,
        assets,
        shareholders: vec![Shareholder {
            user_id: actor_id.to_string(),
            name: founder_name.clone(),
            shares: total_shares,
        }],
    });

    events::push_log(
        state,
        format!(
            "{founder_name} took {corp_name} ({ticker}) public: {total_shares} shares at ${price_per_share} backed by {asset_count} assets."
        ),
    );

    Ok(serde_json::json!({
        "corporation_id": corp_id,
        "ticker": ticker,
        "total_shares": total_shares,
        "price_per_share": price_per_share,
        "asset_ids": asset_ids,
    }))
}
