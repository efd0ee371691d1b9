use std::collections::BTreeMap;

use contracts::GameState;

/// Structural checks run after every applied action. A failure here
/// means an engine bug, not a bad request, but it still rejects the
/// action so the broken state is never committed.
pub fn verify_invariants(state: &GameState) -> Result<(), String> {
    // Every held asset has exactly one holder across players and
    // corporations.
    let mut holders: BTreeMap<&str, Vec<(&str, &str)>> = BTreeMap::new();
    for player in &state.players {
        for asset in &player.properties {
            holders
                .entry(asset.id.as_str())
                .or_default()
                .push((player.user_id.as_str(), player.name.as_str()));
        }
    }
    for corp in &state.corporations {
        for asset in &corp.assets {
            holders
                .entry(asset.id.as_str())
                .or_default()
                .push((corp.id.as_str(), corp.name.as_str()));
        }
    }
    for (asset_id, owners) in &holders {
        if owners.len() > 1 {
            return Err(format!(
                "asset {asset_id} has {} holders",
                owners.len()
            ));
        }
    }

    for property in &state.properties {
        match &property.owner_id {
            Some(owner_id) => {
                if property.available {
                    return Err(format!(
                        "property {} is owned by {owner_id} but marked available",
                        property.id
                    ));
                }
                let holder = holders.get(property.id.as_str()).and_then(|o| o.first());
                match holder {
                    Some((holder_id, _)) if holder_id == owner_id => {}
                    Some((holder_id, _)) => {
                        return Err(format!(
                            "property {} board owner {owner_id} disagrees with holder {holder_id}",
                            property.id
                        ));
                    }
                    None => {
                        return Err(format!(
                            "property {} board owner {owner_id} holds no matching asset",
                            property.id
                        ));
                    }
                }
            }
            None => {
                if !property.available {
                    return Err(format!(
                        "property {} has no owner but is marked unavailable",
                        property.id
                    ));
                }
                if holders.contains_key(property.id.as_str()) {
                    return Err(format!(
                        "property {} is held but the board shows no owner",
                        property.id
                    ));
                }
            }
        }
    }

    for corp in &state.corporations {
        let issued = corp
            .shareholders
            .iter()
            .map(|holder| holder.shares)
            .sum::<u64>();
        if issued != corp.total_shares {
            return Err(format!(
                "corporation {} has {issued} shares held against {} issued",
                corp.ticker, corp.total_shares
            ));
        }
    }

    if !state.players.is_empty() && state.current_player_index >= state.players.len() {
        return Err(format!(
            "current_player_index {} out of range for {} players",
            state.current_player_index,
            state.players.len()
        ));
    }

    Ok(())
}
