use contracts::{GameState, OwnedAsset};
use serde_json::Value;

use super::{events, find_player_mut, ActionError};

/// Buy an unowned board property at a negotiated price. The price is
/// whatever the buyer offered, not the catalog price, and the asset is
/// carried at that paid price from then on.
pub fn buy_property(
    state: &mut GameState,
    actor_id: &str,
    property_id: &str,
    price: i64,
) -> Result<Value, ActionError> {
    if price <= 0 {
        return Err(ActionError::Validation(format!(
            "price must be positive, got {price}"
        )));
    }

    let (property_name, property_color) = {
        let property = state
            .properties
            .iter()
            .find(|property| property.id == property_id)
            .ok_or_else(|| {
                ActionError::Validation(format!("unknown property: {property_id}"))
            })?;
        if !property.available || property.owner_id.is_some() {
            return Err(ActionError::PropertyUnavailable(property.name.clone()));
        }
        (property.name.clone(), property.color.clone())
    };

    let actor_name = {
        let actor = find_player_mut(state, actor_id)?;
        if actor.cash < price {
            return Err(ActionError::InsufficientFunds {
                required: price,
                available: actor.cash,
            });
        }
        actor.cash -= price;
        actor.properties.push(OwnedAsset {
            id: property_id.to_string(),
            name: property_name.clone(),
            color: property_color,
            value: price,
        });
        actor.name.clone()
    };

    super::set_board_owner(state, property_id, actor_id, &actor_name);
    events::push_log(
        state,
        format!("{actor_name} purchased {property_name} for ${price}."),
    );

    Ok(serde_json::json!({
        "property_id": property_id,
        "property_name": property_name,
        "price": price,
    }))
}
