use super::*;
use contracts::{ActionPayload, ActionType};

#[test]
fn pagination_enforces_max_bounds() {
    let (start, end, next_cursor) = paginate(100, Some(10), Some(20)).expect("page should work");
    assert_eq!(start, 10);
    assert_eq!(end, 30);
    assert_eq!(next_cursor, Some(30));

    let out_of_range = paginate(5, Some(10), Some(1));
    assert!(out_of_range.is_err());
}

#[test]
fn event_type_filter_accepts_known_names_only() {
    assert_eq!(parse_event_type_filter(None).expect("no filter"), None);
    assert_eq!(
        parse_event_type_filter(Some("property_purchase")).expect("snake case"),
        Some("property_purchase")
    );
    assert_eq!(
        parse_event_type_filter(Some("TurnEnd")).expect("camel case"),
        Some("turn_end")
    );
    assert!(parse_event_type_filter(Some("bank_heist")).is_err());
}

#[test]
fn delta_messages_cover_events_and_state() {
    let mut inner = ServerInner::default();
    let mut api = GameApi::from_config(&GameConfig::default()).expect("valid config");

    let action = Action::new(
        "act_0001",
        api.game_id(),
        "player_one",
        ActionType::BuyProperty,
        ActionPayload::BuyProperty {
            property_id: "prop_boardwalk".to_string(),
            price: 400,
        },
    );
    let result = api.submit_action(action);
    assert!(result.accepted);
    inner.api = Some(api);

    let messages = collect_delta_messages(&mut inner);
    let types = messages
        .iter()
        .map(|message| message.message_type.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        types,
        vec!["event.appended", "event.appended", "state.changed"],
        "game_created and purchase events, then the new state"
    );

    // A second collection with nothing new emits nothing.
    assert!(collect_delta_messages(&mut inner).is_empty());
}
