use contracts::{Action, ActionPayload, ActionType, AuditEventType, GameConfig, GameState};

use super::{apply_action, new_game, ActionError};

fn action(state: &GameState, seq: u32, actor: &str, kind: ActionType, payload: ActionPayload) -> Action {
    Action::new(
        format!("act_{seq:04}"),
        state.game_id.clone(),
        actor,
        kind,
        payload,
    )
}

fn buy(state: &GameState, seq: u32, actor: &str, property_id: &str, price: i64) -> Action {
    action(
        state,
        seq,
        actor,
        ActionType::BuyProperty,
        ActionPayload::BuyProperty {
            property_id: property_id.to_string(),
            price,
        },
    )
}

fn apply(state: &GameState, act: &Action) -> GameState {
    apply_action(state, act)
        .expect("action should be accepted")
        .state
}

#[test]
fn buy_property_moves_cash_and_ownership() {
    let state = new_game(&GameConfig::default());
    let act = buy(&state, 1, "player_one", "prop_boardwalk", 400);
    let outcome = apply_action(&state, &act).expect("purchase should succeed");

    let buyer = outcome.state.player("player_one").expect("buyer exists");
    assert_eq!(buyer.cash, 1100);
    assert_eq!(buyer.properties.len(), 1);
    assert_eq!(buyer.properties[0].id, "prop_boardwalk");
    assert_eq!(buyer.properties[0].value, 400, "asset carried at paid price");

    let board = outcome
        .state
        .properties
        .iter()
        .find(|property| property.id == "prop_boardwalk")
        .expect("boardwalk on the board");
    assert_eq!(board.owner_id.as_deref(), Some("player_one"));
    assert!(!board.available);

    assert_eq!(outcome.audit.event_type, AuditEventType::PropertyPurchase);
    assert_eq!(outcome.audit.sequence, 1);
    assert_eq!(outcome.state.game_log.len(), 2);

    // The input snapshot is untouched.
    assert_eq!(state.player("player_one").unwrap().cash, 1500);
}

#[test]
fn buy_property_at_negotiated_price_below_catalog() {
    let state = new_game(&GameConfig::default());
    let act = buy(&state, 1, "player_one", "prop_boardwalk", 250);
    let next = apply(&state, &act);
    assert_eq!(next.player("player_one").unwrap().cash, 1250);
    assert_eq!(next.player("player_one").unwrap().properties[0].value, 250);
}

#[test]
fn buy_property_rejects_owned_and_unknown() {
    let state = new_game(&GameConfig::default());
    let first = buy(&state, 1, "player_one", "prop_boardwalk", 400);
    let state = apply(&state, &first);

    let second = buy(&state, 2, "player_two", "prop_boardwalk", 400);
    let err = apply_action(&state, &second).expect_err("second buyer must be rejected");
    assert_eq!(err, ActionError::PropertyUnavailable("Boardwalk".to_string()));

    let unknown = buy(&state, 3, "player_two", "prop_nowhere", 100);
    assert!(matches!(
        apply_action(&state, &unknown),
        Err(ActionError::Validation(_))
    ));
}

#[test]
fn buy_property_rejects_when_cash_is_short() {
    let state = new_game(&GameConfig::default());
    let act = buy(&state, 1, "player_one", "prop_boardwalk", 2000);
    assert_eq!(
        apply_action(&state, &act).expect_err("too expensive"),
        ActionError::InsufficientFunds {
            required: 2000,
            available: 1500,
        }
    );
}

#[test]
fn unknown_actor_is_rejected_before_dispatch() {
    let state = new_game(&GameConfig::default());
    let act = buy(&state, 1, "player_nine", "prop_boardwalk", 100);
    assert!(matches!(
        apply_action(&state, &act),
        Err(ActionError::Validation(_))
    ));
}

#[test]
fn ipo_transfers_assets_to_the_corporation() {
    let state = new_game(&GameConfig::default());
    let state = apply(&state, &buy(&state, 1, "player_one", "prop_boardwalk", 400));
    let state = apply(&state, &buy(&state, 2, "player_one", "prop_park_place", 350));

    let ipo = action(
        &state,
        3,
        "player_one",
        ActionType::CreateIpo,
        ActionPayload::CreateIpo {
            ticker: "acme".to_string(),
            total_shares: 100,
            price_per_share: 10,
            asset_ids: vec!["prop_boardwalk".to_string(), "prop_park_place".to_string()],
        },
    );
    let next = apply(&state, &ipo);

    let founder = next.player("player_one").expect("founder exists");
    assert!(founder.properties.is_empty(), "assets moved off the founder");
    assert_eq!(founder.corporations.len(), 1);
    assert_eq!(founder.corporations[0].ticker, "ACME");
    assert_eq!(founder.corporations[0].shares_owned, 100);

    let corp = &next.corporations[0];
    assert_eq!(corp.ticker, "ACME", "ticker is upper-cased");
    assert_eq!(corp.assets.len(), 2);
    assert_eq!(corp.shareholders.len(), 1);
    assert_eq!(corp.shareholders[0].shares, corp.total_shares);

    let board = next
        .properties
        .iter()
        .find(|property| property.id == "prop_boardwalk")
        .unwrap();
    assert_eq!(board.owner_id.as_deref(), Some(corp.id.as_str()));

    // Founder equity replaces the property value in net worth.
    assert_eq!(founder.net_worth, founder.cash + 100 * 10);
}

#[test]
fn ipo_rejects_empty_asset_list_and_duplicate_ticker() {
    let state = new_game(&GameConfig::default());
    let state = apply(&state, &buy(&state, 1, "player_one", "prop_boardwalk", 400));

    let empty = action(
        &state,
        2,
        "player_one",
        ActionType::CreateIpo,
        ActionPayload::CreateIpo {
            ticker: "ACME".to_string(),
            total_shares: 100,
            price_per_share: 10,
            asset_ids: Vec::new(),
        },
    );
    assert_eq!(
        apply_action(&state, &empty).expect_err("no assets"),
        ActionError::NoAssetsSelected
    );

    let ipo = action(
        &state,
        3,
        "player_one",
        ActionType::CreateIpo,
        ActionPayload::CreateIpo {
            ticker: "ACME".to_string(),
            total_shares: 100,
            price_per_share: 10,
            asset_ids: vec!["prop_boardwalk".to_string()],
        },
    );
    let state = apply(&state, &ipo);

    let state2 = apply(&state, &buy(&state, 4, "player_two", "prop_park_place", 350));
    let duplicate = action(
        &state2,
        5,
        "player_two",
        ActionType::CreateIpo,
        ActionPayload::CreateIpo {
            ticker: " acme ".to_string(),
            total_shares: 50,
            price_per_share: 5,
            asset_ids: vec!["prop_park_place".to_string()],
        },
    );
    assert!(matches!(
        apply_action(&state2, &duplicate),
        Err(ActionError::Validation(_))
    ));
}

#[test]
fn debt_lifecycle_issue_then_settle() {
    let state = new_game(&GameConfig::default());
    let issue = action(
        &state,
        1,
        "player_one",
        ActionType::IssueDebt,
        ActionPayload::IssueDebt {
            principal: 500,
            interest_rate: 5,
            collateral_asset_ids: Vec::new(),
        },
    );
    let state = apply(&state, &issue);

    let borrower = state.player("player_one").unwrap();
    assert_eq!(borrower.cash, 2000);
    assert_eq!(borrower.debts.len(), 1);
    assert_eq!(borrower.net_worth, 1500, "loan cash is offset by principal");
    let debt_id = borrower.debts[0].id.clone();

    let partial = action(
        &state,
        2,
        "player_one",
        ActionType::SettleDebt,
        ActionPayload::SettleDebt {
            debt_id: debt_id.clone(),
            amount: 200,
        },
    );
    let state = apply(&state, &partial);
    assert_eq!(state.player("player_one").unwrap().debts[0].principal, 300);

    let payoff = action(
        &state,
        3,
        "player_one",
        ActionType::SettleDebt,
        ActionPayload::SettleDebt {
            debt_id: debt_id.clone(),
            amount: 300,
        },
    );
    let state = apply(&state, &payoff);
    let borrower = state.player("player_one").unwrap();
    assert!(borrower.debts.is_empty(), "paid-off debt is removed");
    assert_eq!(borrower.cash, 1500);
}

#[test]
fn settle_debt_overpayment_retires_without_refund() {
    let state = new_game(&GameConfig::default());
    let issue = action(
        &state,
        1,
        "player_one",
        ActionType::IssueDebt,
        ActionPayload::IssueDebt {
            principal: 100,
            interest_rate: 5,
            collateral_asset_ids: Vec::new(),
        },
    );
    let state = apply(&state, &issue);
    let debt_id = state.player("player_one").unwrap().debts[0].id.clone();

    let over = action(
        &state,
        2,
        "player_one",
        ActionType::SettleDebt,
        ActionPayload::SettleDebt {
            debt_id,
            amount: 150,
        },
    );
    let state = apply(&state, &over);
    let payer = state.player("player_one").unwrap();
    assert!(payer.debts.is_empty());
    assert_eq!(payer.cash, 1450, "the 50 overpaid is kept by the bank");
}

#[test]
fn settle_unknown_debt_is_debt_not_found() {
    let state = new_game(&GameConfig::default());
    let act = action(
        &state,
        1,
        "player_one",
        ActionType::SettleDebt,
        ActionPayload::SettleDebt {
            debt_id: "debt_000099".to_string(),
            amount: 10,
        },
    );
    assert_eq!(
        apply_action(&state, &act).expect_err("no such debt"),
        ActionError::DebtNotFound("debt_000099".to_string())
    );
}

#[test]
fn trade_swaps_cash_and_assets_without_affordability_check() {
    let state = new_game(&GameConfig::default());
    let state = apply(&state, &buy(&state, 1, "player_two", "prop_boardwalk", 400));

    let trade = action(
        &state,
        2,
        "player_one",
        ActionType::ExecuteTrade,
        ActionPayload::ExecuteTrade {
            counterparty_id: "player_two".to_string(),
            cash_to_counterparty: 1800,
            cash_to_actor: 0,
            asset_ids_to_counterparty: Vec::new(),
            asset_ids_to_actor: vec!["prop_boardwalk".to_string()],
        },
    );
    let next = apply(&state, &trade);

    let actor = next.player("player_one").unwrap();
    assert_eq!(actor.cash, -300, "trades may drive cash negative");
    assert_eq!(actor.properties.len(), 1);
    assert_eq!(actor.properties[0].id, "prop_boardwalk");

    let counterparty = next.player("player_two").unwrap();
    assert_eq!(counterparty.cash, 1100 + 1800);
    assert!(counterparty.properties.is_empty());

    let board = next
        .properties
        .iter()
        .find(|property| property.id == "prop_boardwalk")
        .unwrap();
    assert_eq!(board.owner_id.as_deref(), Some("player_one"));
}

#[test]
fn trade_rejects_self_and_assets_not_held() {
    let state = new_game(&GameConfig::default());
    let with_self = action(
        &state,
        1,
        "player_one",
        ActionType::ExecuteTrade,
        ActionPayload::ExecuteTrade {
            counterparty_id: "player_one".to_string(),
            cash_to_counterparty: 0,
            cash_to_actor: 0,
            asset_ids_to_counterparty: Vec::new(),
            asset_ids_to_actor: Vec::new(),
        },
    );
    assert!(matches!(
        apply_action(&state, &with_self),
        Err(ActionError::Validation(_))
    ));

    let missing_asset = action(
        &state,
        2,
        "player_one",
        ActionType::ExecuteTrade,
        ActionPayload::ExecuteTrade {
            counterparty_id: "player_two".to_string(),
            cash_to_counterparty: 0,
            cash_to_actor: 0,
            asset_ids_to_counterparty: vec!["prop_boardwalk".to_string()],
            asset_ids_to_actor: Vec::new(),
        },
    );
    assert!(matches!(
        apply_action(&state, &missing_asset),
        Err(ActionError::Validation(_))
    ));
}

#[test]
fn payment_requires_funds_and_a_real_recipient() {
    let state = new_game(&GameConfig::default());
    let pay = action(
        &state,
        1,
        "player_one",
        ActionType::MakePayment,
        ActionPayload::MakePayment {
            recipient_id: "player_two".to_string(),
            amount: 250,
        },
    );
    let next = apply(&state, &pay);
    assert_eq!(next.player("player_one").unwrap().cash, 1250);
    assert_eq!(next.player("player_two").unwrap().cash, 1750);

    let broke = action(
        &next,
        2,
        "player_one",
        ActionType::MakePayment,
        ActionPayload::MakePayment {
            recipient_id: "player_two".to_string(),
            amount: 5000,
        },
    );
    assert!(matches!(
        apply_action(&next, &broke),
        Err(ActionError::InsufficientFunds { .. })
    ));

    let ghost = action(
        &next,
        3,
        "player_one",
        ActionType::MakePayment,
        ActionPayload::MakePayment {
            recipient_id: "player_nine".to_string(),
            amount: 10,
        },
    );
    assert!(matches!(
        apply_action(&next, &ghost),
        Err(ActionError::Validation(_))
    ));
}

#[test]
fn end_turn_cycles_through_the_seating_order() {
    let mut config = GameConfig::default();
    config.players.push(contracts::PlayerSeed {
        user_id: "player_three".to_string(),
        name: "Player Three".to_string(),
    });
    let mut state = new_game(&config);
    assert_eq!(state.current_player_index, 0);

    for expected in [1usize, 2, 0, 1] {
        let actor = state.current_player_id().unwrap().to_string();
        let act = action(
            &state,
            (state.turn_count + 1) as u32,
            &actor,
            ActionType::EndTurn,
            ActionPayload::EndTurn,
        );
        state = apply(&state, &act);
        assert_eq!(state.current_player_index, expected);
    }
    assert_eq!(state.turn_count, 4);
}

#[test]
fn any_player_may_act_out_of_turn() {
    let state = new_game(&GameConfig::default());
    assert_eq!(state.current_player_id(), Some("player_one"));

    // player_two is not the current player but the purchase still lands.
    let act = buy(&state, 1, "player_two", "prop_boardwalk", 400);
    let next = apply(&state, &act);
    assert_eq!(next.player("player_two").unwrap().properties.len(), 1);
    assert_eq!(next.current_player_index, 0, "turn pointer is untouched");
}

#[test]
fn every_accepted_action_appends_one_log_and_one_audit_event() {
    let state = new_game(&GameConfig::default());
    let base_log = state.game_log.len();

    let act = buy(&state, 1, "player_one", "prop_boardwalk", 400);
    let outcome = apply_action(&state, &act).expect("accepted");
    assert_eq!(outcome.state.game_log.len(), base_log + 1);
    assert_eq!(outcome.audit.event_id, "evt_000001");
    assert_eq!(outcome.audit.actor_id, "player_one");

    let act2 = action(
        &outcome.state,
        2,
        "player_one",
        ActionType::EndTurn,
        ActionPayload::EndTurn,
    );
    let outcome2 = apply_action(&outcome.state, &act2).expect("accepted");
    assert_eq!(outcome2.audit.sequence, 2, "sequence follows the action count");
    assert_eq!(outcome2.audit.event_type, AuditEventType::TurnEnd);
}

#[test]
fn rejected_actions_leave_no_trace() {
    let state = new_game(&GameConfig::default());
    let act = buy(&state, 1, "player_one", "prop_boardwalk", 9000);
    apply_action(&state, &act).expect_err("cannot afford");
    assert_eq!(state.action_count, 0);
    assert_eq!(state.game_log.len(), 1);
    assert!(state.player("player_one").unwrap().properties.is_empty());
}
