use contracts::{GameConfig, GamePhase, GameState, LogEntry, Player, SCHEMA_VERSION_V1, STARTING_CASH};

use crate::catalog;

use super::events;

/// Build the opening state for a configured game: every player seated
/// with the starting cash, the full board unowned, and a single log
/// entry recording the start.
pub fn new_game(config: &GameConfig) -> GameState {
    let players = config
        .players
        .iter()
        .map(|seed| Player {
            user_id: seed.user_id.clone(),
            name: seed.name.clone(),
            cash: STARTING_CASH,
            properties: Vec::new(),
            corporations: Vec::new(),
            debts: Vec::new(),
            interest_owed: 0,
            net_worth: STARTING_CASH,
            bankrupt: false,
        })
        .collect::<Vec<_>>();

    let mut state = GameState {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        game_id: config.game_id.clone(),
        phase: GamePhase::InProgress,
        players,
        current_player_index: 0,
        properties: catalog::standard_board(),
        corporations: Vec::new(),
        game_log: Vec::new(),
        settings: config.settings.clone(),
        turn_count: 0,
        action_count: 0,
    };

    state.game_log.push(LogEntry {
        created_at: events::turn_stamp(0, 0),
        message: format!("Game started with {} players.", state.players.len()),
    });

    state
}

#[cfg(test)]
mod tests {
    use contracts::GameConfig;

    use super::new_game;

    #[test]
    fn new_game_seats_players_with_starting_cash() {
        let state = new_game(&GameConfig::default());
        assert_eq!(state.players.len(), 2);
        for player in &state.players {
            assert_eq!(player.cash, 1500, "player {} cash", player.user_id);
            assert_eq!(player.net_worth, 1500);
            assert!(player.properties.is_empty());
            assert!(player.debts.is_empty());
        }
        assert_eq!(state.current_player_index, 0);
        assert_eq!(state.turn_count, 0);
        assert_eq!(state.properties.len(), 27);
        assert!(state.properties.iter().all(|property| property.available));
        assert_eq!(state.game_log.len(), 1);
        assert!(state.game_log[0].message.contains("2 players"));
    }
}
