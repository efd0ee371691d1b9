//! v1 cross-boundary contracts for the game engine, API, and persistence.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SCHEMA_VERSION_V1: &str = "1.0";
pub const STARTING_CASH: i64 = 1500;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSettings {
    pub interest_rate: u32,
    pub pass_go_amount: i64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            interest_rate: 5,
            pass_go_amount: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerSeed {
    pub user_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameConfig {
    pub schema_version: String,
    pub game_id: String,
    pub players: Vec<PlayerSeed>,
    #[serde(default)]
    pub settings: GameSettings,
    pub notes: Option<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            game_id: "game_local_001".to_string(),
            players: vec![
                PlayerSeed {
                    user_id: "player_one".to_string(),
                    name: "Player One".to_string(),
                },
                PlayerSeed {
                    user_id: "player_two".to_string(),
                    name: "Player Two".to_string(),
                },
            ],
            settings: GameSettings::default(),
            notes: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OwnedAsset {
    pub id: String,
    pub name: String,
    pub color: String,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Property {
    pub id: String,
    pub name: String,
    pub color: String,
    pub price: i64,
    pub rent: Vec<i64>,
    pub owner_id: Option<String>,
    pub owner_name: Option<String>,
    pub houses: u8,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CorporationStake {
    pub ticker: String,
    pub shares_owned: u64,
    pub total_shares: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Shareholder {
    pub user_id: String,
    pub name: String,
    pub shares: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Corporation {
    pub id: String,
    pub ticker: String,
    pub name: String,
    pub founder_id: String,
    pub founder_name: String,
    pub total_shares: u64,
    pub price_per_share: i64,
    pub assets: Vec<OwnedAsset>,
    pub shareholders: Vec<Shareholder>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Debt {
    pub id: String,
    pub principal: i64,
    pub interest_rate: u32,
    #[serde(default)]
    pub collateral: Vec<OwnedAsset>,
    pub issued_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub user_id: String,
    pub name: String,
    pub cash: i64,
    pub properties: Vec<OwnedAsset>,
    pub corporations: Vec<CorporationStake>,
    pub debts: Vec<Debt>,
    pub interest_owed: i64,
    pub net_worth: i64,
    pub bankrupt: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    pub created_at: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameState {
    pub schema_version: String,
    pub game_id: String,
    pub phase: GamePhase,
    pub players: Vec<Player>,
    pub current_player_index: usize,
    pub properties: Vec<Property>,
    pub corporations: Vec<Corporation>,
    pub game_log: Vec<LogEntry>,
    pub settings: GameSettings,
    pub turn_count: u64,
    pub action_count: u64,
}

impl GameState {
    pub fn player(&self, user_id: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.user_id == user_id)
    }

    pub fn current_player_id(&self) -> Option<&str> {
        self.players
            .get(self.current_player_index)
            .map(|player| player.user_id.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameStatus {
    pub schema_version: String,
    pub game_id: String,
    #[serde(with = "serde_u64_string")]
    pub version: u64,
    pub turn_count: u64,
    pub current_player_id: String,
    pub player_count: usize,
    pub phase: GamePhase,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "game_id={} version={} turn={} current_player={} players={} phase={:?}",
            self.game_id,
            self.version,
            self.turn_count,
            self.current_player_id,
            self.player_count,
            self.phase
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    BuyProperty,
    CreateIpo,
    IssueDebt,
    SettleDebt,
    ExecuteTrade,
    MakePayment,
    EndTurn,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionPayload {
    BuyProperty {
        property_id: String,
        price: i64,
    },
    CreateIpo {
        ticker: String,
        total_shares: u64,
        price_per_share: i64,
        #[serde(default)]
        asset_ids: Vec<String>,
    },
    IssueDebt {
        principal: i64,
        interest_rate: u32,
        #[serde(default)]
        collateral_asset_ids: Vec<String>,
    },
    SettleDebt {
        debt_id: String,
        amount: i64,
    },
    ExecuteTrade {
        counterparty_id: String,
        #[serde(default)]
        cash_to_counterparty: i64,
        #[serde(default)]
        cash_to_actor: i64,
        #[serde(default)]
        asset_ids_to_counterparty: Vec<String>,
        #[serde(default)]
        asset_ids_to_actor: Vec<String>,
    },
    MakePayment {
        recipient_id: String,
        amount: i64,
    },
    EndTurn,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Action {
    pub schema_version: String,
    pub action_id: String,
    pub game_id: String,
    pub actor_id: String,
    pub action_type: ActionType,
    pub payload: ActionPayload,
}

impl Action {
    pub fn new(
        action_id: impl Into<String>,
        game_id: impl Into<String>,
        actor_id: impl Into<String>,
        action_type: ActionType,
        payload: ActionPayload,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            action_id: action_id.into(),
            game_id: game_id.into(),
            actor_id: actor_id.into(),
            action_type,
            payload,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    GameNotFound,
    ValidationError,
    InsufficientFunds,
    PropertyUnavailable,
    DebtNotFound,
    NoAssetsSelected,
    VersionConflict,
    StorageFailure,
    InvalidQuery,
    ContractVersionUnsupported,
    InternalError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub schema_version: String,
    pub error_code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(error_code: ErrorCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            error_code,
            message: message.into(),
            details,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionResult {
    pub schema_version: String,
    pub action_id: String,
    pub game_id: String,
    pub accepted: bool,
    pub version: Option<u64>,
    pub error: Option<ApiError>,
}

impl ActionResult {
    pub fn accepted(action: &Action, version: u64) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            action_id: action.action_id.clone(),
            game_id: action.game_id.clone(),
            accepted: true,
            version: Some(version),
            error: None,
        }
    }

    pub fn rejected(action: &Action, error: ApiError) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            action_id: action.action_id.clone(),
            game_id: action.game_id.clone(),
            accepted: false,
            version: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    GameCreated,
    PropertyPurchase,
    IpoCreated,
    DebtIssued,
    DebtPayment,
    Trade,
    Payment,
    TurnEnd,
}

impl AuditEventType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GameCreated => "game_created",
            Self::PropertyPurchase => "property_purchase",
            Self::IpoCreated => "ipo_created",
            Self::DebtIssued => "debt_issued",
            Self::DebtPayment => "debt_payment",
            Self::Trade => "trade",
            Self::Payment => "payment",
            Self::TurnEnd => "turn_end",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEvent {
    pub schema_version: String,
    pub game_id: String,
    pub event_id: String,
    pub sequence: u64,
    pub turn: u64,
    pub created_at: String,
    pub event_type: AuditEventType,
    pub actor_id: String,
    pub details: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResponse {
    pub schema_version: String,
    pub query_type: String,
    pub game_id: String,
    pub generated_at_version: u64,
    pub data: Value,
}

pub mod serde_u64_string {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<u64>().map_err(D::Error::custom)
    }
}
