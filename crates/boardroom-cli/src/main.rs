use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use boardroom_api::{serve, GameApi};
use contracts::{Action, ActionPayload, ActionType, GameConfig};

fn print_usage() {
    println!("boardroom-cli <command>");
    println!("commands:");
    println!("  status");
    println!("  state");
    println!("  log [limit]");
    println!("  serve [addr]");
    println!("    default addr: 127.0.0.1:8080");
    println!("  demo <game_id> [sqlite_path]");
    println!("    plays a short scripted game and persists it to sqlite");
}

fn parse_socket_addr(value: Option<&String>) -> Result<SocketAddr, String> {
    let raw = value.map(String::as_str).unwrap_or("127.0.0.1:8080");
    raw.parse::<SocketAddr>()
        .map_err(|_| format!("invalid addr: {raw}"))
}

fn default_sqlite_path() -> String {
    std::env::var("BOARDROOM_SQLITE_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "boardroom_games.sqlite".to_string())
}

fn parse_sqlite_path(value: Option<&String>) -> String {
    value
        .map(String::to_string)
        .filter(|path| !path.trim().is_empty())
        .unwrap_or_else(default_sqlite_path)
}

fn default_api() -> Result<GameApi, String> {
    GameApi::from_config(&GameConfig::default())
        .map_err(|err| format!("invalid default config: {}", err.message))
}

fn run_demo(args: &[String]) -> Result<(), String> {
    let game_id = args
        .get(2)
        .cloned()
        .ok_or_else(|| "missing game_id".to_string())?;
    let sqlite_path = parse_sqlite_path(args.get(3));

    let mut config = GameConfig::default();
    config.game_id = game_id.clone();

    let mut api = GameApi::from_config(&config)
        .map_err(|err| format!("invalid config: {}", err.message))?;
    api.attach_sqlite_store(PathBuf::from(&sqlite_path))
        .map_err(|err| format!("failed to attach sqlite store: {err}"))?;
    api.initialize_game_storage(true)
        .map_err(|err| format!("failed to initialize game storage: {err}"))?;

    let script: Vec<(&str, ActionType, ActionPayload)> = vec![
        (
            "player_one",
            ActionType::BuyProperty,
            ActionPayload::BuyProperty {
                property_id: "prop_boardwalk".to_string(),
                price: 400,
            },
        ),
        (
            "player_one",
            ActionType::CreateIpo,
            ActionPayload::CreateIpo {
                ticker: "BLUE".to_string(),
                total_shares: 100,
                price_per_share: 10,
                asset_ids: vec!["prop_boardwalk".to_string()],
            },
        ),
        (
            "player_two",
            ActionType::IssueDebt,
            ActionPayload::IssueDebt {
                principal: 500,
                interest_rate: 5,
                collateral_asset_ids: Vec::new(),
            },
        ),
        (
            "player_two",
            ActionType::MakePayment,
            ActionPayload::MakePayment {
                recipient_id: "player_one".to_string(),
                amount: 150,
            },
        ),
        ("player_one", ActionType::EndTurn, ActionPayload::EndTurn),
    ];

    let mut accepted = 0_usize;
    for (index, (actor, action_type, payload)) in script.into_iter().enumerate() {
        let action = Action::new(
            format!("demo_{:04}", index + 1),
            game_id.clone(),
            actor,
            action_type,
            payload,
        );
        let result = api.submit_action(action);
        if result.accepted {
            accepted += 1;
        } else if let Some(error) = result.error {
            return Err(format!(
                "demo action {} rejected: {:?} {}",
                index + 1,
                error.error_code,
                error.message
            ));
        }
    }

    if let Some(error) = api.last_audit_error() {
        return Err(format!("audit error after demo: {error}"));
    }

    println!(
        "demo game_id={} accepted={} {} sqlite={}",
        game_id,
        accepted,
        api.status(),
        sqlite_path
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);

    match command {
        Some("status") => match default_api() {
            Ok(api) => println!("{}", api.status()),
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(2);
            }
        },
        Some("state") => match default_api() {
            Ok(api) => match serde_json_pretty(api.state()) {
                Ok(rendered) => println!("{rendered}"),
                Err(err) => {
                    eprintln!("error: {err}");
                    std::process::exit(1);
                }
            },
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(2);
            }
        },
        Some("log") => match default_api() {
            Ok(api) => {
                let limit = match args.get(2) {
                    Some(raw) => match raw.parse::<usize>() {
                        Ok(value) => value,
                        Err(_) => {
                            eprintln!("error: log limit must be a number");
                            std::process::exit(2);
                        }
                    },
                    None => usize::MAX,
                };
                for entry in api.game_log().into_iter().take(limit) {
                    println!("[{}] {}", entry.created_at, entry.message);
                }
            }
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(2);
            }
        },
        Some("serve") => match parse_socket_addr(args.get(2)) {
            Ok(addr) => {
                println!("serving api on http://{addr}");
                if let Err(err) = serve(addr).await {
                    eprintln!("server error: {err}");
                    std::process::exit(1);
                }
            }
            Err(err) => {
                eprintln!("error: {}", err);
                print_usage();
                std::process::exit(2);
            }
        },
        Some("demo") => {
            if let Err(err) = run_demo(&args) {
                eprintln!("error: {err}");
                print_usage();
                std::process::exit(2);
            }
        }
        _ => {
            print_usage();
        }
    }
}

fn serde_json_pretty(state: &contracts::GameState) -> Result<String, String> {
    serde_json::to_string_pretty(state).map_err(|err| format!("failed to render state: {err}"))
}
