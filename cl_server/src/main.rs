//! Clue-Less game server using the async actor model.
//!
//! Spawns one session actor per game on demand; clients connect over
//! WebSockets and all gameplay flows through the actors.

use anyhow::Error;
use ctrlc::set_handler;
use log::info;
use pico_args::Arguments;

use cl_server::api::{AppState, create_router};
use cl_server::config::ServerConfig;
use clue_less::session::SessionManager;

const HELP: &str = "\
Run a Clue-Less game server

USAGE:
  cl_server [OPTIONS]

OPTIONS:
  --bind          IP:PORT  Server socket bind address   [default: env SERVER_BIND or 127.0.0.1:7878]
  --turn-timeout  SECS     Turn timer (0 disables it)   [default: env TURN_TIMEOUT_SECS or 120]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  TURN_TIMEOUT_SECS        Seconds before an idle turn is force-passed
  RUST_LOG                 Log filter (e.g., info, debug)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override = pargs.opt_value_from_str("--bind")?;
    let turn_timeout_override = pargs.opt_value_from_str("--turn-timeout")?;
    let config = ServerConfig::from_env(bind_override, turn_timeout_override)?;

    // Catching signals for exit (SIGINT and SIGTERM).
    set_handler(|| std::process::exit(0))?;

    env_logger::builder().format_target(false).init();
    info!("Starting Clue-Less server at {}", config.bind);
    match config.session_config().turn_timeout {
        Some(timeout) => info!("Turn timer: {}s", timeout.as_secs()),
        None => info!("Turn timer disabled"),
    }

    let session_manager = SessionManager::new(config.session_config());
    let state = AppState { session_manager };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
