//! chess-netplay - play chess against another person over TCP.

use chess_netplay::console::{spawn_input, ConsoleObserver};
use chess_netplay::{spawn_ticker, Config, Connection, GameController, Role};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "chess-netplay")]
#[command(about = "Two-player chess over a TCP connection")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Wait for a player to join, then play White
    Host(ConnectArgs),
    /// Connect to a host and play Black
    Join(ConnectArgs),
}

#[derive(Args)]
struct ConnectArgs {
    /// Address to bind (host) or connect to (join)
    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    /// Seconds each side gets per turn
    #[arg(long)]
    turn_seconds: Option<u32>,

    /// Config file (default: netplay.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    let (role, args) = match cli.command {
        Command::Host(args) => (Role::Host, args),
        Command::Join(args) => (Role::Joiner, args),
    };

    let config = match &args.config {
        Some(path) => Config::from_path(path)?,
        None => Config::load()?,
    }
    .with_overrides(args.host, args.port, args.turn_seconds);
    tracing::info!(
        "Starting as {} ({}), {}s per turn",
        role,
        role.color(),
        config.turn_seconds
    );

    let connection = match role {
        Role::Host => Connection::host(config.addr()).await?,
        Role::Joiner => Connection::join(config.addr()).await?,
    };

    let (events_tx, events_rx) = mpsc::channel(64);
    let session = connection.spawn(events_tx.clone());
    let _ticker = spawn_ticker(events_tx.clone());
    let _input = spawn_input(events_tx);

    let controller = GameController::new(
        role,
        config.turn_seconds,
        session.outbound,
        ConsoleObserver::new(role.color()),
    );
    controller.run(events_rx).await?;

    tracing::info!("Goodbye");
    Ok(())
}
