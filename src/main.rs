//! Mediabar - waybar `custom` module for MPRIS players.
//!
//! `mediabar run` prints one JSON line per display change on stdout and takes
//! commands such as `play-pause` or `select-next` from its control socket
//! (`mediabar ctl <command>`) or from stdin.

use std::{
    error::Error,
    path::{Path, PathBuf},
    process,
};

use clap::{Parser, Subcommand};
use futures::StreamExt;
use mediabar::{
    cli::{BarCommand, ControlServer, WaybarOutput, send_command},
    config::{Config, ConfigPaths},
    services::MediaService,
    tracing_config,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument, warn};

#[derive(Parser)]
#[command(name = "mediabar")]
#[command(about = "MPRIS media module for waybar")]
struct Cli {
    /// Configuration file, defaults to `$XDG_CONFIG_HOME/mediabar/config.toml`
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Also write logs to the mediabar state directory
    #[arg(long, global = true)]
    log_file: bool,

    /// Control socket, defaults to `$XDG_RUNTIME_DIR/mediabar.sock`
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream module output and accept commands on the control socket and stdin
    Run,
    /// List the players currently on the bus
    Players,
    /// Print the configuration JSON schema
    Schema,
    /// Send a command to the running instance, e.g. `play-pause` or `select-next`
    Ctl {
        /// Command to send
        command: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = execute(cli).await {
        eprintln!("mediabar: {e}");
        process::exit(1);
    }
}

async fn execute(cli: Cli) -> Result<(), Box<dyn Error>> {
    let command = cli.command.unwrap_or(Commands::Run);
    let socket = cli.socket.unwrap_or_else(ConfigPaths::control_socket);

    match &command {
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&Config::schema())?);
            return Ok(());
        }
        Commands::Ctl { command: line } => {
            line.parse::<BarCommand>()?;
            send_command(&socket, line).await?;
            return Ok(());
        }
        Commands::Run | Commands::Players => {}
    }

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    if cli.log_file {
        tracing_config::init_with_file(&config.general.log_level)?;
    } else {
        tracing_config::init(&config.general.log_level)?;
    }

    match command {
        Commands::Run => run(&config, &socket).await,
        Commands::Players => list_players(&config).await,
        Commands::Schema | Commands::Ctl { .. } => Ok(()),
    }
}

#[instrument(skip_all)]
async fn run(config: &Config, socket: &Path) -> Result<(), Box<dyn Error>> {
    let service = MediaService::start(&config.media).await?;
    let remote = service.remote();
    info!("media service started");

    let control = match ControlServer::bind(socket) {
        Ok(server) => Some(tokio::spawn(server.serve(remote.clone()))),
        Err(e) => {
            warn!("Control socket unavailable at {}: {e}", socket.display());
            None
        }
    };

    let mut display = Box::pin(service.watch_display());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            state = display.next() => {
                let Some(state) = state else {
                    break;
                };
                println!("{}", WaybarOutput::from_display(&state, &config.media).to_line()?);
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) if line.trim().is_empty() => {}
                    Some(line) => match line.parse::<BarCommand>() {
                        Ok(command) => {
                            debug!(?command, "command from stdin");
                            command.apply(&remote)?;
                        }
                        Err(e) => warn!("{e}"),
                    },
                    None => {
                        debug!("stdin closed, commands disabled");
                        stdin_open = false;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }

    if let Some(control) = control {
        control.abort();
        let _ = control.await;
    }

    service.shutdown().await;
    Ok(())
}

async fn list_players(config: &Config) -> Result<(), Box<dyn Error>> {
    let service = MediaService::start(&config.media).await?;

    let players = service.players();
    if players.is_empty() {
        println!("No players");
    }

    for player in players {
        let marker = if player.current { "*" } else { " " };
        let availability = if player.available { "" } else { " (unavailable)" };
        println!(
            "{marker} {} [{}] {}{availability}",
            player.id.short_name(),
            player.state,
            player.title
        );
    }

    service.shutdown().await;
    Ok(())
}
