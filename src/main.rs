//! Operator console for the environmental control device.
//!
//! Usage:
//!   env-control-panel status
//!   env-control-panel mode manual
//!   env-control-panel fan
//!   env-control-panel console

use clap::{Parser, Subcommand, ValueEnum};
use env_control_panel::config::{self, Config};
use env_control_panel::control::{Actuator, ControlStateSynchronizer, ModeChange, ToggleOutcome};
use env_control_panel::error::Result;
use env_control_panel::panel::{self, Operation};
use env_control_panel::remote::{HttpControlClient, Mode};
use log::{info, warn};
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "env-control-panel")]
#[command(about = "Observe and control the mode, fan and pump of an environmental control device")]
struct Cli {
    /// Base URL of the device backend API
    #[arg(long, env = "CONTROL_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current device state
    Status,
    /// Switch the control regime
    Mode {
        #[arg(value_enum)]
        mode: ModeArg,
    },
    /// Toggle the exhaust fan (manual mode only)
    Fan,
    /// Toggle the water pump (manual mode only)
    Pump,
    /// Interactive panel reading commands from stdin
    Console,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Auto,
    Manual,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Auto => Mode::Automatic,
            ModeArg::Manual => Mode::Manual,
        }
    }
}

type Synchronizer = ControlStateSynchronizer<HttpControlClient>;

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    config::load_dotenv();
    init_logger();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(url) = cli.api_url {
        config.remote.base_url = url;
    }
    info!("Device backend: {}", config.remote.base_url);

    let client = match HttpControlClient::new(&config.remote) {
        Ok(client) => client,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let sync = ControlStateSynchronizer::new(client);

    // Initialization failure is not fatal: the panel keeps its defaults
    let initialized = sync.initialize().await;
    if initialized.is_err() {
        notice(Operation::Initialize);
    }

    let ok = match cli.command {
        Commands::Status => initialized.is_ok(),
        Commands::Mode { mode } => run(&sync, Command::Mode(mode.into())).await,
        Commands::Fan => run(&sync, Command::Toggle(Actuator::Fan)).await,
        Commands::Pump => run(&sync, Command::Toggle(Actuator::Pump)).await,
        Commands::Console => {
            print!("{}", panel::render(&config.panel.name, &sync.snapshot()));
            console(&sync, &config.panel.name).await;
            return ExitCode::SUCCESS;
        }
    };

    print!("{}", panel::render(&config.panel.name, &sync.snapshot()));
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Mode(Mode),
    Toggle(Actuator),
}

/// Run one operator command, printing a notice on failure. Returns whether
/// the command succeeded.
async fn run(sync: &Synchronizer, command: Command) -> bool {
    match command {
        Command::Mode(mode) => report(
            Operation::ChangeMode,
            sync.change_mode(mode).await.map(|change| {
                if let ModeChange::ReadBackFailed(e) = change {
                    println!("Mode changed, but actuator status could not be refreshed: {}", e);
                }
            }),
        ),
        Command::Toggle(actuator) => report(
            Operation::Toggle(actuator),
            match actuator {
                Actuator::Fan => sync.toggle_fan().await,
                Actuator::Pump => sync.toggle_pump().await,
            }
            .map(|outcome| {
                if outcome == ToggleOutcome::Ignored {
                    println!(
                        "{} is controlled automatically; switch to manual mode first.",
                        actuator.label()
                    );
                }
            }),
        ),
    }
}

fn report(operation: Operation, result: Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!("{:?} failed: {}", operation, e);
            notice(operation);
            false
        }
    }
}

fn notice(operation: Operation) {
    eprintln!("!! {}", operation.failure_notice());
}

async fn console(sync: &Synchronizer, name: &str) {
    println!("Commands: status, auto, manual, fan, pump, quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read console input: {}", e);
                break;
            }
        };

        let command = match line.trim() {
            "" => continue,
            "quit" | "exit" => break,
            "status" => None,
            "auto" => Some(Command::Mode(Mode::Automatic)),
            "manual" => Some(Command::Mode(Mode::Manual)),
            "fan" => Some(Command::Toggle(Actuator::Fan)),
            "pump" => Some(Command::Toggle(Actuator::Pump)),
            other => {
                println!("Unknown command: {}", other);
                continue;
            }
        };

        if let Some(command) = command {
            run(sync, command).await;
        }

        print!("{}", panel::render(name, &sync.snapshot()));
    }
}
