//! IoT House CLI Client
//!
//! Command-line interface for reading and switching a house.

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use iothouse::house::Field;
use iothouse::protocol::Assignment;
use iothouse::house::HouseState;
use iothouse::{Client, PollOutcome, Watcher};

/// IoT House CLI
#[derive(Parser, Debug)]
#[command(name = "iothouse-cli")]
#[command(about = "CLI for the IoT house simulator")]
struct Args {
    /// House address
    #[arg(short, long, default_value = "127.0.0.1:5050")]
    server: String,

    /// Connect/read timeout in milliseconds
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the current house state
    Get,

    /// Switch door, light and/or alarm
    Set {
        #[arg(long)]
        door: Option<Switch>,

        #[arg(long)]
        light: Option<Switch>,

        #[arg(long)]
        alarm: Option<Switch>,
    },

    /// Send a raw frame (terminator appended) without waiting for a reply
    Raw {
        frame: String,
    },

    /// Poll the house and print every state change until Ctrl+C
    Watch {
        /// Delay between polls in milliseconds
        #[arg(long, default_value = "5000")]
        interval_ms: u64,

        /// Missed updates tolerated before contact counts as lost
        #[arg(long, default_value = "6")]
        max_missed: u32,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Switch {
    On,
    Off,
}

impl From<Switch> for bool {
    fn from(switch: Switch) -> bool {
        matches!(switch, Switch::On)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> iothouse::Result<()> {
    let timeout = Duration::from_millis(args.timeout_ms);
    let connect = || Client::connect(&args.server, timeout);

    match args.command {
        Commands::Get => print_state(&connect()?.get_state()?),
        Commands::Set { door, light, alarm } => {
            let assignments: Vec<Assignment> = [(Field::Door, door), (Field::Light, light), (Field::Alarm, alarm)]
                .into_iter()
                .filter_map(|(field, switch)| switch.map(|s| Assignment::new(field, s.into())))
                .collect();

            if assignments.is_empty() {
                println!("nothing to set");
                return Ok(());
            }

            if connect()?.set_state(&assignments)? {
                println!("OK");
            } else {
                println!("house rejected the update");
            }
        }
        Commands::Raw { frame } => {
            let mut bytes = frame.into_bytes();
            bytes.push(iothouse::protocol::TERMINATOR);
            connect()?.send_raw(&bytes)?;
        }
        Commands::Watch { interval_ms, max_missed } => {
            watch(&args.server, timeout, interval_ms, max_missed);
        }
    }

    Ok(())
}

fn watch(server: &str, timeout: Duration, interval_ms: u64, max_missed: u32) {
    let stopped = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stopped);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        tracing::warn!("Could not install signal handler: {}", e);
    }

    let mut watcher = Watcher::new(server, timeout)
        .interval(Duration::from_millis(interval_ms))
        .max_missed(max_missed);

    watcher.run(
        || stopped.load(Ordering::SeqCst),
        |outcome| match outcome {
            PollOutcome::Changed(state) => {
                println!("---");
                print_state(state);
            }
            PollOutcome::Unchanged(_) => {}
            PollOutcome::Missed { missed, lost_contact } => {
                if *lost_contact {
                    println!("lost contact with house after {} missed updates", missed);
                }
            }
        },
    );
}

fn print_state(state: &HouseState) {
    println!("temperature: {}", state.temperature);
    println!("humidity:    {}", state.humidity);
    println!("door:        {}", if state.door_open { "open" } else { "closed" });
    println!("light:       {}", on_off(state.light_on));
    println!("proximity:   {}", if state.proximity_detected { "detected" } else { "clear" });
    println!("alarm:       {}", on_off(state.alarm_on));
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}
