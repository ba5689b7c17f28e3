use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "flightfocus", version, about = "FlightFocus: focus sessions framed as flights")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fly a focus session between two airports
    Fly(commands::fly::FlyArgs),
    /// Seat class selection
    Class {
        #[command(subcommand)]
        action: commands::class::ClassAction,
    },
    /// Flight statistics
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Completed flights, newest first
    History {
        /// Number of flights to show
        #[arg(long, default_value = "10")]
        limit: usize,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the built-in airports
    Destinations {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// First-run welcome
    Onboard,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FLIGHTFOCUS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Fly(args) => commands::fly::run(args),
        Commands::Class { action } => commands::class::run(action),
        Commands::Stats { json } => commands::stats::run(json),
        Commands::History { limit, json } => commands::history::run(limit, json),
        Commands::Destinations { json } => commands::destinations::run(json),
        Commands::Config { action } => commands::config::run(action),
        Commands::Onboard => commands::onboard::run(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
