use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use wxmon_console::config::{self, Config};
use wxmon_console::logging::{self, DataSource, LogLevel};
use wxmon_console::model::Snapshot;
use wxmon_console::source::Source;
use wxmon_console::{render, replay, ui, verify};

#[derive(Parser)]
#[command(name = "wxmon", version, about = "Console viewer for a weather-station observation feed")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = "wxmon.toml")]
    config: PathBuf,

    /// Station identifier override (e.g. KMPR)
    #[arg(long)]
    station: Option<String>,

    /// Data source override: "nws" or "station-api"
    #[arg(long)]
    source: Option<String>,

    /// Render a single refresh to stdout and exit
    #[arg(long)]
    once: bool,

    /// Render from an exported history.csv instead of the network
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Append log entries to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Log debug-level detail
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Probe the configured source endpoints and print a report
    Verify,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("wxmon: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    if let Some(station) = &cli.station {
        config.station = station.to_uppercase();
    }
    if let Some(raw) = &cli.source {
        config.source = config::parse_source_kind(raw)?;
    }
    config.validate()?;

    // The interactive screen owns the terminal; keep the logger off the
    // console there and rely on the log file instead.
    let interactive = cli.command.is_none() && !cli.once && cli.replay.is_none();
    let min_level = if cli.verbose { LogLevel::Debug } else { LogLevel::Info };
    let log_file = cli.log_file.as_ref().and_then(|p| p.to_str().map(String::from));
    logging::init_logger(min_level, log_file.as_deref(), !interactive);

    match cli.command {
        Some(Command::Verify) => {
            let report = verify::run_full_verification(&config)?;
            verify::print_summary(&report);
            return Ok(());
        }
        None => {}
    }

    if let Some(path) = &cli.replay {
        let rows = replay::load_history_csv(path)?;
        logging::info(
            DataSource::System,
            Some(&config.station),
            &format!("replaying {} rows from {}", rows.len(), path.display()),
        );
        print_snapshot(&replay::snapshot_from_rows(rows, &config.station));
        return Ok(());
    }

    let mut source = Source::from_config(&config)?;

    if cli.once {
        let snapshot = source.refresh()?;
        print_snapshot(&snapshot);
        return Ok(());
    }

    ui::run(&mut source, &config)
}

/// Plain stdout rendering for the non-interactive modes.
fn print_snapshot(snapshot: &Snapshot) {
    for line in render::render_current_panel(&snapshot.current) {
        println!("{}", line);
    }
    println!("{}", render::render_stamp(&snapshot.current, snapshot.stale));
    println!();
    println!("{}", render::history_header());
    for line in render::render_history_rows(&snapshot.history) {
        println!("{}", line);
    }
}
