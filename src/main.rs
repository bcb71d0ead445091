//! Harmony CLI
//!
//! Usage:
//!   harmony --status                          # Show the starting snapshot
//!   harmony --set ai=0.03 --set quantum=0.7   # Apply writes, print result
//!   harmony --strategy balanced --status      # Switch strategy
//!   harmony --emergency "sensor fault"        # Reset to baseline
//!   harmony --interactive                     # REPL
//!   harmony --serve                           # HTTP API server
//!   harmony --config harmony.json --json      # Config file, JSON output

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use harmony::core::{
    run_server, Command, CommandError, CommandParser, CoordinatorConfig, SafetyCoordinator,
};
use harmony::core::command::HELP;
use harmony::types::{AggregationStrategy, SafetyError, SystemSnapshot};
use harmony::{BASELINE, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "harmony",
    version = VERSION,
    about = "Harmonize component safety levels into one system operating mode",
    long_about = "Harmony aggregates independent component safety levels (0.0-1.0)\n\
                  into one system level and classifies it into a severity bucket.\n\n\
                  Strategies:\n  \
                  conservative - minimum (default)\n  \
                  balanced     - arithmetic mean\n  \
                  performance  - maximum\n\n\
                  Buckets:\n  \
                  CRITICAL_LOW  [0.00, 0.05]   WARNING_LOW  (0.05, 0.15]\n  \
                  CAUTION_LOW   (0.15, 0.25)   OPTIMAL      [0.25, 0.75]\n  \
                  CAUTION_HIGH  (0.75, 0.85]   WARNING_HIGH (0.85, 0.95)\n  \
                  CRITICAL_HIGH [0.95, 1.00]\n\n\
                  Emergency stabilization resets every component to the baseline (0.618)."
)]
struct Args {
    /// Set a component level, repeatable (e.g. --set ai=0.3)
    #[arg(long = "set", value_name = "ID=LEVEL", value_parser = parse_assignment)]
    set: Vec<(String, f64)>,

    /// Aggregation strategy (conservative, balanced, performance)
    #[arg(long)]
    strategy: Option<AggregationStrategy>,

    /// Set every component to LEVEL
    #[arg(long, value_name = "LEVEL", allow_negative_numbers = true)]
    harmonize: Option<f64>,

    /// Reset every component to the baseline, recording REASON
    #[arg(long, value_name = "REASON")]
    emergency: Option<String>,

    /// Print the snapshot and exit
    #[arg(long)]
    status: bool,

    /// Interactive mode - read commands from stdin
    #[arg(short, long)]
    interactive: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Debug logging and operating-mode details
    #[arg(long)]
    verbose: bool,
}

impl Args {
    fn has_mutations(&self) -> bool {
        !self.set.is_empty()
            || self.strategy.is_some()
            || self.harmonize.is_some()
            || self.emergency.is_some()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args);
    if args.no_color {
        colored::control::set_override(false);
    }

    let config = CoordinatorConfig::load_or_default(args.config.as_deref())
        .context("loading configuration")?;
    let mut coordinator =
        SafetyCoordinator::from_config(&config).context("building coordinator from configuration")?;

    apply_mutations(&mut coordinator, &args)?;

    if args.serve {
        run_server(&args.addr, coordinator)
            .await
            .with_context(|| format!("serving on {}", args.addr))?;
    } else if args.interactive || !(args.status || args.has_mutations()) {
        // Default to interactive if no mode specified
        run_interactive(&mut coordinator, &args);
    } else {
        let snapshot = coordinator.snapshot().context("reading system state")?;
        print_snapshot(&snapshot, &args);
    }
    Ok(())
}

/// Log to stderr so stdout stays parseable
fn init_tracing(args: &Args) {
    let filter = if args.verbose {
        "debug"
    } else if args.serve {
        "info"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(!args.no_color)
                .without_time(),
        )
        .init();
}

/// Apply command-line writes in a fixed order: strategy, sets, harmonize, emergency
fn apply_mutations(coordinator: &mut SafetyCoordinator, args: &Args) -> Result<()> {
    if let Some(strategy) = args.strategy {
        coordinator
            .set_strategy(strategy)
            .with_context(|| format!("switching strategy to {}", strategy))?;
    }
    for (id, level) in &args.set {
        coordinator
            .set_component_safety(id, *level)
            .with_context(|| format!("setting {} to {}", id, level))?;
    }
    if let Some(level) = args.harmonize {
        coordinator
            .harmonize_all(level)
            .with_context(|| format!("harmonizing to {}", level))?;
    }
    if let Some(reason) = &args.emergency {
        coordinator
            .emergency_stabilize(reason)
            .context("emergency stabilization")?;
    }
    Ok(())
}

/// Parse `id=level`
fn parse_assignment(raw: &str) -> Result<(String, f64), String> {
    let (id, level) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=LEVEL, got '{}'", raw))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing component id in '{}'", raw));
    }
    let level = level
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("'{}' is not a number", level.trim()))?;
    Ok((id.to_string(), level))
}

/// Run interactive mode
fn run_interactive(coordinator: &mut SafetyCoordinator, args: &Args) {
    let parser = CommandParser::new();

    print_header(args.no_color);
    println!("Type 'help' for commands, 'quit' to exit.");
    println!("Baseline: {:.3}", BASELINE);
    println!();
    if let Ok(snapshot) = coordinator.snapshot() {
        print_snapshot(&snapshot, args);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{}", format_prompt(coordinator));
        if stdout.flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => break,
        }

        let command = match parser.parse(&line) {
            Ok(command) => command,
            Err(CommandError::Empty) => continue,
            Err(err) => {
                println!("{}", format!("⚠ {}", err).yellow());
                continue;
            }
        };

        if command == Command::Quit {
            println!("\nSession ended. Updates: {}", coordinator.update_count());
            break;
        }

        if let Err(err) = execute(coordinator, command, args) {
            println!("{}", format!("✗ {}", err).red());
        }
    }
}

/// Execute one REPL command
fn execute(coordinator: &mut SafetyCoordinator, command: Command, args: &Args) -> Result<(), SafetyError> {
    match command {
        Command::Set { component_id, level } => {
            coordinator.set_component_safety(&component_id, level)?;
        }
        Command::Get { component_id } => {
            let level = coordinator.get_level(&component_id)?;
            println!("{} = {:.3}", component_id, level);
            return Ok(());
        }
        Command::Register { component_id, level } => {
            coordinator.register_component(component_id, level.unwrap_or(BASELINE))?;
        }
        Command::Strategy(strategy) => {
            coordinator.set_strategy(strategy)?;
        }
        Command::Harmonize(level) => {
            coordinator.harmonize_all(level)?;
        }
        Command::Emergency { reason } => {
            coordinator.emergency_stabilize(&reason)?;
        }
        Command::Status => {}
        Command::Audit => {
            for entry in coordinator.audit_log().entries() {
                println!("{}", entry.to_line());
            }
            return Ok(());
        }
        Command::Help => {
            println!("{}", HELP);
            return Ok(());
        }
        Command::Quit => return Ok(()),
    }

    let snapshot = coordinator.snapshot()?;
    print_snapshot(&snapshot, args);
    Ok(())
}

/// Print header
fn print_header(no_color: bool) {
    let title = format!("Harmony v{} - Interactive", VERSION);
    if no_color {
        println!("========================================");
        println!("  {}", title);
        println!("========================================");
    } else {
        println!("{}", "╔══════════════════════════════════════════╗".bold());
        println!("{}", format!("║  {:<40}║", title).bold());
        println!("{}", "╚══════════════════════════════════════════╝".bold());
    }
    println!();
}

/// Prompt shows the current bucket
fn format_prompt(coordinator: &SafetyCoordinator) -> String {
    match coordinator.bucket() {
        Some(bucket) => format!("{} ", format!("[{}] >", bucket).color(bucket.color())),
        None => "[EMPTY] > ".to_string(),
    }
}

/// Print a snapshot in the selected format
fn print_snapshot(snapshot: &SystemSnapshot, args: &Args) {
    if args.json {
        match serde_json::to_string_pretty(snapshot) {
            Ok(json) => println!("{}", json),
            Err(err) => eprintln!("failed to serialize snapshot: {}", err),
        }
        return;
    }

    if args.no_color {
        println!("{}", snapshot.to_parseable_string());
    } else {
        println!("{}", snapshot.to_terminal_string());
    }

    if args.verbose {
        let mode = snapshot.bucket.operating_mode();
        let capabilities = mode
            .capabilities
            .iter()
            .map(|c| format!("{:?}", c).to_lowercase())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "  mode={} | max_ops={} | resource_ceiling={:.2} | capabilities=[{}]",
            mode.tag, mode.max_concurrent_operations, mode.resource_ceiling, capabilities
        );
    }
}
