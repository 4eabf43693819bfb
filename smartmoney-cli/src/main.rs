//! Smart Money CLI: scan a symbol universe, alert on new signals.
//!
//! Commands:
//! - `scan`: run one scan, print the top picks, dispatch alerts
//! - `watch`: run scans on a fixed interval
//! - `symbols`: show the universe a scan would use
//! - `config`: print the default config, or validate a config file

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use smartmoney_core::alert::{AlertStore, JsonFileAlertStore, MemoryAlertStore};
use smartmoney_core::data::{
    CircuitBreaker, HistoryProvider, SyntheticProvider, Universe, YahooProvider, YahooSettings,
};
use smartmoney_core::notify::{Notifier, NullNotifier, StdoutNotifier, TelegramNotifier};
use smartmoney_runner::{
    ChannelKind, CycleReport, Delivery, ScanConfig, ScanReport, ScanSession, Scheduler,
};

#[derive(Parser)]
#[command(
    name = "smartmoney",
    about = "Smart Money Tracker: technical signal scanner with deduplicated alerts"
)]
struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. info, debug, smartmoney_runner=trace).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scan, print the top picks, and dispatch alerts.
    Scan {
        #[command(flatten)]
        scan: ScanArgs,

        /// Print the report as JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run scans on a fixed interval until interrupted.
    Watch {
        #[command(flatten)]
        scan: ScanArgs,

        /// Minutes between scan starts.
        #[arg(long, default_value_t = 15)]
        every: u64,

        /// Stop after this many completed scans.
        #[arg(long)]
        cycles: Option<usize>,
    },
    /// Show the symbol universe a scan would use.
    Symbols {
        #[command(flatten)]
        universe: UniverseArgs,
    },
    /// Print the default config, or validate a config file.
    Config {
        /// Config file to validate.
        #[arg(long)]
        check: Option<PathBuf>,
    },
}

#[derive(Args)]
struct UniverseArgs {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// CSV with a `symbol` column. Overrides `scan.symbols_file`.
    #[arg(long)]
    symbols_file: Option<PathBuf>,

    /// Explicit symbols (repeatable). Overrides any symbols file.
    #[arg(long = "symbol")]
    symbols: Vec<String>,

    /// Number of symbols to scan (50–300). Overrides `scan.scan_count`.
    #[arg(long)]
    scan_count: Option<usize>,
}

#[derive(Args)]
struct ScanArgs {
    #[command(flatten)]
    universe: UniverseArgs,

    /// Use deterministic synthetic bars instead of Yahoo Finance.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Scan and print only: no alert state is touched and nothing is sent.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// JSON file for alert state. Overrides `alerts.state_file`.
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Rows to display. Overrides `scan.top_n`.
    #[arg(long)]
    top: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Scan { scan, json } => run_scan(scan, json),
        Commands::Watch { scan, every, cycles } => run_watch(scan, every, cycles),
        Commands::Symbols { universe } => run_symbols(universe),
        Commands::Config { check } => run_config(check),
    }
}

fn init_logging(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &UniverseArgs) -> Result<ScanConfig> {
    let mut config = match &args.config {
        Some(path) => ScanConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ScanConfig::default(),
    };

    if let Some(path) = &args.symbols_file {
        config.scan.symbols_file = path.clone();
    }
    if let Some(count) = args.scan_count {
        config.scan.scan_count = count;
    }
    config.validate()?;
    Ok(config)
}

fn load_universe(args: &UniverseArgs, config: &ScanConfig) -> Universe {
    let universe = if args.symbols.is_empty() {
        Universe::load_or_sample(&config.scan.symbols_file)
    } else {
        Universe::new(args.symbols.clone())
    };
    universe.truncate(config.scan.scan_count)
}

fn build_provider(config: &ScanConfig, synthetic: bool) -> Result<Box<dyn HistoryProvider>> {
    if synthetic {
        return Ok(Box::new(SyntheticProvider::today()));
    }
    let settings = YahooSettings {
        timeout: Duration::from_secs(config.provider.timeout_secs),
        max_retries: config.provider.max_retries,
        ..YahooSettings::default()
    };
    let breaker = Arc::new(CircuitBreaker::default_provider());
    Ok(Box::new(YahooProvider::new(breaker, settings)?))
}

fn build_notifier(config: &ScanConfig) -> Box<dyn Notifier> {
    let timeout = Duration::from_secs(config.notify.timeout_secs);
    match config.notify.channel {
        ChannelKind::Telegram => {
            let telegram = TelegramNotifier::from_env(timeout);
            if !telegram.is_configured() {
                tracing::warn!(
                    "Telegram credentials not set; alerts will be reported as undelivered"
                );
            }
            Box::new(telegram)
        }
        ChannelKind::Stdout => Box::new(StdoutNotifier),
        ChannelKind::None => Box::new(NullNotifier),
    }
}

fn build_store(config: &ScanConfig, override_path: Option<PathBuf>) -> Box<dyn AlertStore> {
    match override_path.or_else(|| config.alerts.state_file.clone()) {
        Some(path) => Box::new(JsonFileAlertStore::open(path)),
        None => Box::new(MemoryAlertStore::new()),
    }
}

fn build_session(args: &ScanArgs, config: ScanConfig) -> Result<ScanSession> {
    let provider = build_provider(&config, args.synthetic)?;
    let (notifier, store): (Box<dyn Notifier>, Box<dyn AlertStore>) = if args.dry_run {
        (Box::new(NullNotifier), Box::new(MemoryAlertStore::new()))
    } else {
        (build_notifier(&config), build_store(&config, args.state_file.clone()))
    };
    Ok(ScanSession::new(config, provider, notifier, store))
}

fn run_scan(args: ScanArgs, json: bool) -> Result<()> {
    let config = load_config(&args.universe)?;
    let universe = load_universe(&args.universe, &config);
    let top_n = args.top.unwrap_or(config.scan.top_n);
    let session = build_session(&args, config)?;
    let now = chrono::Utc::now();

    if args.dry_run {
        let report = session.preview(universe.symbols(), now)?;
        return print_report(&report, top_n, json);
    }

    let cycle = session.run_once(universe.symbols(), now)?;
    print_report(&cycle.scan, top_n, json)?;
    if !json {
        print_dispatch(&cycle);
    }
    Ok(())
}

fn run_watch(args: ScanArgs, every: u64, cycles: Option<usize>) -> Result<()> {
    if every == 0 {
        bail!("--every must be at least 1 minute");
    }
    let config = load_config(&args.universe)?;
    let universe = load_universe(&args.universe, &config);
    let top_n = args.top.unwrap_or(config.scan.top_n);
    let session = build_session(&args, config)?;

    let mut scheduler = Scheduler::new(Duration::from_secs(every * 60));
    if let Some(n) = cycles {
        scheduler = scheduler.with_max_cycles(n);
    }

    println!(
        "Watching {} symbols every {every} min{}",
        universe.len(),
        cycles.map(|n| format!(" for {n} cycles")).unwrap_or_default()
    );

    scheduler.run(&session, universe.symbols(), |cycle| {
        if let Err(e) = print_report(&cycle.scan, top_n, false) {
            tracing::warn!(error = %e, "failed to print report");
        }
        print_dispatch(cycle);
    });
    Ok(())
}

fn run_symbols(args: UniverseArgs) -> Result<()> {
    let config = load_config(&args)?;
    let universe = load_universe(&args, &config);
    println!("{} symbols", universe.len());
    for symbol in universe.symbols() {
        println!("{symbol}");
    }
    Ok(())
}

fn run_config(check: Option<PathBuf>) -> Result<()> {
    match check {
        Some(path) => {
            ScanConfig::from_file(&path)
                .with_context(|| format!("validating {}", path.display()))?;
            println!("{} is valid", path.display());
        }
        None => print!("{}", ScanConfig::default().to_toml()?),
    }
    Ok(())
}

fn print_report(report: &ScanReport, top_n: usize, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!(
        "Scan at {}: {} scanned, {} signals, {} neutral, {} skipped",
        report.evaluated_at.format("%Y-%m-%d %H:%M UTC"),
        report.scanned,
        report.rows.len(),
        report.neutral,
        report.skipped.len()
    );

    let top = report.top(top_n);
    if top.is_empty() {
        println!("No signals.");
        return Ok(());
    }

    println!();
    println!(
        "{:<14} {:<5} {:>10} {:>10} {:>10} {:>12} {:>12}  {}",
        "Symbol", "Side", "Price", "SL", "TP", "Volume", "Avg Volume", "Reasons"
    );
    println!("{}", "-".repeat(100));
    for row in top {
        let c = &row.classification;
        println!(
            "{:<14} {:<5} {:>10.2} {:>10} {:>10} {:>12} {:>12}  {}",
            c.symbol,
            c.direction,
            c.price,
            format_level(c.stop_loss()),
            format_level(c.take_profit()),
            row.volume,
            row.avg_volume.map(|v| format!("{v:.0}")).unwrap_or_else(|| "-".into()),
            c.reason_summary()
        );
    }
    Ok(())
}

fn print_dispatch(cycle: &CycleReport) {
    let d = &cycle.dispatch;
    match &d.delivery {
        Delivery::NothingToSend => println!("Alerts: none new ({} in cool-down)", d.suppressed),
        Delivery::Sent => println!(
            "Alerts: sent {} ({} in cool-down)",
            d.alerted.len(),
            d.suppressed
        ),
        Delivery::Disabled => println!("Alerts: disabled ({} new)", d.alerted.len()),
        Delivery::Failed(e) => {
            eprintln!("Alerts: delivery failed for {}: {e}", d.alerted.join(", "))
        }
    }
    if let Some(e) = &d.state_error {
        eprintln!("Alert state not saved: {e}");
    }
}

fn format_level(level: Option<f64>) -> String {
    level.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".into())
}
