//! devband CLI — analyze one symbol or screen the universe.
//!
//! Commands:
//! - `analyze` — deviation bands, tier episodes, and entry ranges for a symbol
//! - `screen` — symbols whose latest close sits between the EMA and the
//!   average-deviation line
//! - `universe` — print the active universe as TOML

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use devband_core::data::{
    CircuitBreaker, CsvProvider, DataProvider, SyntheticProvider, YahooProvider,
};
use devband_runner::{
    analyze_symbol, export_json, render_markdown, render_screen, render_text, run_screen,
    write_chart_csv, DashboardConfig, LogProgress,
};

#[derive(Parser)]
#[command(
    name = "devband",
    version,
    about = "devband — EMA deviation-band dashboard and screener"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Read `<SYMBOL>.csv` files from this directory instead of Yahoo Finance.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use deterministic synthetic prices (no network).
    #[arg(long, global = true, default_value_t = false)]
    synthetic: bool,

    /// Use unadjusted closes from Yahoo Finance instead of adjusted closes.
    #[arg(long, global = true, default_value_t = false)]
    raw_close: bool,

    /// Start date (YYYY-MM-DD). Overrides the config.
    #[arg(long, global = true)]
    start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(long, global = true)]
    end: Option<NaiveDate>,

    /// Debug logging.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute deviation bands and the summary report for one symbol.
    Analyze {
        /// Ticker, e.g. RELIANCE.NS.
        symbol: String,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Also write per-date chart data to this CSV file.
        #[arg(long)]
        chart_csv: Option<PathBuf>,
    },
    /// Screen every symbol of the universe.
    Screen {
        /// Only screen this sector.
        #[arg(long)]
        sector: Option<String>,

        #[arg(long, value_enum, default_value_t = ScreenFormat::Text)]
        format: ScreenFormat,
    },
    /// Print the active universe as TOML.
    Universe,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Markdown,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScreenFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Analyze {
            symbol,
            format,
            chart_csv,
        } => run_analyze(&cli, &config, symbol, *format, chart_csv.as_deref()),
        Commands::Screen { sector, format } => {
            run_screen_cmd(&cli, &config, sector.as_deref(), *format)
        }
        Commands::Universe => {
            let universe = config.load_universe()?;
            log::info!(
                "{} sectors, {} tickers",
                universe.sector_names().len(),
                universe.ticker_count()
            );
            print!("{}", universe.to_toml()?);
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

/// Config file (or defaults) with command-line overrides applied.
fn load_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut config = match &cli.config {
        Some(path) => DashboardConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => DashboardConfig::default(),
    };
    if let Some(start) = cli.start {
        config.start_date = start;
    }
    if let Some(end) = cli.end {
        config.end_date = Some(end);
    }
    if cli.data_dir.is_some() {
        config.data_dir = cli.data_dir.clone();
    }
    config.validate()?;
    Ok(config)
}

fn build_provider(cli: &Cli, config: &DashboardConfig) -> Result<Box<dyn DataProvider>> {
    if cli.synthetic {
        log::info!("using synthetic prices");
        return Ok(Box::new(SyntheticProvider::default()));
    }
    if let Some(dir) = &config.data_dir {
        log::info!("reading CSV files from {}", dir.display());
        return Ok(Box::new(CsvProvider::new(dir.clone())));
    }
    let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
    let provider = YahooProvider::new(circuit_breaker).context("failed to build HTTP client")?;
    if cli.raw_close {
        log::info!("using unadjusted closes");
        return Ok(Box::new(provider.with_raw_close()));
    }
    Ok(Box::new(provider))
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn run_analyze(
    cli: &Cli,
    config: &DashboardConfig,
    symbol: &str,
    format: Format,
    chart_csv: Option<&Path>,
) -> Result<()> {
    let provider = build_provider(cli, config)?;
    let opts = config.analysis_options(today());
    let analysis = analyze_symbol(provider.as_ref(), symbol, &opts)?;
    let report = analysis.report();

    match format {
        Format::Text => print!("{}", render_text(&report)),
        Format::Markdown => print!("{}", render_markdown(&report)),
        Format::Json => println!("{}", export_json(&report)?),
    }

    if let Some(path) = chart_csv {
        write_chart_csv(&analysis, path)?;
        log::info!("chart data written to {}", path.display());
    }
    Ok(())
}

fn run_screen_cmd(
    cli: &Cli,
    config: &DashboardConfig,
    sector: Option<&str>,
    format: ScreenFormat,
) -> Result<()> {
    let universe = config.load_universe()?;
    let symbols: Vec<&str> = match sector {
        Some(name) => universe
            .sector_tickers(name)
            .with_context(|| format!("known sectors: {}", universe.sector_names().join(", ")))?
            .iter()
            .map(String::as_str)
            .collect(),
        None => universe.all_tickers(),
    };

    let provider = build_provider(cli, config)?;
    let opts = config.analysis_options(today());
    let summary = run_screen(
        provider.as_ref(),
        &symbols,
        &opts,
        config.parallel,
        config.max_threads,
        Some(&LogProgress),
    );

    match format {
        ScreenFormat::Text => print!("{}", render_screen(&summary)),
        ScreenFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("failed to serialize screen results")?
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_close_is_a_global_flag() {
        let cli = Cli::try_parse_from(["devband", "analyze", "TCS.NS", "--raw-close"]).unwrap();
        assert!(cli.raw_close);
        assert!(!cli.synthetic);

        let cli = Cli::try_parse_from(["devband", "universe"]).unwrap();
        assert!(!cli.raw_close);
    }
}
