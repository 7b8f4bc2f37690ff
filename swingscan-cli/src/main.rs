//! SwingScan CLI: signal reports and universe scans.
//!
//! Commands:
//! - `signal`: backtest one symbol and report today's signal
//! - `scan bullish|breakouts|crossovers`: run a strategy over a universe
//! - `config`: print the default configuration as TOML
//! - `universe`: print the default universe as TOML

mod logging;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use swingscan_core::data::{CandleProvider, Universe};
use swingscan_runner::{
    analyze_symbol, save_report, save_scan, scan_breakouts, scan_bullish, scan_crossovers,
    CsvProvider, ScanConfig, SignalReport, SyntheticProvider,
};

#[derive(Parser)]
#[command(
    name = "swingscan",
    about = "SwingScan CLI: swing-trading signals and strategy scans"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,
}

#[derive(Args, Clone)]
struct DataArgs {
    /// Path to a TOML scan config. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of `<interval>/<SYMBOL>.csv` files.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Use deterministic synthetic candles instead of CSV files.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Last date for synthetic candles (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    end: Option<String>,

    /// Output directory for JSON/CSV artifacts.
    #[arg(long, default_value = "results")]
    output_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest one symbol and report today's signal.
    Signal {
        /// Exchange ticker, e.g. RELIANCE.
        #[arg(long)]
        symbol: String,

        #[command(flatten)]
        data: DataArgs,
    },
    /// Run a strategy over a universe.
    Scan {
        /// Strategy to run.
        #[arg(value_enum)]
        strategy: Strategy,

        #[command(flatten)]
        data: DataArgs,

        /// Universe TOML file. Defaults to the built-in NSE universe.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// Restrict to these universe groups (repeatable).
        #[arg(long)]
        group: Vec<String>,
    },
    /// Print the default configuration as TOML.
    Config,
    /// Print the default universe as TOML.
    Universe,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Strategy {
    /// Multi-factor bullish rating, ranked, bullish only.
    Bullish,
    /// Weekly EMA-proximity breakouts.
    Breakouts,
    /// EMA cascade crossovers on the configured interval.
    Crossovers,
}

impl Strategy {
    fn name(self) -> &'static str {
        match self {
            Strategy::Bullish => "bullish",
            Strategy::Breakouts => "breakouts",
            Strategy::Crossovers => "crossovers",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.log_json)?;

    match cli.command {
        Commands::Signal { symbol, data } => run_signal(&symbol, &data),
        Commands::Scan {
            strategy,
            data,
            universe,
            group,
        } => run_scan(strategy, &data, universe.as_deref(), &group),
        Commands::Config => {
            print!("{}", ScanConfig::default().to_toml()?);
            Ok(())
        }
        Commands::Universe => {
            print!("{}", Universe::default_nse().to_toml()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ScanConfig> {
    match path {
        Some(path) => ScanConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ScanConfig::default()),
    }
}

fn build_provider(data: &DataArgs) -> Result<Box<dyn CandleProvider>> {
    if data.synthetic {
        let end = data
            .end
            .as_deref()
            .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
            .transpose()
            .context("--end must be YYYY-MM-DD")?
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        tracing::warn!(%end, "using synthetic candles; results are not market data");
        Ok(Box::new(SyntheticProvider::new(end)))
    } else {
        Ok(Box::new(CsvProvider::new(&data.data_dir)))
    }
}

fn run_signal(symbol: &str, data: &DataArgs) -> Result<()> {
    let config = load_config(data.config.as_deref())?;
    let provider = build_provider(data)?;

    let report = analyze_symbol(provider.as_ref(), symbol, &config)
        .with_context(|| format!("signal report for {symbol} failed"))?;

    print_json(&report)?;
    print_summary(&report);

    let paths = save_report(&report, &data.output_dir)?;
    eprintln!("Artifacts saved to: {}", paths.dir.display());
    Ok(())
}

fn run_scan(
    strategy: Strategy,
    data: &DataArgs,
    universe_path: Option<&Path>,
    groups: &[String],
) -> Result<()> {
    let config = load_config(data.config.as_deref())?;
    let provider = build_provider(data)?;

    let universe = match universe_path {
        Some(path) => Universe::from_file(path)
            .with_context(|| format!("failed to load universe {}", path.display()))?,
        None => Universe::default_nse(),
    };
    let universe = if groups.is_empty() {
        universe
    } else {
        universe.select(groups)
    };
    let symbols: Vec<String> = universe
        .all_symbols()
        .into_iter()
        .map(str::to_string)
        .collect();
    if symbols.is_empty() {
        anyhow::bail!("universe has no symbols");
    }

    let provider = provider.as_ref();
    let path = match strategy {
        Strategy::Bullish => emit(&scan_bullish(provider, &symbols, &config), strategy, data)?,
        Strategy::Breakouts => emit(&scan_breakouts(provider, &symbols, &config), strategy, data)?,
        Strategy::Crossovers => {
            emit(&scan_crossovers(provider, &symbols, &config), strategy, data)?
        }
    };
    eprintln!("Results saved to: {}", path.display());
    Ok(())
}

fn emit<T: Serialize>(summary: &T, strategy: Strategy, data: &DataArgs) -> Result<PathBuf> {
    print_json(summary)?;
    save_scan(summary, strategy.name(), &data.output_dir)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize result")?;
    println!("{json}");
    Ok(())
}

fn print_summary(report: &SignalReport) {
    eprintln!();
    eprintln!("=== Signal: {} ({}) ===", report.symbol, report.date);
    eprintln!("Price:          {:.2}", report.price);
    eprintln!("Signal:         {}", report.signal.action);
    eprintln!("Reason:         {}", report.signal.reason);
    if let Some(open) = &report.open_position {
        eprintln!(
            "Open position:  entered {} at {:.2} ({:+.2}%)",
            open.entry_date, open.entry_price, open.unrealized_pct
        );
    }
    if let Some(summary) = &report.summary {
        eprintln!();
        eprintln!("--- Backtest ---");
        eprintln!("Trades:         {}", summary.total_trades);
        eprintln!("Total profit:   {:.2}%", summary.total_profit_pct);
        eprintln!(
            "Annualized:     {:.2}% (reference {:.2}%{})",
            summary.annualized_return_pct,
            summary.reference_rate_pct,
            if summary.beats_benchmark { ", beaten" } else { "" }
        );
        eprintln!("Win rate:       {:.1}%", summary.win_rate_pct);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn scan_parses_strategy_and_groups() {
        let cli = Cli::try_parse_from([
            "swingscan", "scan", "breakouts", "--synthetic", "--group", "etfs", "--log-json",
        ])
        .unwrap();
        assert!(cli.log_json);
        match cli.command {
            Commands::Scan {
                strategy, data, group, ..
            } => {
                assert_eq!(strategy.name(), "breakouts");
                assert!(data.synthetic);
                assert_eq!(group, vec!["etfs".to_string()]);
            }
            _ => panic!("expected scan"),
        }
    }
}
