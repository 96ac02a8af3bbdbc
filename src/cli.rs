//! CLI definition and dispatch.
//!
//! Each command runs in stages: load config, validate, wire adapters, fetch
//! data, compute. Progress and warnings go to stderr, results to stdout, and
//! errors map to typed exit codes.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::cache_adapter::CachedDataAdapter;
use crate::adapters::csv_adapter::CsvDataAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report_adapter::{self, TextReportAdapter};
use crate::domain::backtest::{StrategyRun, DEFAULT_INITIAL_CAPITAL};
use crate::domain::config_validation::{build_strategy_spec, validate_backtest_config};
use crate::domain::error::NiftytraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::strategy::StrategySpec;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "niftytrader", about = "Indian market strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
        #[arg(long)]
        period: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the current signal for a ticker
    Signal {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
    },
    /// Show the available data range for a ticker
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
    },
    /// List tickers available in the data directory
    ListTickers {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            ticker,
            period,
            output,
        } => run_backtest(&config, ticker.as_deref(), period.as_deref(), output.as_ref()),
        Command::Signal { config, ticker } => run_signal(&config, ticker.as_deref()),
        Command::Info { config, ticker } => run_info(&config, ticker.as_deref()),
        Command::ListTickers { config } => run_list_tickers(&config),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = NiftytraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn fail(err: &NiftytraderError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

/// Wire the data port from `[data]`: a CSV directory, wrapped by the file
/// cache when a cache_dir is configured and use_cache is not disabled.
pub fn build_data_port(config: &dyn ConfigPort) -> Result<Box<dyn DataPort>, NiftytraderError> {
    let dir = match config.get_string("data", "dir") {
        Some(s) if !s.trim().is_empty() => s,
        _ => {
            return Err(NiftytraderError::ConfigMissing {
                section: "data".to_string(),
                key: "dir".to_string(),
            })
        }
    };

    let csv = CsvDataAdapter::new(PathBuf::from(dir));

    match config.get_string("data", "cache_dir") {
        Some(cache_dir) if config.get_bool("data", "use_cache", true) => Ok(Box::new(
            CachedDataAdapter::new(csv, PathBuf::from(cache_dir)),
        )),
        _ => Ok(Box::new(csv)),
    }
}

/// Resolve the ticker and period from CLI overrides or `[backtest]`/`[data]`.
fn resolve_target(
    config: &dyn ConfigPort,
    ticker_override: Option<&str>,
    period_override: Option<&str>,
) -> Result<(String, String), NiftytraderError> {
    let ticker = match ticker_override {
        Some(t) => t.to_string(),
        None => config.get_string("backtest", "ticker").ok_or_else(|| {
            NiftytraderError::ConfigMissing {
                section: "backtest".to_string(),
                key: "ticker".to_string(),
            }
        })?,
    };

    let period = period_override
        .map(str::to_string)
        .or_else(|| config.get_string("data", "period"))
        .unwrap_or_else(|| "10y".to_string());

    Ok((ticker, period))
}

fn fetch_bars(
    config: &dyn ConfigPort,
    ticker: &str,
    period: &str,
) -> Result<Vec<OhlcvBar>, NiftytraderError> {
    let data_port = build_data_port(config)?;

    eprintln!("Fetching {} ({})", ticker, period);
    let bars = data_port.fetch_ohlcv(ticker, period)?;

    if bars.is_empty() {
        return Err(NiftytraderError::NoData {
            ticker: ticker.to_string(),
        });
    }

    eprintln!(
        "  {}: {} bars, {} to {}",
        ticker,
        bars.len(),
        bars[0].date,
        bars[bars.len() - 1].date
    );
    Ok(bars)
}

/// A series shorter than the spec's warm-up still runs, it just cannot emit
/// signals. Surface that as a warning so "no signal" and "not enough data"
/// stay distinguishable.
fn warn_if_short(bars: &[OhlcvBar], spec: &StrategySpec, ticker: &str) {
    if bars.len() < spec.min_bars() {
        let err = NiftytraderError::InsufficientData {
            ticker: ticker.to_string(),
            bars: bars.len(),
            minimum: spec.min_bars(),
        };
        eprintln!("Warning: {} for {}, expect no signals", err, spec);
    }
}

fn run_backtest(
    config_path: &PathBuf,
    ticker_override: Option<&str>,
    period_override: Option<&str>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(&e);
    }

    let spec = match build_strategy_spec(&adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let (ticker, period) = match resolve_target(&adapter, ticker_override, period_override) {
        Ok(t) => t,
        Err(e) => return fail(&e),
    };

    let bars = match fetch_bars(&adapter, &ticker, &period) {
        Ok(b) => b,
        Err(e) => return fail(&e),
    };
    warn_if_short(&bars, &spec, &ticker);

    let initial_capital =
        adapter.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL);

    eprintln!("Running {} on {}", spec, ticker);
    let mut strategy_run = StrategyRun::new(bars, spec.clone());
    let result = strategy_run.backtest(initial_capital);

    print!(
        "{}",
        text_report_adapter::format_summary(&result, &spec, &ticker)
    );

    if let Some(output) = output_path {
        let report = TextReportAdapter::new();
        match report.write(&result, &spec, &ticker, &output.display().to_string()) {
            Ok(()) => eprintln!("Report written to {}", output.display()),
            Err(e) => return fail(&e),
        }
    }

    ExitCode::SUCCESS
}

fn run_signal(config_path: &PathBuf, ticker_override: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let spec = match build_strategy_spec(&adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let (ticker, period) = match resolve_target(&adapter, ticker_override, None) {
        Ok(t) => t,
        Err(e) => return fail(&e),
    };

    let bars = match fetch_bars(&adapter, &ticker, &period) {
        Ok(b) => b,
        Err(e) => return fail(&e),
    };
    warn_if_short(&bars, &spec, &ticker);

    let mut strategy_run = StrategyRun::new(bars, spec);
    match strategy_run.current_signal() {
        Some(current) => {
            println!("{} @ {:.2} ({})", current.action, current.price, current.date);
            ExitCode::SUCCESS
        }
        None => fail(&NiftytraderError::NoData { ticker }),
    }
}

fn run_info(config_path: &PathBuf, ticker_override: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let (ticker, period) = match resolve_target(&adapter, ticker_override, None) {
        Ok(t) => t,
        Err(e) => return fail(&e),
    };

    match fetch_bars(&adapter, &ticker, &period) {
        Ok(bars) => {
            println!(
                "{}: {} bars, {} to {}",
                ticker,
                bars.len(),
                bars[0].date,
                bars[bars.len() - 1].date
            );
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_list_tickers(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let data_port = match build_data_port(&adapter) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    match data_port.list_tickers() {
        Ok(tickers) => {
            for ticker in tickers {
                println!("{}", ticker);
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(&e);
    }

    match build_strategy_spec(&adapter) {
        Ok(spec) => {
            println!("Configuration OK: {}", spec);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
