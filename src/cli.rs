//! CLI definition and dispatch.

use chrono::{Duration, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::chart_recorder::ChartRecorder;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig};
use crate::domain::config_validation::{
    parse_date, parse_schedule_time, validate_backtest_config, validate_strategy_config,
    DEFAULT_SCHEDULE_TIME,
};
use crate::domain::error::MomtraderError;
use crate::domain::metrics::Metrics;
use crate::domain::price::InstrumentId;
use crate::domain::risk::DEFAULT_RISK_THRESHOLD;
use crate::domain::signal::{DEFAULT_SHORT_WINDOW, DEFAULT_TRADING_DAYS};
use crate::domain::strategy::{
    evaluate_tick, Decision, StrategyConfig, StrategyState, TickOutcome, DEFAULT_SYMBOL,
    DEFAULT_TARGET_FRACTION, DEFAULT_VOLATILITY_PERIOD,
};
use crate::domain::volatility::{DEFAULT_BAND_CENTER, DEFAULT_VOLATILITY_SCALE};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_OUTPUT_DIR: &str = "report";
pub const DEFAULT_INITIAL_CAPITAL: f64 = 1_000_000.0;

#[derive(Parser, Debug)]
#[command(name = "momtrader", about = "Single-asset momentum trading rule")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a daily backtest over the configured date range
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Evaluate a single tick against the latest data
    Signal {
        #[arg(short, long)]
        config: PathBuf,
        /// Tick date; only bars strictly before it are used
        #[arg(long)]
        as_of: Option<String>,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the data range for the configured symbol
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            output,
            symbol,
        } => run_backtest(&config, output.as_deref(), symbol.as_deref()),
        Command::Signal {
            config,
            as_of,
            symbol,
        } => run_signal(&config, as_of.as_deref(), symbol.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
    }
}

fn fail(err: &MomtraderError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

/// Strategy parameters with defaults for absent keys. Call
/// `validate_strategy_config` first; this does not range-check.
pub fn build_strategy_config(
    config: &dyn ConfigPort,
    symbol_override: Option<&str>,
) -> StrategyConfig {
    let symbol = match symbol_override {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => config.get_string_or("strategy", "symbol", DEFAULT_SYMBOL),
    };

    StrategyConfig {
        instrument: InstrumentId::new(&symbol),
        volatility_period: config.get_int(
            "strategy",
            "volatility_period",
            DEFAULT_VOLATILITY_PERIOD as i64,
        ) as usize,
        short_window: config.get_int("strategy", "short_window", DEFAULT_SHORT_WINDOW as i64)
            as usize,
        short_window_anchor: config
            .get_string("strategy", "short_window_anchor")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default(),
        trading_days: config.get_double("strategy", "trading_days_per_year", DEFAULT_TRADING_DAYS),
        risk_threshold: config.get_double("strategy", "risk_threshold", DEFAULT_RISK_THRESHOLD),
        volatility_scale: config.get_double(
            "strategy",
            "volatility_scale",
            DEFAULT_VOLATILITY_SCALE,
        ),
        band_center: config.get_double("strategy", "band_center", DEFAULT_BAND_CENTER),
        target_fraction: config.get_double(
            "strategy",
            "target_fraction",
            DEFAULT_TARGET_FRACTION,
        ),
    }
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, MomtraderError> {
    let start_date = parse_date(
        config.get_string("backtest", "start_date").as_deref(),
        "start_date",
    )?;
    let end_date = parse_date(config.get_string("backtest", "end_date").as_deref(), "end_date")?;
    let schedule_time =
        parse_schedule_time(&config.get_string_or("schedule", "time", DEFAULT_SCHEDULE_TIME))?;

    Ok(BacktestConfig {
        start_date,
        end_date,
        initial_capital: config.get_double(
            "backtest",
            "initial_capital",
            DEFAULT_INITIAL_CAPITAL,
        ),
        commission_per_trade: config.get_double("backtest", "commission_per_trade", 0.0),
        commission_pct: config.get_double("backtest", "commission_pct", 0.0),
        slippage_pct: config.get_double("backtest", "slippage_pct", 0.0),
        risk_free_rate: config.get_double("backtest", "risk_free_rate", 0.0),
        schedule_time,
    })
}

pub fn data_dir(config: &dyn ConfigPort) -> PathBuf {
    PathBuf::from(config.get_string_or("backtest", "data_dir", DEFAULT_DATA_DIR))
}

fn run_backtest(config_path: &Path, output: Option<&Path>, symbol: Option<&str>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_strategy_config(&adapter) {
        return fail(&e);
    }
    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(&e);
    }

    let strategy = build_strategy_config(&adapter, symbol);
    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let data = CsvAdapter::new(data_dir(&adapter));

    eprintln!(
        "Running backtest: {} from {} to {}",
        strategy.instrument, bt_config.start_date, bt_config.end_date
    );

    let mut chart = ChartRecorder::new();
    let result = match backtest_engine::run_backtest(&data, &mut chart, &strategy, &bt_config) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    let metrics = Metrics::compute(&result.portfolio, bt_config.risk_free_rate);
    print_summary(&metrics, &result.stats);
    eprintln!("Final state:      {}", result.final_state.position);

    let output = output.unwrap_or(Path::new(DEFAULT_OUTPUT_DIR));
    match CsvReportAdapter.write(&result, chart.points(), output) {
        Ok(()) => {
            eprintln!("\nReport written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn print_summary(metrics: &Metrics, stats: &backtest_engine::TickStats) {
    eprintln!("\n=== Results ===");
    eprintln!("Total Return:     {:.2}%", metrics.total_return * 100.0);
    eprintln!(
        "Annualized:       {:.2}%",
        metrics.annualized_return * 100.0
    );
    eprintln!("Sharpe Ratio:     {:.2}", metrics.sharpe_ratio);
    eprintln!("Sortino Ratio:    {:.2}", metrics.sortino_ratio);
    eprintln!("Max Drawdown:     -{:.1}%", metrics.max_drawdown * 100.0);
    eprintln!("Total Trades:     {}", metrics.total_trades);
    eprintln!("Win Rate:         {:.1}%", metrics.win_rate * 100.0);
    eprintln!("Profit Factor:    {:.2}", metrics.profit_factor);

    eprintln!("\n=== Ticks ===");
    eprintln!("Evaluated:        {}", stats.ticks);
    eprintln!("Skipped:          {}", stats.skipped);
    eprintln!("Missing closes:   {}", stats.missing_bars);
    eprintln!("Transitions:      {}", stats.transitions);
    eprintln!("Risk overrides:   {}", stats.risk_overrides);
    eprintln!("Orders:           {}", stats.orders);
}

/// Tick date for a one-off evaluation: the explicit date, or the day after
/// the last stored bar so that bar is included.
fn resolve_as_of(
    data: &dyn DataPort,
    instrument: &InstrumentId,
    as_of: Option<&str>,
) -> Result<NaiveDate, MomtraderError> {
    if let Some(s) = as_of {
        return NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            MomtraderError::ConfigInvalid {
                section: "cli".into(),
                key: "as_of".into(),
                reason: "invalid date format, expected YYYY-MM-DD".into(),
            }
        });
    }
    match data.get_data_range(instrument)? {
        Some((_, last, _)) => Ok(last + Duration::days(1)),
        None => Err(MomtraderError::MissingData {
            symbol: instrument.symbol().to_string(),
            reason: "no historical data available".into(),
        }),
    }
}

fn run_signal(config_path: &Path, as_of: Option<&str>, symbol: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_strategy_config(&adapter) {
        return fail(&e);
    }

    let strategy = build_strategy_config(&adapter, symbol);
    let data = CsvAdapter::new(data_dir(&adapter));
    let tick_date = match resolve_as_of(&data, &strategy.instrument, as_of) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };
    let history = match data.history(&strategy.instrument, strategy.lookback(), tick_date) {
        Ok(h) => h,
        Err(e) => return fail(&e),
    };

    let mut state = StrategyState::new(&strategy);
    match evaluate_tick(&strategy, &mut state, &history) {
        TickOutcome::Skipped { reason } => {
            println!("{} {} SKIPPED {}", strategy.instrument, tick_date, reason);
            ExitCode::from(5)
        }
        TickOutcome::Evaluated(eval) => {
            let decision = match eval.decision {
                Decision::RiskOverride => "RISK_OVERRIDE".to_string(),
                Decision::Transition { from, to } => format!("{from}->{to}"),
                Decision::Hold => "HOLD".to_string(),
            };
            let orders: Vec<String> = eval.orders.iter().map(|o| o.to_string()).collect();
            println!(
                "{} {} state={} decision={} orders=[{}]",
                strategy.instrument,
                tick_date,
                state.position,
                decision,
                orders.join(",")
            );
            eprintln!("Last close:       {:.4}", eval.last_close);
            eprintln!("Long-term:        {:.4}", eval.signal.long_term);
            eprintln!("Short-term:       {:.4}", eval.signal.short_term);
            eprintln!(
                "Risk measure:     {:.4} (threshold {:.4})",
                eval.risk_measure, strategy.risk_threshold
            );
            if let Some(bands) = eval.bands {
                eprintln!(
                    "Volatility:       {:.4} [{:.4}, {:.4}]",
                    bands.volatility, bands.lower, bands.upper
                );
            }
            ExitCode::SUCCESS
        }
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_strategy_config(&adapter) {
        return fail(&e);
    }
    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(&e);
    }

    let strategy = build_strategy_config(&adapter, None);
    eprintln!("\nStrategy:");
    eprintln!("  symbol:            {}", strategy.instrument);
    eprintln!("  volatility_period: {}", strategy.volatility_period);
    eprintln!("  short_window:      {}", strategy.short_window);
    eprintln!("  short_anchor:      {}", strategy.short_window_anchor);
    eprintln!("  risk_threshold:    {}", strategy.risk_threshold);
    eprintln!("  target_fraction:   {}", strategy.target_fraction);
    eprintln!("  data_dir:          {}", data_dir(&adapter).display());

    eprintln!("\nConfiguration is valid");
    ExitCode::SUCCESS
}

fn run_info(config_path: &Path, symbol: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let strategy = build_strategy_config(&adapter, symbol);
    let data = CsvAdapter::new(data_dir(&adapter));

    match data.get_data_range(&strategy.instrument) {
        Ok(Some((first, last, count))) => {
            println!("{}: {} bars, {} to {}", strategy.instrument, count, first, last);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            println!("{}: no data", strategy.instrument);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
