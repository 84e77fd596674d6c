//! Daily backtest driver.
//!
//! Plays the role of the host scheduler: one rebalance per trading day in
//! `[start_date, end_date]`, strictly in date order. Each tick sees only bars
//! completed before the tick date and fills at that day's close.

use chrono::{NaiveDate, NaiveTime};

use super::error::MomtraderError;
use super::execution::{ExecutionConfig, Fill, SimulatedBroker};
use super::portfolio::Portfolio;
use super::strategy::{
    evaluate_tick, plot_evaluation, Decision, StrategyConfig, StrategyState, TickOutcome,
};
use crate::ports::chart_port::ChartPort;
use crate::ports::data_port::DataPort;
use crate::ports::execution_port::ExecutionPort;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub commission_per_trade: f64,
    pub commission_pct: f64,
    pub slippage_pct: f64,
    pub risk_free_rate: f64,
    /// Wall-clock time of the daily rebalance.
    pub schedule_time: NaiveTime,
}

impl BacktestConfig {
    pub fn execution_config(&self) -> ExecutionConfig {
        ExecutionConfig {
            commission_per_trade: self.commission_per_trade,
            commission_pct: self.commission_pct,
            slippage_pct: self.slippage_pct,
        }
    }
}

/// Counters over every scheduled tick of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickStats {
    pub ticks: usize,
    pub skipped: usize,
    /// Days whose own close was missing, so nothing could be filled.
    pub missing_bars: usize,
    pub risk_overrides: usize,
    pub transitions: usize,
    pub orders: usize,
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub portfolio: Portfolio,
    pub fills: Vec<Fill>,
    pub stats: TickStats,
    pub final_state: StrategyState,
}

pub fn run_backtest(
    data: &dyn DataPort,
    chart: &mut dyn ChartPort,
    strategy: &StrategyConfig,
    config: &BacktestConfig,
) -> Result<BacktestResult, MomtraderError> {
    let instrument = &strategy.instrument;
    let calendar = data.bars(instrument, config.start_date, config.end_date)?;
    if calendar.is_empty() {
        return Err(MomtraderError::MissingData {
            symbol: instrument.symbol().to_string(),
            reason: format!("no bars between {} and {}", config.start_date, config.end_date),
        });
    }

    tracing::info!(
        symbol = %instrument,
        days = calendar.len(),
        start = %config.start_date,
        end = %config.end_date,
        at = %config.schedule_time,
        "starting backtest"
    );

    let mut broker = SimulatedBroker::new(config.initial_capital, config.execution_config());
    let mut state = StrategyState::new(strategy);
    let mut stats = TickStats::default();

    for bar in &calendar {
        let Some(close) = bar.valid_close() else {
            tracing::warn!(symbol = %instrument, date = %bar.date, "no close for tick date, skipping");
            stats.missing_bars += 1;
            broker.record_equity(bar.date);
            continue;
        };

        stats.ticks += 1;
        broker.mark(bar.date, close);
        let history = match data.history(instrument, strategy.lookback(), bar.date) {
            Ok(h) => h,
            Err(e) if e.is_skippable() => {
                tracing::debug!(date = %bar.date, "history unavailable: {e}");
                stats.skipped += 1;
                broker.record_equity(bar.date);
                continue;
            }
            Err(e) => return Err(e),
        };
        let outcome = evaluate_tick(strategy, &mut state, &history);

        match &outcome {
            TickOutcome::Skipped { reason } => {
                tracing::debug!(date = %bar.date, "tick skipped: {reason}");
                stats.skipped += 1;
            }
            TickOutcome::Evaluated(eval) => {
                match eval.decision {
                    Decision::RiskOverride => stats.risk_overrides += 1,
                    Decision::Transition { .. } => stats.transitions += 1,
                    Decision::Hold => {}
                }
                broker.submit(instrument, &eval.orders)?;
                stats.orders += eval.orders.len();
                plot_evaluation(instrument, bar.date, eval, chart);
            }
        }

        broker.record_equity(bar.date);
    }

    tracing::info!(
        ticks = stats.ticks,
        skipped = stats.skipped,
        transitions = stats.transitions,
        risk_overrides = stats.risk_overrides,
        "backtest complete"
    );

    let fills = broker.fills().to_vec();
    Ok(BacktestResult {
        portfolio: broker.into_portfolio(),
        fills,
        stats,
        final_state: state,
    })
}
