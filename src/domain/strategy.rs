//! Strategy parameters, per-run state and the daily rebalance tick.
//!
//! One tick: validate history → append closes to the rolling window →
//! compute signals → volatility bands (when the window is full) → risk gate
//! → state transition → orders. The tick never performs I/O; callers fetch
//! history beforehand and dispatch the returned orders afterwards.

use chrono::NaiveDate;

use super::order::{orders_for, OrderIntent};
use super::price::{InstrumentId, PriceBar, PriceHistory};
use super::risk::{RiskGate, DEFAULT_RISK_THRESHOLD};
use super::rolling_window::RollingWindow;
use super::signal::{
    ShortWindowAnchor, Signal, SignalComputer, DEFAULT_SHORT_WINDOW, DEFAULT_TRADING_DAYS,
};
use super::state::{next_state, PositionState};
use super::volatility::{
    VolatilityBands, VolatilityEstimator, DEFAULT_BAND_CENTER, DEFAULT_VOLATILITY_SCALE,
};
use crate::ports::chart_port::{
    ChartPort, BUY_SERIES, LONG_TERM_SERIES, LOWER_VOLATILITY_SERIES, PRICE_CHART, SELL_SERIES,
    SHORT_TERM_SERIES, SIGNAL_CHART, UPPER_VOLATILITY_SERIES,
};

pub const DEFAULT_SYMBOL: &str = "SPXL";
pub const DEFAULT_VOLATILITY_PERIOD: usize = 27;
pub const DEFAULT_TARGET_FRACTION: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub instrument: InstrumentId,
    pub volatility_period: usize,
    pub short_window: usize,
    pub short_window_anchor: ShortWindowAnchor,
    pub trading_days: f64,
    pub risk_threshold: f64,
    pub volatility_scale: f64,
    pub band_center: f64,
    pub target_fraction: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            instrument: InstrumentId::new(DEFAULT_SYMBOL),
            volatility_period: DEFAULT_VOLATILITY_PERIOD,
            short_window: DEFAULT_SHORT_WINDOW,
            short_window_anchor: ShortWindowAnchor::default(),
            trading_days: DEFAULT_TRADING_DAYS,
            risk_threshold: DEFAULT_RISK_THRESHOLD,
            volatility_scale: DEFAULT_VOLATILITY_SCALE,
            band_center: DEFAULT_BAND_CENTER,
            target_fraction: DEFAULT_TARGET_FRACTION,
        }
    }
}

impl StrategyConfig {
    /// Bars requested from the feed each tick.
    pub fn lookback(&self) -> usize {
        self.volatility_period + 1
    }

    pub fn signal_computer(&self) -> SignalComputer {
        SignalComputer::new(self.short_window, self.trading_days, self.short_window_anchor)
    }

    pub fn volatility_estimator(&self) -> VolatilityEstimator {
        VolatilityEstimator::new(self.volatility_scale, self.band_center)
    }

    pub fn risk_gate(&self) -> RiskGate {
        RiskGate::new(self.risk_threshold, self.trading_days)
    }
}

/// Everything that survives between ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyState {
    pub position: PositionState,
    pub window: RollingWindow<f64>,
}

impl StrategyState {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            position: PositionState::default(),
            window: RollingWindow::new(config.volatility_period),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// Volatility above threshold: liquidated, state left as it was.
    RiskOverride,
    Transition {
        from: PositionState,
        to: PositionState,
    },
    Hold,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub last_close: f64,
    pub signal: Signal,
    pub risk_measure: f64,
    pub bands: Option<VolatilityBands>,
    pub decision: Decision,
    pub orders: Vec<OrderIntent>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No usable history; nothing was mutated.
    Skipped { reason: String },
    Evaluated(Evaluation),
}

impl TickOutcome {
    pub fn orders(&self) -> &[OrderIntent] {
        match self {
            TickOutcome::Skipped { .. } => &[],
            TickOutcome::Evaluated(eval) => &eval.orders,
        }
    }

    pub fn evaluation(&self) -> Option<&Evaluation> {
        match self {
            TickOutcome::Skipped { .. } => None,
            TickOutcome::Evaluated(eval) => Some(eval),
        }
    }
}

/// Run one rebalance over freshly fetched `bars`.
pub fn evaluate_tick(
    config: &StrategyConfig,
    state: &mut StrategyState,
    bars: &[PriceBar],
) -> TickOutcome {
    let history = match PriceHistory::validate(&config.instrument, bars, config.short_window) {
        Ok(h) => h,
        Err(e) => {
            tracing::debug!(symbol = %config.instrument, "skipping tick: {e}");
            return TickOutcome::Skipped {
                reason: e.to_string(),
            };
        }
    };

    state.window.extend(history.closes().iter().copied());

    let signal = config.signal_computer().compute(&history);

    let bands = match config.volatility_estimator().bands(&state.window) {
        Ok(b) => Some(b),
        Err(e) => {
            tracing::trace!("volatility bands unavailable: {e}");
            None
        }
    };

    let gate = config.risk_gate();
    let risk_measure = gate.measure(&history);

    let (decision, orders) = if gate.exceeds(risk_measure) {
        tracing::warn!(
            symbol = %config.instrument,
            risk_measure,
            threshold = gate.threshold,
            "volatility too high, liquidating"
        );
        (Decision::RiskOverride, vec![OrderIntent::Liquidate])
    } else {
        let from = state.position;
        let to = next_state(from, &signal);
        state.position = to;
        if from != to {
            tracing::info!(
                symbol = %config.instrument,
                %from,
                %to,
                short_term = signal.short_term,
                long_term = signal.long_term,
                "position state changed"
            );
            (
                Decision::Transition { from, to },
                orders_for(to, config.target_fraction),
            )
        } else {
            (Decision::Hold, Vec::new())
        }
    };

    TickOutcome::Evaluated(Evaluation {
        last_close: history.last_close(),
        signal,
        risk_measure,
        bands,
        decision,
        orders,
    })
}

/// Emit the chart series for one evaluated tick.
pub fn plot_evaluation(
    instrument: &InstrumentId,
    date: NaiveDate,
    eval: &Evaluation,
    chart: &mut dyn ChartPort,
) {
    let close_series = format!("{} Closing Price", instrument);
    chart.plot(PRICE_CHART, &close_series, date, eval.last_close);
    chart.plot(PRICE_CHART, LONG_TERM_SERIES, date, eval.signal.long_term);
    chart.plot(PRICE_CHART, SHORT_TERM_SERIES, date, eval.signal.short_term);

    if let Some(bands) = eval.bands {
        chart.plot(SIGNAL_CHART, UPPER_VOLATILITY_SERIES, date, bands.upper);
        chart.plot(SIGNAL_CHART, LOWER_VOLATILITY_SERIES, date, bands.lower);
    }

    if let Decision::Transition { to, .. } = eval.decision {
        match to {
            PositionState::Long => chart.plot(SIGNAL_CHART, BUY_SERIES, date, eval.last_close),
            PositionState::Flat => chart.plot(SIGNAL_CHART, SELL_SERIES, date, eval.last_close),
            PositionState::Neutral => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::chart_port::ChartPoint;

    #[derive(Default)]
    struct Plots(Vec<ChartPoint>);

    impl ChartPort for Plots {
        fn plot(&mut self, chart: &str, series: &str, date: NaiveDate, value: f64) {
            self.0.push(ChartPoint {
                chart: chart.to_string(),
                series: series.to_string(),
                date,
                value,
            });
        }
    }

    fn bars(closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar::new(start + chrono::Duration::days(i as i64), c))
            .collect()
    }

    fn uptrend() -> Vec<PriceBar> {
        bars(&(0..28).map(|i| 100.0 + 0.5 * i as f64).collect::<Vec<_>>())
    }

    fn early_swing() -> Vec<PriceBar> {
        let mut closes = vec![100.0, 104.0, 108.0, 112.0, 116.0];
        closes.extend([116.0; 23]);
        bars(&closes)
    }

    fn sharp_late_rise() -> Vec<PriceBar> {
        let mut closes = vec![100.0; 23];
        closes.extend([102.0, 104.0, 106.0, 108.0, 110.0]);
        bars(&closes)
    }

    fn choppy() -> Vec<PriceBar> {
        bars(&(0..28).map(|i| if i % 2 == 0 { 100.0 } else { 120.0 }).collect::<Vec<_>>())
    }

    #[test]
    fn default_config_values() {
        let c = StrategyConfig::default();
        assert_eq!(c.instrument.symbol(), "SPXL");
        assert_eq!(c.volatility_period, 27);
        assert_eq!(c.lookback(), 28);
        assert_eq!(c.short_window, 5);
        assert_eq!(c.short_window_anchor, ShortWindowAnchor::Oldest);
        assert_eq!(c.risk_threshold, 22.5);
        assert_eq!(c.target_fraction, 1.0);
    }

    #[test]
    fn flat_prices_hold_without_orders() {
        let config = StrategyConfig::default();
        let mut state = StrategyState::new(&config);

        let outcome = evaluate_tick(&config, &mut state, &bars(&[100.0; 28]));
        let eval = outcome.evaluation().unwrap();

        assert_eq!(eval.decision, Decision::Hold);
        assert_eq!(eval.risk_measure, 0.0);
        assert!(eval.orders.is_empty());
        assert_eq!(state.position, PositionState::Neutral);
        assert_eq!(eval.bands.unwrap().volatility, 0.0);
    }

    #[test]
    fn uptrend_enters_long_once() {
        let config = StrategyConfig::default();
        let mut state = StrategyState::new(&config);

        let first = evaluate_tick(&config, &mut state, &uptrend());
        assert_eq!(
            first.orders(),
            &[OrderIntent::Liquidate, OrderIntent::SetTarget(1.0)]
        );
        assert_eq!(state.position, PositionState::Long);

        let second = evaluate_tick(&config, &mut state, &uptrend());
        assert_eq!(second.evaluation().unwrap().decision, Decision::Hold);
        assert!(second.orders().is_empty());
    }

    #[test]
    fn sharp_late_rise_enters_long() {
        let config = StrategyConfig::default();
        let mut state = StrategyState::new(&config);

        let outcome = evaluate_tick(&config, &mut state, &sharp_late_rise());
        let eval = outcome.evaluation().unwrap();
        assert!(eval.signal.short_term < eval.signal.long_term);
        assert_eq!(
            eval.decision,
            Decision::Transition {
                from: PositionState::Neutral,
                to: PositionState::Long
            }
        );
        assert_eq!(
            outcome.orders(),
            &[OrderIntent::Liquidate, OrderIntent::SetTarget(1.0)]
        );
        assert_eq!(state.position, PositionState::Long);
    }

    #[test]
    fn newest_anchor_exits_on_late_rise() {
        let config = StrategyConfig {
            short_window_anchor: ShortWindowAnchor::Newest,
            ..Default::default()
        };
        let mut state = StrategyState::new(&config);
        state.position = PositionState::Long;

        let outcome = evaluate_tick(&config, &mut state, &sharp_late_rise());
        assert_eq!(outcome.orders(), &[OrderIntent::Liquidate]);
        assert_eq!(state.position, PositionState::Flat);
    }

    #[test]
    fn early_swing_exits_long() {
        let config = StrategyConfig::default();
        let mut state = StrategyState::new(&config);
        state.position = PositionState::Long;

        let outcome = evaluate_tick(&config, &mut state, &early_swing());
        assert_eq!(
            outcome.evaluation().unwrap().decision,
            Decision::Transition {
                from: PositionState::Long,
                to: PositionState::Flat
            }
        );
        assert_eq!(outcome.orders(), &[OrderIntent::Liquidate]);
    }

    #[test]
    fn risk_override_preempts_transition() {
        let config = StrategyConfig::default();
        let mut state = StrategyState::new(&config);
        state.position = PositionState::Long;

        let outcome = evaluate_tick(&config, &mut state, &choppy());
        let eval = outcome.evaluation().unwrap();
        assert_eq!(eval.decision, Decision::RiskOverride);
        assert!(eval.risk_measure > 22.5);
        assert_eq!(eval.orders, vec![OrderIntent::Liquidate]);
        assert_eq!(state.position, PositionState::Long);
    }

    #[test]
    fn calm_tick_after_override_does_not_reenter() {
        let config = StrategyConfig::default();
        let mut state = StrategyState::new(&config);
        state.position = PositionState::Long;

        evaluate_tick(&config, &mut state, &choppy());
        let outcome = evaluate_tick(&config, &mut state, &uptrend());
        assert_eq!(outcome.evaluation().unwrap().decision, Decision::Hold);
        assert!(outcome.orders().is_empty());
        assert_eq!(state.position, PositionState::Long);
    }

    #[test]
    fn empty_history_skips_without_mutation() {
        let config = StrategyConfig::default();
        let mut state = StrategyState::new(&config);
        let before = state.clone();

        let outcome = evaluate_tick(&config, &mut state, &[]);
        match &outcome {
            TickOutcome::Skipped { reason } => assert!(reason.contains("no historical data")),
            other => panic!("expected skip, got {other:?}"),
        }
        assert!(outcome.orders().is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn missing_close_skips_without_mutation() {
        let config = StrategyConfig::default();
        let mut state = StrategyState::new(&config);
        let mut history = uptrend();
        history[10].close = None;

        let outcome = evaluate_tick(&config, &mut state, &history);
        assert!(matches!(outcome, TickOutcome::Skipped { .. }));
        assert!(state.window.is_empty());
        assert_eq!(state.position, PositionState::Neutral);
    }

    #[test]
    fn short_history_still_evaluates_without_bands() {
        let config = StrategyConfig::default();
        let mut state = StrategyState::new(&config);
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + 0.5 * i as f64).collect();

        let outcome = evaluate_tick(&config, &mut state, &bars(&closes));
        let eval = outcome.evaluation().unwrap();
        assert!(eval.bands.is_none());
        assert_eq!(state.window.len(), 10);
        assert!(matches!(eval.decision, Decision::Transition { .. }));
    }

    #[test]
    fn window_is_full_after_one_complete_history() {
        let config = StrategyConfig::default();
        let mut state = StrategyState::new(&config);
        evaluate_tick(&config, &mut state, &uptrend());
        assert!(state.window.is_ready());
        assert_eq!(state.window[0], 113.5);
    }

    #[test]
    fn plot_emits_price_band_and_buy_series() {
        let config = StrategyConfig::default();
        let mut state = StrategyState::new(&config);
        let outcome = evaluate_tick(&config, &mut state, &uptrend());
        let date = NaiveDate::from_ymd_opt(2024, 1, 29).unwrap();

        let mut plots = Plots::default();
        plot_evaluation(&config.instrument, date, outcome.evaluation().unwrap(), &mut plots);

        let series: Vec<&str> = plots.0.iter().map(|p| p.series.as_str()).collect();
        assert_eq!(
            series,
            vec![
                "SPXL Closing Price",
                LONG_TERM_SERIES,
                SHORT_TERM_SERIES,
                UPPER_VOLATILITY_SERIES,
                LOWER_VOLATILITY_SERIES,
                BUY_SERIES,
            ]
        );
        assert!(plots.0.iter().all(|p| p.date == date));
    }
}
