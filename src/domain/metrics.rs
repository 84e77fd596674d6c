//! Backtest performance metrics.

use super::portfolio::{EquityPoint, Portfolio};
use super::position::ClosedTrade;
use super::stats::{mean, population_stddev};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: i64,
    pub total_trades: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub avg_holding_days: f64,
}

impl Metrics {
    pub fn compute(portfolio: &Portfolio, risk_free_rate: f64) -> Self {
        let curve = &portfolio.equity_curve;
        let initial = portfolio.initial_capital;
        let final_equity = curve.last().map_or(initial, |p| p.equity);

        let total_return = if initial > 0.0 {
            (final_equity - initial) / initial
        } else {
            0.0
        };

        let years = curve.len() as f64 / TRADING_DAYS_PER_YEAR;
        let annualized_return = if years > 0.0 && total_return.is_finite() && total_return > -1.0 {
            (1.0 + total_return).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(curve);
        let (sharpe_ratio, sortino_ratio) =
            compute_risk_adjusted(curve, risk_free_rate / TRADING_DAYS_PER_YEAR);
        let trades = TradeStats::from_trades(&portfolio.closed_trades);

        Metrics {
            total_return,
            annualized_return,
            sharpe_ratio,
            sortino_ratio,
            max_drawdown,
            max_drawdown_duration,
            total_trades: trades.count,
            trades_won: trades.won,
            trades_lost: trades.lost,
            win_rate: ratio(trades.won as f64, trades.count as f64),
            profit_factor: if trades.gross_loss > 0.0 {
                trades.gross_win / trades.gross_loss
            } else if trades.gross_win > 0.0 {
                f64::INFINITY
            } else {
                0.0
            },
            avg_win: ratio(trades.gross_win, trades.won as f64),
            avg_loss: ratio(trades.gross_loss, trades.lost as f64),
            largest_win: trades.largest_win,
            largest_loss: trades.largest_loss,
            avg_holding_days: ratio(trades.holding_days as f64, trades.count as f64),
        }
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den } else { 0.0 }
}

#[derive(Default)]
struct TradeStats {
    count: usize,
    won: usize,
    lost: usize,
    gross_win: f64,
    gross_loss: f64,
    largest_win: f64,
    largest_loss: f64,
    holding_days: i64,
}

impl TradeStats {
    fn from_trades(trades: &[ClosedTrade]) -> Self {
        trades.iter().fold(Self::default(), |mut s, t| {
            s.count += 1;
            s.holding_days += t.holding_days();
            if t.pnl > 0.0 {
                s.won += 1;
                s.gross_win += t.pnl;
                s.largest_win = s.largest_win.max(t.pnl);
            } else if t.pnl < 0.0 {
                s.lost += 1;
                s.gross_loss += -t.pnl;
                s.largest_loss = s.largest_loss.max(-t.pnl);
            }
            s
        })
    }
}

/// Max peak-to-trough fraction and the longest run of points below a peak.
fn compute_drawdown(curve: &[EquityPoint]) -> (f64, i64) {
    let Some(first) = curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;
    let mut run = 0i64;
    let mut max_run = 0i64;

    for point in curve {
        if point.equity > peak {
            peak = point.equity;
            run = 0;
        } else if peak > 0.0 && point.equity < peak {
            max_dd = max_dd.max((peak - point.equity) / peak);
            run += 1;
            max_run = max_run.max(run);
        }
    }

    (max_dd, max_run)
}

fn daily_returns(curve: &[EquityPoint]) -> Vec<f64> {
    curve
        .windows(2)
        .map(|w| {
            if w[0].equity > 0.0 {
                (w[1].equity - w[0].equity) / w[0].equity
            } else {
                0.0
            }
        })
        .collect()
}

/// Annualised (Sharpe, Sortino) from daily equity returns.
fn compute_risk_adjusted(curve: &[EquityPoint], daily_rf: f64) -> (f64, f64) {
    let returns = daily_returns(curve);
    if returns.is_empty() {
        return (0.0, 0.0);
    }

    let excess = mean(&returns) - daily_rf;
    let annualize = TRADING_DAYS_PER_YEAR.sqrt();

    let stddev = population_stddev(&returns);
    let sharpe = if stddev > 0.0 {
        excess / stddev * annualize
    } else {
        0.0
    };

    let downside_sq: f64 = returns
        .iter()
        .filter(|&&r| r < daily_rf)
        .map(|&r| (r - daily_rf).powi(2))
        .sum();
    let downside = (downside_sq / returns.len() as f64).sqrt();
    let sortino = if downside > 0.0 {
        excess / downside * annualize
    } else {
        0.0
    };

    (sharpe, sortino)
}
