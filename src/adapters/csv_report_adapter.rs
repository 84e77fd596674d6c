//! CSV backtest report.
//!
//! Writes `equity.csv`, `trades.csv` and `chart.csv` into the output
//! directory, creating it if needed.

use std::fs;
use std::io;
use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::MomtraderError;
use crate::ports::chart_port::ChartPoint;
use crate::ports::report_port::ReportPort;

pub const EQUITY_FILE: &str = "equity.csv";
pub const TRADES_FILE: &str = "trades.csv";
pub const CHART_FILE: &str = "chart.csv";

pub struct CsvReportAdapter;

fn writer(path: &Path) -> Result<csv::Writer<fs::File>, MomtraderError> {
    csv::Writer::from_path(path).map_err(|e| MomtraderError::Io(io::Error::from(e)))
}

fn csv_err(e: csv::Error) -> MomtraderError {
    MomtraderError::Io(io::Error::from(e))
}

impl CsvReportAdapter {
    fn write_equity(result: &BacktestResult, dir: &Path) -> Result<(), MomtraderError> {
        let mut w = writer(&dir.join(EQUITY_FILE))?;
        w.write_record(["date", "equity"]).map_err(csv_err)?;
        for point in &result.portfolio.equity_curve {
            w.write_record([point.date.to_string(), format!("{:.2}", point.equity)])
                .map_err(csv_err)?;
        }
        w.flush()?;
        Ok(())
    }

    fn write_trades(result: &BacktestResult, dir: &Path) -> Result<(), MomtraderError> {
        let mut w = writer(&dir.join(TRADES_FILE))?;
        w.write_record([
            "symbol",
            "quantity",
            "entry_date",
            "entry_price",
            "exit_date",
            "exit_price",
            "pnl",
        ])
        .map_err(csv_err)?;
        for t in &result.portfolio.closed_trades {
            w.write_record([
                t.instrument.to_string(),
                t.quantity.to_string(),
                t.entry_date.to_string(),
                format!("{:.4}", t.entry_price),
                t.exit_date.to_string(),
                format!("{:.4}", t.exit_price),
                format!("{:.2}", t.pnl),
            ])
            .map_err(csv_err)?;
        }
        w.flush()?;
        Ok(())
    }

    fn write_chart(chart: &[ChartPoint], dir: &Path) -> Result<(), MomtraderError> {
        let mut w = writer(&dir.join(CHART_FILE))?;
        w.write_record(["chart", "series", "date", "value"])
            .map_err(csv_err)?;
        for p in chart {
            w.write_record([
                p.chart.clone(),
                p.series.clone(),
                p.date.to_string(),
                format!("{:.6}", p.value),
            ])
            .map_err(csv_err)?;
        }
        w.flush()?;
        Ok(())
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        chart: &[ChartPoint],
        output_dir: &Path,
    ) -> Result<(), MomtraderError> {
        fs::create_dir_all(output_dir)?;
        Self::write_equity(result, output_dir)?;
        Self::write_trades(result, output_dir)?;
        Self::write_chart(chart, output_dir)?;
        tracing::info!(dir = %output_dir.display(), "report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::TickStats;
    use crate::domain::portfolio::Portfolio;
    use crate::domain::position::ClosedTrade;
    use crate::domain::price::InstrumentId;
    use crate::domain::strategy::{StrategyConfig, StrategyState};
    use crate::ports::chart_port::{BUY_SERIES, SIGNAL_CHART};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    fn sample_result() -> BacktestResult {
        let mut portfolio = Portfolio::new(1000.0);
        portfolio.record_equity(date(1), 1000.0);
        portfolio.record_equity(date(2), 1012.5);
        portfolio.record_trade(ClosedTrade {
            instrument: InstrumentId::new("SPXL"),
            quantity: 10,
            entry_price: 100.0,
            exit_price: 101.25,
            entry_date: date(1),
            exit_date: date(2),
            pnl: 12.5,
        });
        BacktestResult {
            portfolio,
            fills: Vec::new(),
            stats: TickStats::default(),
            final_state: StrategyState::new(&StrategyConfig::default()),
        }
    }

    #[test]
    fn writes_all_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested").join("report");
        let chart = vec![ChartPoint {
            chart: SIGNAL_CHART.into(),
            series: BUY_SERIES.into(),
            date: date(2),
            value: 110.0,
        }];

        CsvReportAdapter.write(&sample_result(), &chart, &out).unwrap();

        let equity = fs::read_to_string(out.join(EQUITY_FILE)).unwrap();
        assert_eq!(equity, "date,equity\n2024-02-01,1000.00\n2024-02-02,1012.50\n");

        let trades = fs::read_to_string(out.join(TRADES_FILE)).unwrap();
        let lines: Vec<&str> = trades.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "SPXL,10,2024-02-01,100.0000,2024-02-02,101.2500,12.50"
        );

        let chart_csv = fs::read_to_string(out.join(CHART_FILE)).unwrap();
        assert!(chart_csv.contains("Signals and Volatility,Buy Signal,2024-02-02,110.000000"));
    }

    #[test]
    fn empty_result_writes_headers_only() {
        let dir = TempDir::new().unwrap();
        let mut result = sample_result();
        result.portfolio = Portfolio::new(1000.0);

        CsvReportAdapter.write(&result, &[], dir.path()).unwrap();
        let trades = fs::read_to_string(dir.path().join(TRADES_FILE)).unwrap();
        assert_eq!(trades.lines().count(), 1);
        let chart = fs::read_to_string(dir.path().join(CHART_FILE)).unwrap();
        assert_eq!(chart, "chart,series,date,value\n");
    }
}
