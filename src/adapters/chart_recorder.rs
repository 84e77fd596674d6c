//! In-memory chart sink. Collects every plotted point for later reporting.

use chrono::NaiveDate;

use crate::ports::chart_port::{ChartPoint, ChartPort};

#[derive(Debug, Default, Clone)]
pub struct ChartRecorder {
    points: Vec<ChartPoint>,
}

impl ChartRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[ChartPoint] {
        &self.points
    }

    /// Values of one series in plot order.
    pub fn series(&self, chart: &str, series: &str) -> Vec<(NaiveDate, f64)> {
        self.points
            .iter()
            .filter(|p| p.chart == chart && p.series == series)
            .map(|p| (p.date, p.value))
            .collect()
    }
}

impl ChartPort for ChartRecorder {
    fn plot(&mut self, chart: &str, series: &str, date: NaiveDate, value: f64) {
        self.points.push(ChartPoint {
            chart: chart.to_string(),
            series: series.to_string(),
            date,
            value,
        });
    }
}
