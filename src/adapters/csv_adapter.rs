//! CSV file price feed.
//!
//! One file per instrument, `<base_path>/<SYMBOL>.csv`, with a header row
//! containing at least `date` and `close` columns (any order, any other
//! columns ignored). Blank, `NaN` or `null` closes are reported as missing
//! values rather than errors. Files are parsed once and cached.

use crate::domain::error::MomtraderError;
use crate::domain::price::{InstrumentId, PriceBar};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
    cache: RefCell<HashMap<InstrumentId, Vec<PriceBar>>>,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            cache: RefCell::new(HashMap::new()),
        }
    }

    fn csv_path(&self, instrument: &InstrumentId) -> PathBuf {
        self.base_path.join(format!("{}.csv", instrument.symbol()))
    }

    fn load(&self, instrument: &InstrumentId) -> Result<Vec<PriceBar>, MomtraderError> {
        if let Some(bars) = self.cache.borrow().get(instrument) {
            return Ok(bars.clone());
        }

        let path = self.csv_path(instrument);
        let content = fs::read_to_string(&path).map_err(|e| MomtraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        let bars = parse_bars(&content)?;
        tracing::debug!(path = %path.display(), bars = bars.len(), "loaded price file");

        self.cache
            .borrow_mut()
            .insert(instrument.clone(), bars.clone());
        Ok(bars)
    }
}

fn parse_close(raw: &str) -> Result<Option<f64>, MomtraderError> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") || raw.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|e| MomtraderError::Data {
            reason: format!("invalid close value {raw:?}: {e}"),
        })
}

fn parse_bars(content: &str) -> Result<Vec<PriceBar>, MomtraderError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = rdr.headers().map_err(|e| MomtraderError::Data {
        reason: format!("CSV header error: {}", e),
    })?;
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| MomtraderError::Data {
                reason: format!("missing {} column", name),
            })
    };
    let date_col = column("date")?;
    let close_col = column("close")?;

    let mut bars = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| MomtraderError::Data {
            reason: format!("CSV parse error: {}", e),
        })?;

        let date_str = record.get(date_col).ok_or_else(|| MomtraderError::Data {
            reason: "missing date value".into(),
        })?;
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
            MomtraderError::Data {
                reason: format!("invalid date {date_str:?}: {e}"),
            }
        })?;
        let close = parse_close(record.get(close_col).unwrap_or(""))?;

        bars.push(PriceBar { date, close });
    }

    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

impl DataPort for CsvAdapter {
    fn history(
        &self,
        instrument: &InstrumentId,
        lookback: usize,
        before: NaiveDate,
    ) -> Result<Vec<PriceBar>, MomtraderError> {
        let bars = self.load(instrument)?;
        let end = bars.partition_point(|b| b.date < before);
        let start = end.saturating_sub(lookback);
        Ok(bars[start..end].to_vec())
    }

    fn bars(
        &self,
        instrument: &InstrumentId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, MomtraderError> {
        Ok(self
            .load(instrument)?
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect())
    }

    fn get_data_range(
        &self,
        instrument: &InstrumentId,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, MomtraderError> {
        let bars = self.load(instrument)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let spxl = "date,close\n\
            2024-01-17,115.0\n\
            2024-01-15,105.0\n\
            2024-01-16,\n\
            2024-01-18,120.5\n";
        fs::write(path.join("SPXL.csv"), spxl).unwrap();

        let ohlcv = "Date,Open,High,Low,Close,Volume\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n";
        fs::write(path.join("TQQQ.csv"), ohlcv).unwrap();

        fs::write(path.join("EMPTY.csv"), "date,close\n").unwrap();
        fs::write(path.join("BAD.csv"), "date,price\n2024-01-15,1.0\n").unwrap();

        (dir, path)
    }

    #[test]
    fn bars_are_sorted_and_keep_missing_closes() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter
            .bars(&InstrumentId::new("SPXL"), date(1), date(31))
            .unwrap();
        assert_eq!(bars.len(), 4);
        assert_eq!(bars[0], PriceBar::new(date(15), 105.0));
        assert_eq!(bars[1], PriceBar::missing(date(16)));
        assert_eq!(bars[3].close, Some(120.5));
    }

    #[test]
    fn bars_filter_by_range() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let bars = adapter
            .bars(&InstrumentId::new("SPXL"), date(17), date(17))
            .unwrap();
        assert_eq!(bars, vec![PriceBar::new(date(17), 115.0)]);
    }

    #[test]
    fn history_is_strictly_before_and_bounded() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let spxl = InstrumentId::new("SPXL");

        let history = adapter.history(&spxl, 2, date(18)).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].date, date(16));
        assert_eq!(history[1].date, date(17));

        assert!(adapter.history(&spxl, 28, date(15)).unwrap().is_empty());
        assert_eq!(adapter.history(&spxl, 28, date(31)).unwrap().len(), 4);
    }

    #[test]
    fn reads_ohlcv_layout_by_header_name() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let bars = adapter
            .bars(&InstrumentId::new("tqqq"), date(1), date(31))
            .unwrap();
        assert_eq!(bars, vec![PriceBar::new(date(15), 105.0)]);
    }

    #[test]
    fn data_range() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert_eq!(
            adapter.get_data_range(&InstrumentId::new("SPXL")).unwrap(),
            Some((date(15), date(18), 4))
        );
        assert_eq!(adapter.get_data_range(&InstrumentId::new("EMPTY")).unwrap(), None);
    }

    #[test]
    fn missing_file_is_data_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let err = adapter
            .history(&InstrumentId::new("XYZ"), 28, date(31))
            .unwrap_err();
        assert!(matches!(err, MomtraderError::Data { .. }));
    }

    #[test]
    fn missing_close_column_is_data_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let err = adapter.bars(&InstrumentId::new("BAD"), date(1), date(31)).unwrap_err();
        assert!(err.to_string().contains("close"));
    }

    #[test]
    fn parse_close_variants() {
        assert_eq!(parse_close("").unwrap(), None);
        assert_eq!(parse_close("NaN").unwrap(), None);
        assert_eq!(parse_close("null").unwrap(), None);
        assert_eq!(parse_close(" 12.5 ").unwrap(), Some(12.5));
        assert!(parse_close("abc").is_err());
    }

    #[test]
    fn file_is_cached_after_first_load() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path.clone());
        let spxl = InstrumentId::new("SPXL");
        adapter.bars(&spxl, date(1), date(31)).unwrap();

        fs::remove_file(path.join("SPXL.csv")).unwrap();
        assert_eq!(adapter.bars(&spxl, date(1), date(31)).unwrap().len(), 4);
    }
}
