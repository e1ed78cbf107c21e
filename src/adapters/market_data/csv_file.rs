use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::price_series::{PricePoint, PriceSeries};
use crate::ports::price_source::{PriceSource, PriceSourceError};

/// Column names accepted as the price column, in order of preference
const PRICE_COLUMNS: [&str; 4] = ["adj_close", "adj close", "close", "price"];

/// Reads daily closes from `<data_dir>/<SYMBOL>.csv`
///
/// Expected layout is `date,close` with an optional header row. When a header
/// is present the price column is picked by name (adjusted close preferred),
/// otherwise the second column is used. Dates are `YYYY-MM-DD` or RFC 3339.
/// Empty or unparseable price cells such as `nan` are kept as NaN so that the
/// estimator marks that step undefined.
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    data_dir: PathBuf,
}

impl CsvPriceSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", symbol))
    }
}

#[async_trait]
impl PriceSource for CsvPriceSource {
    async fn fetch_history(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries, PriceSourceError> {
        let path = self.path_for(symbol);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PriceSourceError::NotFound(format!("{} ({})", symbol, path.display())));
            }
            Err(e) => return Err(e.into()),
        };

        let points = parse_csv(&content, &path.display().to_string())?
            .into_iter()
            .filter(|p| {
                let date = p.timestamp.date_naive();
                start.map_or(true, |s| date >= s) && end.map_or(true, |e| date <= e)
            })
            .collect::<Vec<_>>();

        tracing::debug!("Loaded {} rows for {} from {}", points.len(), symbol, path.display());
        Ok(PriceSeries::new(symbol, points)?)
    }
}

/// Parse CSV text into price points in file order
pub fn parse_csv(content: &str, source_name: &str) -> Result<Vec<PricePoint>, PriceSourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(content.as_bytes());

    let mut points = Vec::new();
    let mut price_col = 1;
    let mut first_row = true;

    for result in reader.records() {
        let record = result.map_err(|e| PriceSourceError::Parse {
            source_name: source_name.to_string(),
            line: e.position().map_or(0, |p| p.line() as usize),
            message: e.to_string(),
        })?;
        let line = record.position().map_or(0, |p| p.line() as usize);
        let parse_err = |message: String| PriceSourceError::Parse {
            source_name: source_name.to_string(),
            line,
            message,
        };

        let date_cell = record.get(0).unwrap_or_default();
        if first_row {
            first_row = false;
            if parse_timestamp(date_cell).is_none() {
                price_col = header_price_column(&record).ok_or_else(|| {
                    parse_err(format!("no price column in header {:?}", record.iter().collect::<Vec<_>>()))
                })?;
                continue;
            }
        }

        let timestamp = parse_timestamp(date_cell)
            .ok_or_else(|| parse_err(format!("invalid date '{}'", date_cell)))?;
        let cell = record
            .get(price_col)
            .ok_or_else(|| parse_err(format!("missing column {}", price_col + 1)))?;
        // Empty cells and `nan` both land on NaN
        let price = cell.parse::<f64>().unwrap_or(f64::NAN);

        points.push(PricePoint::new(timestamp, price));
    }

    Ok(points)
}

fn header_price_column(header: &csv::StringRecord) -> Option<usize> {
    PRICE_COLUMNS
        .iter()
        .find_map(|name| header.iter().position(|f| f.eq_ignore_ascii_case(name)))
}

/// `YYYY-MM-DD` (midnight UTC) or RFC 3339
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
