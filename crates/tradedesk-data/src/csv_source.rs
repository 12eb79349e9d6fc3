//! CSV quote snapshots.

use async_trait::async_trait;
use chrono::Utc;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tradedesk_core::error::DataError;
use tradedesk_core::traits::QuoteFetcher;
use tradedesk_core::types::{FetchOutcome, IndicatorSet, Quote, Symbol};

/// CSV record format.
#[derive(Debug, Clone, Deserialize)]
struct SnapshotRecord {
    #[serde(alias = "Symbol", alias = "ticker", alias = "Ticker")]
    symbol: String,
    #[serde(alias = "Price", alias = "close", alias = "Close", alias = "last")]
    price: f64,
    #[serde(alias = "Change", default)]
    change: f64,
    #[serde(alias = "change_pct", alias = "changePercent", alias = "Change %", default)]
    change_percent: f64,
    #[serde(alias = "Volume", default)]
    volume: u64,
    #[serde(alias = "High", default)]
    high: Option<f64>,
    #[serde(alias = "Low", default)]
    low: Option<f64>,
    #[serde(alias = "rsi", alias = "RSI", default)]
    rsi14: Option<f64>,
    #[serde(alias = "MACD", default)]
    macd: Option<f64>,
    #[serde(alias = "macdSignal", alias = "signal", default)]
    macd_signal: Option<f64>,
    #[serde(alias = "SMA20", default)]
    sma20: Option<f64>,
    #[serde(alias = "SMA50", default)]
    sma50: Option<f64>,
}

impl SnapshotRecord {
    fn indicators(&self) -> IndicatorSet {
        IndicatorSet::new()
            .with_optional(IndicatorSet::RSI14, self.rsi14)
            .with_optional(IndicatorSet::MACD, self.macd)
            .with_optional(IndicatorSet::MACD_SIGNAL, self.macd_signal)
            .with_optional(IndicatorSet::SMA20, self.sma20)
            .with_optional(IndicatorSet::SMA50, self.sma50)
    }
}

/// Quote fetcher backed by a snapshot file with one row per symbol.
///
/// Each fetch stamps the quote with the current time. Rows are validated
/// when fetched, so one bad row only fails its own symbol.
pub struct CsvSnapshotFetcher {
    rows: HashMap<Symbol, SnapshotRecord>,
}

impl CsvSnapshotFetcher {
    /// Load a snapshot file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::NoDataAvailable);
        }
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Load a snapshot from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = HashMap::new();
        for result in reader.deserialize() {
            let record: SnapshotRecord =
                result.map_err(|e| DataError::ParseError(e.to_string()))?;
            let symbol = Symbol::parse(&record.symbol)?;
            // Later rows win
            rows.insert(symbol, record);
        }

        Ok(Self { rows })
    }

    /// Symbols present in the snapshot, sorted.
    pub fn symbols(&self) -> Vec<&Symbol> {
        let mut symbols: Vec<&Symbol> = self.rows.keys().collect();
        symbols.sort();
        symbols
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl QuoteFetcher for CsvSnapshotFetcher {
    async fn fetch(&self, symbol: &Symbol) -> FetchOutcome {
        let Some(record) = self.rows.get(symbol) else {
            return FetchOutcome::failure(format!("no data available for {}", symbol));
        };

        if !record.price.is_finite() || record.price <= 0.0 {
            return FetchOutcome::failure(format!("invalid price {} for {}", record.price, symbol));
        }

        let quote = Quote::new(symbol.clone(), record.price, Utc::now())
            .with_change(record.change, record.change_percent)
            .with_volume(record.volume)
            .with_range(
                record.high.unwrap_or(record.price),
                record.low.unwrap_or(record.price),
            );

        FetchOutcome::success(quote, record.indicators())
    }

    fn name(&self) -> &str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = "\
symbol,price,change,change_percent,volume,high,low,rsi14,macd,macd_signal,sma20,sma50
AAPL,189.5,2.1,1.12,51000000,190.2,186.9,28.4,1.2,0.8,182.0,178.5
MSFT,402.1,-3.4,-0.84,22000000,,,72.5,-0.4,0.1,410.0,
bad,0,0,0,0,,,,,,,
";

    fn sym(s: &str) -> Symbol {
        Symbol::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_full_row() {
        let fetcher = CsvSnapshotFetcher::from_reader(SNAPSHOT.as_bytes()).unwrap();
        assert_eq!(fetcher.len(), 3);

        let outcome = fetcher.fetch(&sym("AAPL")).await;
        let quote = outcome.quote().unwrap();
        assert_eq!(quote.price, 189.5);
        assert_eq!(quote.volume, 51_000_000);
        assert_eq!((quote.high, quote.low), (190.2, 186.9));

        let indicators = outcome.indicators().unwrap();
        assert_eq!(indicators.rsi14(), Some(28.4));
        assert_eq!(indicators.sma20(), Some(182.0));
        assert_eq!(indicators.get(IndicatorSet::SMA50), Some(178.5));
    }

    #[tokio::test]
    async fn test_missing_columns_are_absent() {
        let fetcher = CsvSnapshotFetcher::from_reader(SNAPSHOT.as_bytes()).unwrap();

        let outcome = fetcher.fetch(&sym("MSFT")).await;
        let quote = outcome.quote().unwrap();
        assert_eq!((quote.high, quote.low), (402.1, 402.1));
        assert_eq!(outcome.indicators().unwrap().get(IndicatorSet::SMA50), None);
    }

    #[tokio::test]
    async fn test_unknown_and_invalid_rows_fail() {
        let fetcher = CsvSnapshotFetcher::from_reader(SNAPSHOT.as_bytes()).unwrap();

        assert_eq!(
            fetcher.fetch(&sym("TSLA")).await.failure_reason(),
            Some("no data available for TSLA")
        );
        assert_eq!(
            fetcher.fetch(&sym("BAD")).await.failure_reason(),
            Some("invalid price 0 for BAD")
        );
    }

    #[test]
    fn test_malformed_file() {
        let data = "symbol,price\nAAPL,not-a-number\n";
        assert!(matches!(
            CsvSnapshotFetcher::from_reader(data.as_bytes()),
            Err(DataError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            CsvSnapshotFetcher::from_path("does/not/exist.csv"),
            Err(DataError::NoDataAvailable)
        ));
    }
}
