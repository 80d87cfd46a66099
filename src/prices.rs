use std::collections::{BTreeSet, HashMap};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::{stream::FuturesUnordered, StreamExt};
use tracing::{debug, warn};
use yahoo_finance_api::YahooConnector;

use crate::assets::Asset;

/// Something that can quote the latest price for a ticker symbol.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_price(&self, symbol: &str) -> Result<f64>;
}

/// Latest daily close from Yahoo Finance.
pub struct YahooPrices {
    client: YahooConnector,
}

impl std::fmt::Debug for YahooPrices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "YahooPrices")
    }
}

impl Default for YahooPrices {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooPrices {
    pub fn new() -> Self {
        Self {
            client: YahooConnector::new(),
        }
    }
}

#[async_trait]
impl PriceSource for YahooPrices {
    async fn fetch_price(&self, symbol: &str) -> Result<f64> {
        let res = self.client.get_latest_quotes(symbol, "1d").await?;
        Ok(res.last_quote()?.close)
    }
}

/// Fixed prices, for offline runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticPrices {
    prices: HashMap<String, f64>,
}

impl StaticPrices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, symbol: &str, price: f64) -> Self {
        self.prices.insert(symbol.to_owned(), price);
        self
    }
}

#[async_trait]
impl PriceSource for StaticPrices {
    async fn fetch_price(&self, symbol: &str) -> Result<f64> {
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| anyhow!("no price for {symbol}"))
    }
}

/// Prices that resolved successfully, keyed by symbol. A symbol absent
/// from the book is treated as unavailable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceBook {
    prices: HashMap<String, f64>,
}

impl PriceBook {
    pub fn insert(&mut self, symbol: &str, price: f64) {
        self.prices.insert(symbol.to_owned(), price);
    }

    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.prices.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Quotes every distinct symbol that has no pinned price, concurrently.
/// Failed or nonsensical quotes are logged and left out of the book.
pub async fn resolve_prices<P>(assets: &[Asset], source: &P) -> PriceBook
where
    P: PriceSource + ?Sized,
{
    let symbols: BTreeSet<&str> = assets.iter().filter_map(Asset::live_symbol).collect();

    let mut futures: FuturesUnordered<_> = symbols
        .into_iter()
        .map(|symbol| async move { (symbol, source.fetch_price(symbol).await) })
        .collect();

    let mut book = PriceBook::default();
    while let Some((symbol, result)) = futures.next().await {
        match result {
            Ok(price) if price.is_finite() && price > 0.0 => {
                debug!(symbol, price, "resolved share price");
                book.insert(symbol, price);
            }
            Ok(price) => warn!(symbol, price, "ignoring non-positive share price"),
            Err(err) => warn!(symbol, error = %err, "share price unavailable"),
        }
    }
    book
}
