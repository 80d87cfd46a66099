use serde::{Deserialize, Serialize};

use crate::prices::PriceBook;

/// A holding tracked by its cash value only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueAsset {
    pub name: String,
    pub current_value: f64,
    pub target_percentage: f64,
}

/// A holding of whole shares, valued at a market price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareAsset {
    pub name: String,
    pub symbol: String,
    pub shares: u64,
    pub target_percentage: f64,
    /// Pins the price instead of looking it up, used by the simulator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Asset {
    #[serde(rename = "value")]
    Value(ValueAsset),
    #[serde(rename = "shares")]
    Shares(ShareAsset),
}

impl Asset {
    pub fn value(name: &str, current_value: f64, target_percentage: f64) -> Self {
        Asset::Value(ValueAsset {
            name: name.to_owned(),
            current_value,
            target_percentage,
        })
    }

    pub fn shares(name: &str, symbol: &str, shares: u64, target_percentage: f64) -> Self {
        Asset::Shares(ShareAsset {
            name: name.to_owned(),
            symbol: symbol.to_owned(),
            shares,
            target_percentage,
            share_price: None,
        })
    }

    pub fn with_share_price(self, price: f64) -> Self {
        match self {
            Asset::Shares(asset) => Asset::Shares(ShareAsset {
                share_price: Some(price),
                ..asset
            }),
            value @ Asset::Value(_) => value,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Asset::Value(asset) => &asset.name,
            Asset::Shares(asset) => &asset.name,
        }
    }

    pub fn target_percentage(&self) -> f64 {
        match self {
            Asset::Value(asset) => asset.target_percentage,
            Asset::Shares(asset) => asset.target_percentage,
        }
    }

    /// Symbol that still needs a live quote, if any.
    pub fn live_symbol(&self) -> Option<&str> {
        match self {
            Asset::Shares(ShareAsset {
                symbol,
                share_price: None,
                ..
            }) => Some(symbol),
            _ => None,
        }
    }

    /// Price used to value and buy this asset. `None` for value assets
    /// and for share assets whose price could not be resolved.
    pub fn price(&self, book: &PriceBook) -> Option<f64> {
        match self {
            Asset::Value(_) => None,
            Asset::Shares(asset) => asset.share_price.or_else(|| book.get(&asset.symbol)),
        }
    }

    pub fn current_value(&self, book: &PriceBook) -> f64 {
        match self {
            Asset::Value(asset) => asset.current_value,
            Asset::Shares(asset) => asset.shares as f64 * self.price(book).unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_book() {
        let mut book = PriceBook::default();
        book.insert("WRLD11.SA", 115.0);
        let asset = Asset::shares("WRLD11", "WRLD11.SA", 10, 1.0);
        assert_eq!(asset.current_value(&book), 1150.0);
        assert_eq!(asset.live_symbol(), Some("WRLD11.SA"));

        let pinned = asset.with_share_price(120.0);
        assert_eq!(pinned.current_value(&book), 1200.0);
        assert_eq!(pinned.live_symbol(), None);
    }

    #[test]
    fn missing_price_values_shares_at_zero() {
        let asset = Asset::shares("B5P211", "B5P211.SA", 10, 1.0);
        assert_eq!(asset.price(&PriceBook::default()), None);
        assert_eq!(asset.current_value(&PriceBook::default()), 0.0);
    }

    #[test]
    fn value_asset_ignores_prices() {
        let asset = Asset::value("CASH", 1000.0, 0.5).with_share_price(3.0);
        assert_eq!(asset.price(&PriceBook::default()), None);
        assert_eq!(asset.current_value(&PriceBook::default()), 1000.0);
        assert_eq!(asset.name(), "CASH");
        assert_eq!(asset.target_percentage(), 0.5);
    }

    #[test]
    fn deserializes_tagged_assets() {
        let json = r#"[
            {"type": "value", "name": "CASH", "currentValue": 1000, "targetPercentage": 0.5},
            {"type": "shares", "name": "WRLD11", "symbol": "WRLD11.SA", "shares": 100, "targetPercentage": 0.5}
        ]"#;
        let assets: Vec<Asset> = serde_json::from_str(json).unwrap();
        assert_eq!(assets[0], Asset::value("CASH", 1000.0, 0.5));
        assert_eq!(assets[1], Asset::shares("WRLD11", "WRLD11.SA", 100, 0.5));
    }
}
