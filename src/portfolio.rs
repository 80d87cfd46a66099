use serde::{Deserialize, Serialize};

use crate::assets::Asset;
use crate::error::{AllocationError, Result};
use crate::types::AllocationResult;

/// Allowed drift of the target percentages away from exactly 1.
pub const TARGET_SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub assets: Vec<Asset>,
    // cash to distribute this round
    pub total_contribution: f64,
}

impl Portfolio {
    pub fn new(assets: Vec<Asset>, total_contribution: f64) -> Self {
        Self {
            assets,
            total_contribution,
        }
    }

    pub fn builder() -> PortfolioBuilder {
        PortfolioBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if self.assets.is_empty() {
            return Err(AllocationError::invalid("portfolio has no assets"));
        }
        if !self.total_contribution.is_finite() {
            return Err(AllocationError::invalid("contribution must be a finite amount"));
        }
        if self.total_contribution < 0.0 {
            return Err(AllocationError::invalid(format!(
                "contribution must not be negative (got {})",
                self.total_contribution
            )));
        }

        for asset in &self.assets {
            let target = asset.target_percentage();
            if !(0.0..=1.0).contains(&target) {
                return Err(AllocationError::invalid(format!(
                    "target percentage of {} must be between 0 and 1 (got {target})",
                    asset.name()
                )));
            }
            match asset {
                Asset::Value(value) => {
                    if !value.current_value.is_finite() || value.current_value < 0.0 {
                        return Err(AllocationError::invalid(format!(
                            "current value of {} must be a non-negative amount",
                            value.name
                        )));
                    }
                }
                Asset::Shares(shares) => {
                    if let Some(price) = shares.share_price {
                        if !price.is_finite() || price <= 0.0 {
                            return Err(AllocationError::invalid(format!(
                                "share price of {} must be positive",
                                shares.name
                            )));
                        }
                    }
                }
            }
        }

        let sum: f64 = self.assets.iter().map(Asset::target_percentage).sum();
        if (sum - 1.0).abs() > TARGET_SUM_TOLERANCE {
            return Err(AllocationError::TargetSum { sum });
        }
        Ok(())
    }

    /// Copies the prices used by a previous allocation into every share
    /// asset so later rounds can run without quoting again.
    pub fn with_resolved_prices(&self, results: &[AllocationResult]) -> Portfolio {
        let assets = self
            .assets
            .iter()
            .enumerate()
            .map(|(index, asset)| {
                let resolved = results
                    .get(index)
                    .filter(|r| r.name == asset.name())
                    .and_then(|r| r.share_price);
                match resolved {
                    Some(price) => asset.clone().with_share_price(price),
                    None => asset.clone(),
                }
            })
            .collect();
        Portfolio::new(assets, self.total_contribution)
    }
}

#[derive(Debug, Default)]
pub struct PortfolioBuilder {
    assets: Vec<Asset>,
    total_contribution: f64,
}

impl PortfolioBuilder {
    pub fn new() -> PortfolioBuilder {
        PortfolioBuilder::default()
    }

    pub fn asset(mut self, asset: Asset) -> Self {
        self.assets.push(asset);
        self
    }

    pub fn value(self, name: &str, current_value: f64, target_percentage: f64) -> Self {
        self.asset(Asset::value(name, current_value, target_percentage))
    }

    pub fn shares(self, name: &str, symbol: &str, shares: u64, target_percentage: f64) -> Self {
        self.asset(Asset::shares(name, symbol, shares, target_percentage))
    }

    pub fn total_contribution(mut self, amount: f64) -> Self {
        self.total_contribution = amount;
        self
    }

    pub fn build(self) -> Result<Portfolio> {
        let portfolio = Portfolio::new(self.assets, self.total_contribution);
        portfolio.validate()?;
        Ok(portfolio)
    }
}
