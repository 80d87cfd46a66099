use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::assets::Asset;
use crate::portfolio::Portfolio;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Default convergence tolerance, in percentage points.
pub const DEFAULT_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub total_contribution: f64,
    #[serde(default = "default_tolerance")]
    pub simulation_tolerance: f64,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(raw)?;
        config.portfolio().validate()?;
        Ok(config)
    }

    pub fn portfolio(&self) -> Portfolio {
        Portfolio::new(self.assets.clone(), self.total_contribution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_document() {
        let config = AppConfig::from_json(
            r#"{
                "totalContribution": 5000,
                "simulationTolerance": 0.25,
                "assets": [
                    {"type": "shares", "name": "WRLD11", "symbol": "WRLD11.SA", "shares": 100, "targetPercentage": 0.5, "sharePrice": 115.0},
                    {"type": "value", "name": "CASH", "currentValue": 1000, "targetPercentage": 0.5}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.total_contribution, 5000.0);
        assert_eq!(config.simulation_tolerance, 0.25);
        assert_eq!(
            config.portfolio().assets,
            vec![
                Asset::shares("WRLD11", "WRLD11.SA", 100, 0.5).with_share_price(115.0),
                Asset::value("CASH", 1000.0, 0.5),
            ]
        );
    }

    #[test]
    fn tolerance_defaults() {
        let config = AppConfig::from_json(
            r#"{"totalContribution": 10, "assets": [{"type": "value", "name": "CASH", "currentValue": 1, "targetPercentage": 1}]}"#,
        )
        .unwrap();
        assert_eq!(config.simulation_tolerance, DEFAULT_TOLERANCE);
    }

    #[test]
    fn rejects_malformed_documents() {
        // unknown asset kind
        assert!(AppConfig::from_json(
            r#"{"totalContribution": 10, "assets": [{"type": "bond", "name": "X", "targetPercentage": 1}]}"#
        )
        .is_err());
        // fractional share count
        assert!(AppConfig::from_json(
            r#"{"totalContribution": 10, "assets": [{"type": "shares", "name": "X", "symbol": "X", "shares": 1.5, "targetPercentage": 1}]}"#
        )
        .is_err());
        // targets off
        assert!(AppConfig::from_json(
            r#"{"totalContribution": 10, "assets": [{"type": "value", "name": "X", "currentValue": 1, "targetPercentage": 0.9}]}"#
        )
        .is_err());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = AppConfig::load("does/not/exist.json").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.json"));
    }
}
