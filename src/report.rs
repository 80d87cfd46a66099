use anyhow::Result;
use polars::prelude::*;

use crate::portfolio::Portfolio;
use crate::types::{AllocationResult, Simulation};

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn pct(x: f64) -> f64 {
    round2(x * 100.0)
}

fn amounts(
    results: &[AllocationResult],
    f: impl Fn(&AllocationResult) -> f64,
    total: f64,
) -> Vec<Option<f64>> {
    results
        .iter()
        .map(|r| Some(round2(f(r))))
        .chain(std::iter::once(Some(round2(total))))
        .collect()
}

fn percents(
    results: &[AllocationResult],
    f: impl Fn(&AllocationResult) -> f64,
) -> Vec<Option<f64>> {
    results
        .iter()
        .map(|r| Some(pct(f(r))))
        .chain(std::iter::once(None))
        .collect()
}

/// One row per asset plus a trailing total row.
pub fn allocation_to_dataframe(
    results: &[AllocationResult],
    total_contribution: f64,
) -> Result<DataFrame> {
    let total_before: f64 = results.iter().map(|r| r.value_before).sum();
    let total_invested: f64 = results.iter().map(|r| r.invested_amount).sum();
    let total_after: f64 = results.iter().map(|r| r.value_after).sum();

    let mut names: Vec<String> = results.iter().map(|r| r.name.clone()).collect();
    names.push("Total".to_string());

    let prices: Vec<Option<f64>> = results
        .iter()
        .map(|r| r.share_price.map(round2))
        .chain(std::iter::once(None))
        .collect();
    let quantities: Vec<Option<u64>> = results
        .iter()
        .map(|r| r.shares_to_buy)
        .chain(std::iter::once(None))
        .collect();

    Ok(df!(
        "Asset" => names,
        "Current Value" => amounts(results, |r| r.value_before, total_before),
        "Current %" => percents(results, |r| r.percentage_before),
        "Target %" => percents(results, |r| r.target_percentage),
        "To Invest" => amounts(results, |r| r.to_invest, total_contribution),
        "Invested" => amounts(results, |r| r.invested_amount, total_invested),
        "Remainder" => amounts(results, |r| r.remainder, total_contribution - total_invested),
        "Value After" => amounts(results, |r| r.value_after, total_after),
        "% After" => percents(results, |r| r.percentage_after),
        "Price" => prices,
        "Buy Qty" => quantities
    )?)
}

/// Iteration number plus one `% <asset>` column per asset.
pub fn simulation_to_dataframe(
    portfolio: &Portfolio,
    simulation: &Simulation,
) -> Result<DataFrame> {
    let iterations: Vec<u64> = simulation.rows.iter().map(|row| row.iteration as u64).collect();
    let mut columns = vec![Series::new("Iteration", iterations)];

    for (index, asset) in portfolio.assets.iter().enumerate() {
        let values: Vec<Option<f64>> = simulation
            .rows
            .iter()
            .map(|row| row.proportions.get(index).copied().map(round2))
            .collect();
        columns.push(Series::new(&format!("% {}", asset.name()), values));
    }

    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SimulationRow;

    fn result(name: &str, price: Option<f64>, shares: Option<u64>) -> AllocationResult {
        AllocationResult {
            name: name.to_string(),
            value_before: 100.0,
            value_after: 150.0,
            target_percentage: 0.5,
            percentage_before: 0.5,
            percentage_after: 0.6,
            to_invest: 50.0,
            share_price: price,
            shares_to_buy: shares,
            invested_amount: 50.0,
            remainder: 0.0,
        }
    }

    #[test]
    fn allocation_frame_has_total_row() {
        let results = vec![result("A", Some(25.0), Some(2)), result("CASH", None, None)];

        let df = allocation_to_dataframe(&results, 100.0).unwrap();

        assert_eq!(df.shape(), (3, 11));
        let invested = df.column("Invested").unwrap().f64().unwrap();
        assert_eq!(invested.get(2), Some(100.0));
        let qty = df.column("Buy Qty").unwrap().u64().unwrap();
        assert_eq!(qty.get(0), Some(2));
        assert_eq!(qty.get(1), None);
        let target = df.column("Target %").unwrap().f64().unwrap();
        assert_eq!(target.get(0), Some(50.0));
    }

    #[test]
    fn simulation_frame_has_column_per_asset() {
        let portfolio = Portfolio::builder()
            .value("A", 1.0, 0.5)
            .value("B", 1.0, 0.5)
            .build()
            .unwrap();
        let simulation = Simulation {
            rows: vec![
                SimulationRow {
                    iteration: 1,
                    proportions: vec![60.123, 39.877],
                    converged: false,
                },
                SimulationRow {
                    iteration: 2,
                    proportions: vec![50.2, 49.8],
                    converged: true,
                },
            ],
            converged: true,
        };

        let df = simulation_to_dataframe(&portfolio, &simulation).unwrap();

        assert_eq!(df.shape(), (2, 3));
        let a = df.column("% A").unwrap().f64().unwrap();
        assert_eq!(a.get(0), Some(60.12));
    }
}
