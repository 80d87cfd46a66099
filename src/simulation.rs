use tracing::{debug, info};

use crate::allocation::allocate_with_prices;
use crate::assets::Asset;
use crate::error::{AllocationError, Result};
use crate::portfolio::Portfolio;
use crate::prices::{resolve_prices, PriceBook, PriceSource};
use crate::types::{AllocationResult, Simulation, SimulationRow};

/// Hard stop for portfolios that can never reach their targets.
pub const MAX_ITERATIONS: usize = 1000;

/// Quotes prices once, then replays `periodic_contribution` until every
/// asset sits within `tolerance` percentage points of its target.
pub async fn simulate<P>(
    portfolio: &Portfolio,
    periodic_contribution: f64,
    tolerance: f64,
    source: &P,
) -> Result<Simulation>
where
    P: PriceSource + ?Sized,
{
    starting_snapshot(portfolio, periodic_contribution, tolerance)?;
    let book = resolve_prices(&portfolio.assets, source).await;
    simulate_with_prices(portfolio, periodic_contribution, tolerance, book)
}

pub fn simulate_with_prices(
    portfolio: &Portfolio,
    periodic_contribution: f64,
    tolerance: f64,
    book: PriceBook,
) -> Result<Simulation> {
    let rows = Convergence::new(portfolio, periodic_contribution, tolerance, book)?
        .collect::<Result<Vec<_>>>()?;
    let converged = rows.last().map_or(false, |row| row.converged);
    info!(iterations = rows.len(), converged, "simulation finished");
    Ok(Simulation { rows, converged })
}

/// Iterator over simulated contribution rounds. Yields the row that
/// converges, then stops; never yields more than [`MAX_ITERATIONS`] rows.
#[derive(Debug, Clone)]
pub struct Convergence {
    snapshot: Portfolio,
    book: PriceBook,
    tolerance: f64,
    iteration: usize,
    max_iterations: usize,
    done: bool,
}

impl Convergence {
    pub fn new(
        portfolio: &Portfolio,
        periodic_contribution: f64,
        tolerance: f64,
        book: PriceBook,
    ) -> Result<Self> {
        let snapshot = starting_snapshot(portfolio, periodic_contribution, tolerance)?;
        Ok(Self {
            snapshot,
            book,
            tolerance,
            iteration: 0,
            max_iterations: MAX_ITERATIONS,
            done: false,
        })
    }

    pub fn max_iterations(mut self, cap: usize) -> Self {
        self.max_iterations = cap.min(MAX_ITERATIONS);
        self
    }

    pub fn snapshot(&self) -> &Portfolio {
        &self.snapshot
    }

    fn step(&mut self) -> Result<SimulationRow> {
        self.iteration += 1;
        let results = allocate_with_prices(&self.snapshot, &self.book)?;

        let proportions: Vec<f64> = results.iter().map(|r| r.percentage_after * 100.0).collect();
        self.snapshot.assets = self
            .snapshot
            .assets
            .iter()
            .enumerate()
            .map(|(index, asset)| advance(asset, results.get(index)))
            .collect::<Result<Vec<_>>>()?;

        let converged = self
            .snapshot
            .assets
            .iter()
            .zip(&proportions)
            .all(|(asset, pct)| (pct - asset.target_percentage() * 100.0).abs() <= self.tolerance);

        debug!(iteration = self.iteration, ?proportions, converged, "simulated contribution");
        Ok(SimulationRow {
            iteration: self.iteration,
            proportions,
            converged,
        })
    }
}

impl Iterator for Convergence {
    type Item = Result<SimulationRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.iteration >= self.max_iterations {
            return None;
        }
        let row = self.step();
        match &row {
            Ok(row) => self.done = row.converged,
            Err(_) => self.done = true,
        }
        Some(row)
    }
}

fn starting_snapshot(
    portfolio: &Portfolio,
    periodic_contribution: f64,
    tolerance: f64,
) -> Result<Portfolio> {
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(AllocationError::invalid(format!(
            "tolerance must be a non-negative number of percentage points (got {tolerance})"
        )));
    }
    let snapshot = Portfolio::new(portfolio.assets.clone(), periodic_contribution);
    snapshot.validate()?;
    Ok(snapshot)
}

/// Applies one round's plan to a single asset.
fn advance(asset: &Asset, result: Option<&AllocationResult>) -> Result<Asset> {
    let result = result.filter(|r| r.name == asset.name()).ok_or_else(|| {
        AllocationError::inconsistent(format!("no result for asset {}", asset.name()))
    })?;

    let mut next = asset.clone();
    match &mut next {
        Asset::Value(value) => value.current_value = result.value_after,
        Asset::Shares(shares) => {
            let bought = result.shares_to_buy.ok_or_else(|| {
                AllocationError::inconsistent(format!("no share count for asset {}", shares.name))
            })?;
            shares.shares = shares.shares.checked_add(bought).ok_or_else(|| {
                AllocationError::invalid(format!("share count of {} overflows", shares.name))
            })?;
        }
    }
    Ok(next)
}
