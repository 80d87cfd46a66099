use serde::Serialize;

/// Plan for one asset after a single contribution round.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    pub name: String,
    pub value_before: f64,
    pub value_after: f64,
    pub target_percentage: f64,
    pub percentage_before: f64,
    pub percentage_after: f64,
    /// Ideal share of the contribution, before whole-share rounding.
    pub to_invest: f64,
    /// `None` for value assets and for shares whose price was unavailable.
    pub share_price: Option<f64>,
    /// Always set for share assets, never for value assets.
    pub shares_to_buy: Option<u64>,
    pub invested_amount: f64,
    pub remainder: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRow {
    pub iteration: usize,
    /// Post-contribution proportion of each asset, in percentage points.
    pub proportions: Vec<f64>,
    pub converged: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Simulation {
    pub rows: Vec<SimulationRow>,
    pub converged: bool,
}

impl Simulation {
    pub fn iterations(&self) -> usize {
        self.rows.len()
    }

    pub fn last(&self) -> Option<&SimulationRow> {
        self.rows.last()
    }
}
