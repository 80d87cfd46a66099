pub mod allocation;
pub mod assets;
pub mod config;
pub mod error;
pub mod logging;
pub mod portfolio;
pub mod prices;
pub mod report;
pub mod simulation;
pub mod types;

pub use allocation::{allocate, allocate_with_prices};
pub use assets::{Asset, ShareAsset, ValueAsset};
pub use error::AllocationError;
pub use portfolio::Portfolio;
pub use prices::{PriceBook, PriceSource, StaticPrices, YahooPrices};
pub use simulation::{simulate, simulate_with_prices, Convergence, MAX_ITERATIONS};
pub use types::{AllocationResult, Simulation, SimulationRow};
