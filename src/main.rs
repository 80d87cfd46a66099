use anyhow::{Context, Result};
use contribution_balancer::config::{AppConfig, DEFAULT_CONFIG_PATH};
use contribution_balancer::{allocate, logging, report, simulate, YahooPrices};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = AppConfig::load(&path)?;
    let portfolio = config.portfolio();
    let prices = YahooPrices::new();

    let start_time = std::time::Instant::now();
    let results = allocate(&portfolio, &prices)
        .await
        .context("calculating allocation")?;
    info!(elapsed = ?start_time.elapsed(), assets = results.len(), "allocation ready");

    println!("\n--- Allocation Calculation for Next Contribution ---");
    println!("{}", report::allocation_to_dataframe(&results, portfolio.total_contribution)?);

    // reuse this round's quotes for every simulated round
    let pinned = portfolio.with_resolved_prices(&results);
    let simulation = simulate(
        &pinned,
        config.total_contribution,
        config.simulation_tolerance,
        &prices,
    )
    .await
    .context("simulating contributions")?;

    println!(
        "\n--- Simulation until Target Allocation (Tolerance: {}%) ---",
        config.simulation_tolerance
    );
    println!("{}", report::simulation_to_dataframe(&pinned, &simulation)?);
    if !simulation.converged {
        println!(
            "Targets not reached within {} contributions",
            simulation.iterations()
        );
    }
    Ok(())
}
