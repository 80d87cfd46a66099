use tracing::{debug, warn};

use crate::assets::Asset;
use crate::error::{AllocationError, Result};
use crate::portfolio::Portfolio;
use crate::prices::{resolve_prices, PriceBook, PriceSource};
use crate::types::AllocationResult;

// relative slack so floor() keeps a share when to_invest / price lands a hair below an integer
const SHARE_ROUNDING: f64 = 1e-12;

/// Quotes the prices the portfolio needs, then plans the contribution.
pub async fn allocate<P>(portfolio: &Portfolio, source: &P) -> Result<Vec<AllocationResult>>
where
    P: PriceSource + ?Sized,
{
    portfolio.validate()?;
    let book = resolve_prices(&portfolio.assets, source).await;
    allocate_with_prices(portfolio, &book)
}

/// Splits `total_contribution` across the assets in proportion to how far
/// each one sits below its target. Over-weight assets get nothing; nothing
/// is ever sold.
pub fn allocate_with_prices(
    portfolio: &Portfolio,
    book: &PriceBook,
) -> Result<Vec<AllocationResult>> {
    portfolio.validate()?;
    let contribution = portfolio.total_contribution;

    let current_values: Vec<f64> = portfolio
        .assets
        .iter()
        .map(|asset| asset.current_value(book))
        .collect();
    let current_total: f64 = current_values.iter().sum();
    let final_total = current_total + contribution;

    let gaps: Vec<f64> = portfolio
        .assets
        .iter()
        .zip(&current_values)
        .map(|(asset, current)| (final_total * asset.target_percentage() - current).max(0.0))
        .collect();
    let total_gap: f64 = gaps.iter().sum();

    let mut results: Vec<AllocationResult> = portfolio
        .assets
        .iter()
        .zip(current_values.iter().zip(&gaps))
        .map(|(asset, (&current, &gap))| {
            let proportion = if total_gap > 0.0 { gap / total_gap } else { 0.0 };
            let to_invest = contribution * proportion;
            plan_asset(asset, book, current, to_invest)
        })
        .collect::<Result<_>>()?;

    let total_remainder: f64 = results.iter().map(|r| r.remainder).sum();
    let actual_final_total = current_total + contribution - total_remainder;
    for result in &mut results {
        result.percentage_before = ratio(result.value_before, current_total);
        result.percentage_after = ratio(result.value_after, actual_final_total);
    }

    debug!(
        current_total,
        contribution,
        total_gap,
        total_remainder,
        "planned contribution"
    );
    Ok(results)
}

fn plan_asset(
    asset: &Asset,
    book: &PriceBook,
    current: f64,
    to_invest: f64,
) -> Result<AllocationResult> {
    let (share_price, shares_to_buy, invested_amount) = match asset {
        Asset::Value(_) => (None, None, to_invest),
        Asset::Shares(shares) => match asset.price(book) {
            Some(price) => {
                let count = ((to_invest / price) * (1.0 + SHARE_ROUNDING)).floor().max(0.0);
                if count >= u64::MAX as f64 {
                    return Err(AllocationError::invalid(format!(
                        "{} would need {count} shares at price {price}",
                        shares.name
                    )));
                }
                let count = count as u64;
                (Some(price), Some(count), count as f64 * price)
            }
            None => {
                if to_invest > 0.0 {
                    warn!(
                        asset = %shares.name,
                        symbol = %shares.symbol,
                        to_invest,
                        "no share price, leaving contribution uninvested"
                    );
                }
                (None, Some(0), 0.0)
            }
        },
    };

    Ok(AllocationResult {
        name: asset.name().to_owned(),
        value_before: current,
        value_after: current + invested_amount,
        target_percentage: asset.target_percentage(),
        percentage_before: 0.0,
        percentage_after: 0.0,
        to_invest,
        share_price,
        shares_to_buy,
        invested_amount,
        // rounding can put invested a few ulps above to_invest
        remainder: (to_invest - invested_amount).max(0.0),
    })
}

fn ratio(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total
    } else {
        0.0
    }
}
