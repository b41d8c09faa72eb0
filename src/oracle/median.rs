//! Median reduction over the surviving feed values

use crate::error::{OracleError, OracleResult};
use crate::types::Price;

/// Median of `values`, refusing to answer with fewer than `minimum_required`.
///
/// Even-length inputs yield the floor of the mean of the two central values.
/// An empty input never has a median, whatever the minimum.
pub fn median(values: &[Price], minimum_required: usize) -> OracleResult<Price> {
    if values.len() < minimum_required || values.is_empty() {
        return Err(OracleError::NotEnoughFeedsAvailable {
            available: values.len(),
            required: minimum_required,
        });
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok(floor_mean(sorted[mid - 1], sorted[mid]))
    } else {
        Ok(sorted[mid])
    }
}

/// floor((a + b) / 2) without overflowing
fn floor_mean(a: Price, b: Price) -> Price {
    a.div_euclid(2) + b.div_euclid(2) + (a.rem_euclid(2) + b.rem_euclid(2)) / 2
}
