use num::Num;

use crate::error::{ComparisonError, Result};

/// Pairwise similarity between two vectors over the same vocabulary.
pub trait Compare<N>
where
    N: Num + Copy,
{
    /// s(a, b), both vectors must have the same nonzero length
    fn score(vec: &[N], other: &[N]) -> Result<f64>;
}

/// Pearson correlation
/// r = (Σab - ΣaΣb/n) / sqrt((Σa² - (Σa)²/n) * (Σb² - (Σb)²/n))
#[derive(Debug, Clone, Copy, Default)]
pub struct PearsonCompare;

impl<N> Compare<N> for PearsonCompare
where
    N: Num + Copy + Into<f64>,
{
    #[inline]
    fn score(vec: &[N], other: &[N]) -> Result<f64> {
        pearson_score(vec, other)
    }
}

/// Pearson score of two equal-length vectors.
///
/// Returns exactly `1.0` when either vector has zero variance, instead of
/// dividing by zero. Mismatched lengths are rejected with
/// [`ComparisonError::InvalidInput`], empty vectors with
/// [`ComparisonError::EmptyVector`].
pub fn pearson_score<N>(list1: &[N], list2: &[N]) -> Result<f64>
where
    N: Num + Copy + Into<f64>,
{
    if list1.len() != list2.len() {
        return Err(ComparisonError::InvalidInput {
            left: list1.len(),
            right: list2.len(),
        });
    }
    if list1.is_empty() {
        return Err(ComparisonError::EmptyVector);
    }

    let n = list1.len() as f64;
    let mut sum1 = 0.0;
    let mut sum2 = 0.0;
    let mut sum_sq1 = 0.0;
    let mut sum_sq2 = 0.0;
    let mut prod_sum = 0.0;
    for (&a, &b) in list1.iter().zip(list2) {
        let a: f64 = a.into();
        let b: f64 = b.into();
        sum1 += a;
        sum2 += b;
        sum_sq1 += a * a;
        sum_sq2 += b * b;
        prod_sum += a * b;
    }

    let num = prod_sum - (sum1 * sum2 / n);
    // rounding can push a zero variance slightly below 0
    let var1 = (sum_sq1 - sum1 * sum1 / n).max(0.0);
    let var2 = (sum_sq2 - sum2 * sum2 / n).max(0.0);
    let den = (var1 * var2).sqrt();

    if den == 0.0 {
        return Ok(1.0);
    }
    Ok(num / den)
}
