// Pearson chi-square goodness-of-fit test
//
// statistic = sum((observed - expected)^2 / expected)
// df        = categories - 1
// p-value   = chi-square survival function at the statistic (statrs)
//
// Expected counts must be strictly positive. A violation is reported as a
// StatisticalError instead of producing a NaN p-value.

use crate::error::StatisticalError;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Result of a chi-square goodness-of-fit test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareTest {
    /// Pearson's chi-square statistic
    pub statistic: f64,

    /// Probability of a statistic at least this large under the expected
    /// distribution
    /// - p < alpha: the observed counts deviate significantly (imbalanced)
    /// - p >= alpha: no significant deviation (balanced)
    pub p_value: f64,

    /// Degrees of freedom (categories - 1)
    pub degrees_of_freedom: usize,
}

impl ChiSquareTest {
    pub fn is_significant(&self, significance_level: f64) -> bool {
        self.p_value < significance_level
    }
}

/// Compare observed category counts against expected counts
///
/// # Arguments
/// * `observed` - Empirical count per category
/// * `expected` - Expected count per category, index-aligned with `observed`
///
/// # Example
/// ```
/// use sourpea::balance::chi_square_goodness_of_fit;
///
/// let test = chi_square_goodness_of_fit(&[10, 10, 10], &[10.0, 10.0, 10.0]).unwrap();
/// assert_eq!(test.statistic, 0.0);
/// assert!((test.p_value - 1.0).abs() < 1e-12);
/// assert_eq!(test.degrees_of_freedom, 2);
/// ```
pub fn chi_square_goodness_of_fit(
    observed: &[u64],
    expected: &[f64],
) -> Result<ChiSquareTest, StatisticalError> {
    if observed.len() != expected.len() {
        return Err(StatisticalError::LengthMismatch {
            observed: observed.len(),
            expected: expected.len(),
        });
    }

    if expected.len() < 2 {
        return Err(StatisticalError::TooFewCategories(expected.len()));
    }

    let mass: f64 = expected.iter().sum();
    if mass == 0.0 {
        return Err(StatisticalError::ZeroExpectedMass);
    }

    if let Some((index, &value)) = expected
        .iter()
        .enumerate()
        .find(|(_, e)| !(e.is_finite() && **e > 0.0))
    {
        return Err(StatisticalError::NonPositiveExpected { index, value });
    }

    let statistic: f64 = observed
        .iter()
        .zip(expected)
        .map(|(&o, &e)| {
            let diff = o as f64 - e;
            diff * diff / e
        })
        .sum();

    let degrees_of_freedom = expected.len() - 1;
    let distribution = ChiSquared::new(degrees_of_freedom as f64)
        .map_err(|e| StatisticalError::Distribution(e.to_string()))?;
    let p_value = distribution.sf(statistic).clamp(0.0, 1.0);

    Ok(ChiSquareTest {
        statistic,
        p_value,
        degrees_of_freedom,
    })
}
