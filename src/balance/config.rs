// Configuration for counterbalancing checks
//
// Decides how strictly a trial sequence is held to the design and which
// p-value counts as balanced.

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};

/// How `Block::test` treats trials that do not fit the design
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataPolicy {
    /// Tolerate bad trials
    ///
    /// - A trial matching no crossing combination is counted in no bucket and
    ///   listed in `BalanceReport::unmatched_trials`
    /// - A window whose factor value is missing does not fire
    /// - A fired window whose owning factor value is missing is a mismatch
    #[default]
    Lenient,

    /// Fail with a `DataError` on the first bad trial
    Strict,
}

/// Configuration for counterbalancing checks
///
/// # Example
/// ```
/// use sourpea::balance::{BalanceConfig, DataPolicy};
///
/// let config = BalanceConfig::default();
/// assert_eq!(config.significance_level, 0.05);
/// assert_eq!(config.data_policy, DataPolicy::Lenient);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    /// Significance level (alpha) for the goodness-of-fit test
    ///
    /// A sequence is balanced when its p-value is at least this value.
    /// - 0.05 (default): conventional 95% confidence
    /// - 0.01: only flag gross imbalance
    /// - 0.10: flag milder imbalance
    pub significance_level: f64,

    /// Treatment of trials that do not fit the design
    pub data_policy: DataPolicy,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            significance_level: 0.05,
            data_policy: DataPolicy::Lenient,
        }
    }
}

impl BalanceConfig {
    /// Reject malformed data and only flag gross imbalance
    pub fn strict() -> Self {
        Self {
            significance_level: 0.01,
            data_policy: DataPolicy::Strict,
        }
    }

    /// Tolerate malformed data and flag milder imbalance
    pub fn permissive() -> Self {
        Self {
            significance_level: 0.10,
            data_policy: DataPolicy::Lenient,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(0.0..=1.0).contains(&self.significance_level) {
            return Err(ConfigurationError::Invalid(format!(
                "significance_level must be in [0, 1], got {}",
                self.significance_level
            )));
        }

        Ok(())
    }
}
