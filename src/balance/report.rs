use crate::balance::crossing::CrossingCell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of testing a trial sequence against a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    /// Goodness-of-fit p-value for the crossing (1.0 when there is no crossing)
    pub p_value: f64,

    /// Chi-square statistic
    pub statistic: f64,

    /// Degrees of freedom of the chi-square test
    pub degrees_of_freedom: usize,

    /// Crossing combinations, index-aligned with `observed` and `expected`
    pub cells: Vec<CrossingCell>,

    /// Empirical count per crossing combination
    pub observed: Vec<u64>,

    /// Expected count per crossing combination
    pub expected: Vec<f64>,

    /// Design factor -> every checked derivation was consistent
    pub levels: BTreeMap<String, bool>,

    /// Design factor -> trial indices whose derived level mismatched
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub derivation_failures: BTreeMap<String, Vec<usize>>,

    /// Trials counted into no crossing combination (lenient policy)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unmatched_trials: Vec<usize>,

    /// Leading trials left out of the tally for lack of history
    pub excluded_trials: usize,

    /// Significance level the verdict is judged against
    pub significance_level: f64,
}

impl BalanceReport {
    /// The crossing shows no significant deviation from its expected distribution
    pub fn is_balanced(&self) -> bool {
        self.p_value >= self.significance_level
    }

    /// Every design factor's derived levels were consistent
    pub fn derivations_valid(&self) -> bool {
        self.levels.values().all(|valid| *valid)
    }

    pub fn passed(&self) -> bool {
        self.is_balanced() && self.derivations_valid()
    }

    /// Generate human-readable report
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();

        if self.is_balanced() {
            report.push_str("✅ COUNTERBALANCED\n\n");
        } else {
            report.push_str("❌ NOT COUNTERBALANCED\n\n");
        }
        report.push_str(&format!(
            "p-value: {:.4} (chi-square = {:.4}, df = {})\n",
            self.p_value, self.statistic, self.degrees_of_freedom
        ));
        report.push_str(&format!(
            "Significance level: {} ({}% confidence)\n",
            self.significance_level,
            (1.0 - self.significance_level) * 100.0
        ));
        if self.excluded_trials > 0 {
            report.push_str(&format!(
                "Excluded leading trials: {}\n",
                self.excluded_trials
            ));
        }

        if !self.cells.is_empty() {
            report.push_str("\n📊 Crossing:\n");
            for ((cell, observed), expected) in
                self.cells.iter().zip(&self.observed).zip(&self.expected)
            {
                report.push_str(&format!(
                    "  {:<30} observed={:<5} expected={:.2}\n",
                    cell.names.join(" × "),
                    observed,
                    expected
                ));
            }
        }

        if !self.levels.is_empty() {
            report.push_str("\n🧮 Derived levels:\n");
            for (factor, valid) in &self.levels {
                let mark = if *valid { "✅" } else { "❌" };
                report.push_str(&format!("  {} {}", mark, factor));
                if let Some(failures) = self.derivation_failures.get(factor) {
                    let trials: Vec<String> = failures.iter().map(|t| t.to_string()).collect();
                    report.push_str(&format!(" (mismatched trials: {})", trials.join(", ")));
                }
                report.push('\n');
            }
        }

        if !self.unmatched_trials.is_empty() {
            report.push_str(&format!(
                "\n⚠️  {} trial(s) matched no crossing combination\n",
                self.unmatched_trials.len()
            ));
        }

        report
    }
}
