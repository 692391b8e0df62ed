use crate::balance::config::{BalanceConfig, DataPolicy};
use crate::balance::crossing::CrossingTable;
use crate::balance::derivation::validate_derivations;
use crate::balance::report::BalanceReport;
use crate::balance::statistics::{chi_square_goodness_of_fit, ChiSquareTest};
use crate::design::Factor;
use crate::error::{ConfigurationError, DataError, Result};
use crate::sequence::Trial;
use std::collections::{BTreeMap, HashSet};

/// A design plus a crossing, ready to test trial sequences
///
/// The crossing table is computed once here. `test` only reads the block,
/// so one block can be shared and tested from several threads.
///
/// # Example
/// ```
/// use sourpea::balance::Block;
/// use sourpea::design::Factor;
/// use sourpea::sequence::trial;
///
/// let word = Factor::new("word", ["red", "green"]).unwrap();
/// let color = Factor::new("color", ["red", "green"]).unwrap();
/// let block = Block::crossed(vec![word, color]).unwrap();
///
/// let sequence = vec![
///     trial([("word", "red"), ("color", "red")]),
///     trial([("word", "green"), ("color", "red")]),
///     trial([("word", "red"), ("color", "green")]),
///     trial([("word", "green"), ("color", "green")]),
/// ];
/// let report = block.test(&sequence).unwrap();
/// assert!(report.is_balanced());
/// ```
#[derive(Debug, Clone)]
pub struct Block {
    design: Vec<Factor>,
    crossing: Vec<Factor>,
    table: CrossingTable,
    config: BalanceConfig,
}

struct CrossingOutcome {
    test: ChiSquareTest,
    observed: Vec<u64>,
    expected: Vec<f64>,
    unmatched: Vec<usize>,
    excluded: usize,
}

fn check_unique(
    factors: &[Factor],
    role: &'static str,
) -> std::result::Result<(), ConfigurationError> {
    let mut seen = HashSet::new();
    for factor in factors {
        if !seen.insert(factor.name()) {
            return Err(ConfigurationError::DuplicateFactor {
                factor: factor.name().to_string(),
                role,
            });
        }
    }
    Ok(())
}

impl Block {
    /// Block validating `design` and balancing `crossing`
    ///
    /// An empty crossing disables the goodness-of-fit test: every report then
    /// carries a p-value of 1.
    pub fn new(
        design: Vec<Factor>,
        crossing: Vec<Factor>,
    ) -> std::result::Result<Self, ConfigurationError> {
        check_unique(&design, "design")?;
        check_unique(&crossing, "crossing")?;

        let table = CrossingTable::new(&crossing);
        tracing::debug!(
            design = design.len(),
            crossing = crossing.len(),
            cells = table.len(),
            max_deficit = table.max_deficit(),
            "built crossing table"
        );

        Ok(Self {
            design,
            crossing,
            table,
            config: BalanceConfig::default(),
        })
    }

    /// Block whose design and crossing are the same factors
    pub fn crossed(factors: Vec<Factor>) -> std::result::Result<Self, ConfigurationError> {
        Self::new(factors.clone(), factors)
    }

    /// Block that only validates derived levels
    pub fn design_only(design: Vec<Factor>) -> std::result::Result<Self, ConfigurationError> {
        Self::new(design, Vec::new())
    }

    pub fn with_config(
        mut self,
        config: BalanceConfig,
    ) -> std::result::Result<Self, ConfigurationError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn design(&self) -> &[Factor] {
        &self.design
    }

    pub fn crossing(&self) -> &[Factor] {
        &self.crossing
    }

    pub fn table(&self) -> &CrossingTable {
        &self.table
    }

    pub fn config(&self) -> &BalanceConfig {
        &self.config
    }

    /// Test a trial sequence for crossing balance and derivation consistency
    ///
    /// The two checks are independent; both read only the block and the
    /// sequence.
    ///
    /// # Errors
    /// - `StatisticalError` when the expected counts are degenerate (e.g. an
    ///   empty sequence against a non-empty crossing)
    /// - `DataError` under [`DataPolicy::Strict`] for trials that do not fit
    pub fn test(&self, sequence: &[Trial]) -> Result<BalanceReport> {
        tracing::debug!(trials = sequence.len(), "testing sequence");

        let crossing = self.crossing_test(sequence)?;
        let checks = validate_derivations(&self.design, sequence, self.config.data_policy)?;

        let mut levels = BTreeMap::new();
        let mut derivation_failures = BTreeMap::new();
        for check in checks {
            if !check.failures.is_empty() {
                derivation_failures.insert(check.factor.clone(), check.failures);
            }
            levels.insert(check.factor, check.valid);
        }

        Ok(BalanceReport {
            p_value: crossing.test.p_value,
            statistic: crossing.test.statistic,
            degrees_of_freedom: crossing.test.degrees_of_freedom,
            cells: self.table.cells().to_vec(),
            observed: crossing.observed,
            expected: crossing.expected,
            levels,
            derivation_failures,
            unmatched_trials: crossing.unmatched,
            excluded_trials: crossing.excluded,
            significance_level: self.config.significance_level,
        })
    }

    fn crossing_test(&self, sequence: &[Trial]) -> Result<CrossingOutcome> {
        if self.table.is_empty() {
            return Ok(CrossingOutcome {
                test: chi_square_goodness_of_fit(&[1, 1], &[1.0, 1.0])?,
                observed: Vec::new(),
                expected: Vec::new(),
                unmatched: Vec::new(),
                excluded: 0,
            });
        }

        let excluded = self.table.max_deficit().min(sequence.len());
        let mut observed = vec![0u64; self.table.len()];
        let mut unmatched = Vec::new();

        for (index, trial) in sequence.iter().enumerate().skip(excluded) {
            match self.cell_index(trial, index)? {
                Some(cell) => observed[cell] += 1,
                None => unmatched.push(index),
            }
        }

        if !unmatched.is_empty() {
            tracing::warn!(
                count = unmatched.len(),
                "trials matched no crossing combination and were not counted"
            );
        }

        let expected = self.table.expected_counts(sequence.len());
        let test = chi_square_goodness_of_fit(&observed, &expected)?;

        Ok(CrossingOutcome {
            test,
            observed,
            expected,
            unmatched,
            excluded,
        })
    }

    /// Crossing cell a trial falls into, `None` if it fits none (lenient only)
    fn cell_index(&self, trial: &Trial, index: usize) -> Result<Option<usize>> {
        let strict = self.config.data_policy == DataPolicy::Strict;
        let mut names = Vec::with_capacity(self.crossing.len());

        for factor in &self.crossing {
            match trial.get(factor.name()) {
                Some(value) => {
                    if strict && !factor.has_level(value) {
                        return Err(DataError::UnknownLevel {
                            trial: index,
                            factor: factor.name().to_string(),
                            value: value.clone(),
                        }
                        .into());
                    }
                    names.push(value.as_str());
                }
                None if strict => {
                    return Err(DataError::MissingValue {
                        trial: index,
                        factor: factor.name().to_string(),
                    }
                    .into())
                }
                None => return Ok(None),
            }
        }

        match self.table.index_of(&names) {
            Some(cell) => Ok(Some(cell)),
            None if strict => Err(DataError::UnmatchedTrial { trial: index }.into()),
            None => Ok(None),
        }
    }
}
