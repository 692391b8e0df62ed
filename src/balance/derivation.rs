// Derived-level validation over sliding trial windows
//
// For every design factor with derived levels, each derived level's window
// slides over the sequence. A window of width w is first evaluated at trial
// index w - 1 and covers trials [i - w + 1, i], oldest first. When the
// predicate fires, the newest trial's value for the owning factor must be the
// derived level's name.
//
// The per-factor verdict is a fold over all evaluations starting at `true`
// and ANDed with each check. Every firing is evaluated, so the failing trial
// indices are reported in full.

use crate::balance::config::DataPolicy;
use crate::design::{DerivationWindow, DerivedLevel, Factor, History};
use crate::error::DataError;
use crate::sequence::Trial;
use serde::{Deserialize, Serialize};

/// Outcome of validating one design factor's derived levels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationCheck {
    /// Design factor name
    pub factor: String,

    /// True if every fired predicate matched (vacuously true if none fired)
    pub valid: bool,

    /// Number of times a derived level's predicate fired
    pub firings: usize,

    /// Trial indices where a fired predicate disagreed with the data, ascending
    pub failures: Vec<usize>,
}

impl DerivationCheck {
    fn vacuous(factor: &Factor) -> Self {
        Self {
            factor: factor.name().to_string(),
            valid: true,
            firings: 0,
            failures: Vec::new(),
        }
    }
}

/// Validate every design factor's derived levels against a trial sequence
///
/// Returns one check per design factor, in design order. Factors without
/// derived levels are vacuously valid.
///
/// # Errors
/// Only under [`DataPolicy::Strict`]: a referenced factor value is missing, or
/// the owning factor's value is not one of its levels.
pub fn validate_derivations(
    design: &[Factor],
    sequence: &[Trial],
    policy: DataPolicy,
) -> Result<Vec<DerivationCheck>, DataError> {
    design
        .iter()
        .map(|factor| validate_factor(factor, sequence, policy))
        .collect()
}

fn validate_factor(
    factor: &Factor,
    sequence: &[Trial],
    policy: DataPolicy,
) -> Result<DerivationCheck, DataError> {
    let mut check = DerivationCheck::vacuous(factor);

    for level in factor.derived_levels() {
        let window = level.window();
        for index in window.deficit()..sequence.len() {
            let Some(fired) = evaluate_window(window, sequence, index, policy)? else {
                continue;
            };
            if !fired {
                continue;
            }

            check.firings += 1;
            let matched = owner_matches(factor, level, &sequence[index], index, policy)?;
            tracing::trace!(
                factor = factor.name(),
                level = level.name(),
                trial = index,
                matched,
                "derivation window fired"
            );

            check.valid &= matched;
            if !matched {
                check.failures.push(index);
            }
        }
    }

    check.failures.sort_unstable();
    check.failures.dedup();

    if !check.valid {
        tracing::debug!(
            factor = factor.name(),
            failures = check.failures.len(),
            "derived level mismatches"
        );
    }

    Ok(check)
}

/// Evaluate `window` ending at trial `index`
///
/// Returns `None` when the window cannot be evaluated because a referenced
/// factor has no value (lenient policy only).
fn evaluate_window(
    window: &DerivationWindow,
    sequence: &[Trial],
    index: usize,
    policy: DataPolicy,
) -> Result<Option<bool>, DataError> {
    let start = index + 1 - window.width();
    let span = &sequence[start..=index];

    let mut columns: Vec<Vec<&str>> = Vec::with_capacity(window.factors().len());
    for name in window.factors() {
        let mut column = Vec::with_capacity(span.len());
        for (offset, trial) in span.iter().enumerate() {
            match trial.get(name) {
                Some(value) => column.push(value.as_str()),
                None => match policy {
                    DataPolicy::Strict => {
                        return Err(DataError::MissingValue {
                            trial: start + offset,
                            factor: name.clone(),
                        })
                    }
                    DataPolicy::Lenient => return Ok(None),
                },
            }
        }
        columns.push(column);
    }

    let histories: Vec<History<'_>> = columns
        .iter()
        .filter_map(|column| History::new(column))
        .collect();

    Ok(Some(window.predicate().evaluate(&histories)))
}

fn owner_matches(
    factor: &Factor,
    level: &DerivedLevel,
    trial: &Trial,
    index: usize,
    policy: DataPolicy,
) -> Result<bool, DataError> {
    match (trial.get(factor.name()), policy) {
        (Some(value), DataPolicy::Strict) if !factor.has_level(value) => {
            Err(DataError::UnknownLevel {
                trial: index,
                factor: factor.name().to_string(),
                value: value.clone(),
            })
        }
        (Some(value), _) => Ok(value == level.name()),
        (None, DataPolicy::Strict) => Err(DataError::MissingValue {
            trial: index,
            factor: factor.name().to_string(),
        }),
        (None, DataPolicy::Lenient) => {
            tracing::warn!(
                factor = factor.name(),
                trial = index,
                "derived level fired but trial has no value for its factor"
            );
            Ok(false)
        }
    }
}
