// Scenario tests for counterbalancing checks
//
// Realistic Stroop-style designs: word and ink color factors, a congruency
// factor derived within a trial, and a color transition factor derived
// across consecutive trials.

use super::*;
use crate::design::{DerivationWindow, Factor, Level, Predicate};
use crate::error::{DataError, Error, StatisticalError};
use crate::sequence::{trial, Trial};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn pairs(rows: &[(&str, &str)]) -> Vec<Trial> {
    rows.iter()
        .map(|(word, color)| trial([("word", *word), ("color", *color)]))
        .collect()
}

fn sequence_1() -> Vec<Trial> {
    pairs(&[
        ("red", "red"),
        ("green", "red"),
        ("red", "green"),
        ("green", "green"),
    ])
}

fn sequence_2() -> Vec<Trial> {
    pairs(&[
        ("red", "red"),
        ("green", "red"),
        ("red", "red"),
        ("green", "green"),
        ("red", "green"),
        ("red", "green"),
    ])
}

fn word() -> Factor {
    Factor::new("word", ["red", "green"]).unwrap()
}

fn color() -> Factor {
    Factor::new("color", ["red", "green"]).unwrap()
}

fn weighted_word() -> Factor {
    Factor::new("word", [Level::weighted("red", 2.0).unwrap(), "green".into()]).unwrap()
}

fn congruency(word: &Factor, color: &Factor) -> Factor {
    let same = DerivationWindow::same_trial(
        Predicate::binary(|w, c| w.current() == c.current()),
        &[word, color],
    )
    .unwrap();
    let different = DerivationWindow::same_trial(
        Predicate::binary(|w, c| w.current() != c.current()),
        &[word, color],
    )
    .unwrap();
    Factor::new(
        "congruency",
        [Level::derived("congruent", same), Level::derived("incongruent", different)],
    )
    .unwrap()
}

fn color_transition(color: &Factor) -> Factor {
    let repeat =
        DerivationWindow::transition(Predicate::unary(|c| c.is_constant()), &[color]).unwrap();
    let switch =
        DerivationWindow::transition(Predicate::unary(|c| !c.is_constant()), &[color]).unwrap();
    Factor::new(
        "transition",
        [Level::derived("repeat", repeat), Level::derived("switch", switch)],
    )
    .unwrap()
}

/// Crossing completeness: A x B yields the four ordered pairs with unit weights
#[test]
fn test_crossing_completeness() {
    let a = Factor::new("A", ["a1", "a2"]).unwrap();
    let b = Factor::new("B", ["b1", "b2"]).unwrap();
    let block = Block::crossed(vec![a, b]).unwrap();

    let cells: Vec<(Vec<String>, f64)> = block
        .table()
        .cells()
        .iter()
        .map(|c| (c.names.clone(), c.weight))
        .collect();
    let pairs = [("a1", "b1"), ("a1", "b2"), ("a2", "b1"), ("a2", "b2")];
    let expected: Vec<(Vec<String>, f64)> = pairs
        .iter()
        .map(|(x, y)| (vec![x.to_string(), y.to_string()], 1.0))
        .collect();
    assert_eq!(cells, expected);
}

/// Fully crossed sequence against an unweighted design
#[test]
fn test_balanced_sequence_unweighted() {
    let block = Block::crossed(vec![word(), color()]).unwrap();
    let report = block.test(&sequence_1()).unwrap();

    assert_eq!(report.observed, vec![1, 1, 1, 1]);
    assert!((report.p_value - 1.0).abs() < 1e-12);
    assert!(report.is_balanced());
    assert_eq!(report.levels.get("word"), Some(&true));
    assert_eq!(report.levels.get("color"), Some(&true));
}

/// Weighted balance: word red counts double
#[test]
fn test_weighted_balance() {
    let block = Block::crossed(vec![weighted_word(), color()]).unwrap();
    let report = block.test(&sequence_2()).unwrap();

    // (red,red) (red,green) (green,red) (green,green)
    assert_eq!(report.observed, vec![2, 2, 1, 1]);
    assert_eq!(report.expected, vec![2.0, 2.0, 1.0, 1.0]);
    assert!(report.p_value > 0.999, "p-value {}", report.p_value);
}

/// Crossing order only permutes cells; the verdict is unchanged
#[test]
fn test_weighted_balance_reversed_crossing() {
    let block = Block::crossed(vec![color(), weighted_word()]).unwrap();
    let report = block.test(&sequence_2()).unwrap();

    // (color, word): (red,red) (red,green) (green,red) (green,green)
    assert_eq!(report.observed, vec![2, 1, 2, 1]);
    assert_eq!(report.expected, vec![2.0, 1.0, 2.0, 1.0]);
    assert!(report.p_value > 0.999);
}

/// Both factors weighted, 15 trials in exact proportion
#[test]
fn test_doubly_weighted_balance() {
    let word = Factor::new(
        "word",
        [Level::weighted("red", 2.0).unwrap(), Level::weighted("green", 1.0).unwrap()],
    )
    .unwrap();
    let color = Factor::new(
        "color",
        [Level::weighted("red", 2.0).unwrap(), Level::weighted("green", 3.0).unwrap()],
    )
    .unwrap();
    let mut rows = vec![("red", "green"); 6];
    rows.extend(vec![("red", "red"); 4]);
    rows.extend(vec![("green", "green"); 3]);
    rows.extend(vec![("green", "red"); 2]);

    let report = Block::crossed(vec![word, color])
        .unwrap()
        .test(&pairs(&rows))
        .unwrap();

    assert_eq!(report.observed, vec![4, 6, 2, 3]);
    assert!(report.p_value > 0.999);
}

/// Imbalance detection: mismatched weights lower the p-value
#[test]
fn test_cross_validation_lowers_p_value() {
    let unweighted = Block::crossed(vec![word(), color()]).unwrap();
    let weighted = Block::crossed(vec![color(), weighted_word()]).unwrap();

    let balanced = weighted.test(&sequence_2()).unwrap().p_value;
    let skewed = unweighted.test(&sequence_2()).unwrap().p_value;
    assert!(skewed < balanced, "{} should be < {}", skewed, balanced);

    let balanced = unweighted.test(&sequence_1()).unwrap().p_value;
    let skewed = weighted.test(&sequence_1()).unwrap().p_value;
    assert!(skewed < balanced, "{} should be < {}", skewed, balanced);
}

#[test]
fn test_gross_imbalance_is_not_balanced() {
    let block = Block::crossed(vec![word(), color()]).unwrap();
    let report = block.test(&pairs(&[("red", "red"); 40])).unwrap();
    assert!(!report.is_balanced());
    assert!(!report.passed());
}

/// Derived-level sticky AND: one mismatch among five firings fails the factor
#[test]
fn test_sticky_and_over_firings() {
    let (w, c) = (word(), color());
    let congruency = congruency(&w, &c);
    let block = Block::design_only(vec![w, c, congruency]).unwrap();

    let labelled = |word: &str, color: &str, label: &str| {
        trial([("word", word), ("color", color), ("congruency", label)])
    };
    let mut sequence = vec![
        labelled("red", "red", "congruent"),
        labelled("green", "green", "congruent"),
        labelled("red", "red", "congruent"),
        labelled("green", "green", "congruent"),
        labelled("red", "red", "congruent"),
    ];
    let report = block.test(&sequence).unwrap();
    assert_eq!(report.levels.get("congruency"), Some(&true));

    sequence[3] = labelled("green", "green", "incongruent");
    let report = block.test(&sequence).unwrap();
    assert_eq!(report.levels.get("congruency"), Some(&false));
    assert_eq!(report.derivation_failures.get("congruency"), Some(&vec![3]));
    // plain factors are vacuously valid
    assert_eq!(report.levels.get("word"), Some(&true));
}

/// Transition window boundary: trial 0 never reaches the predicate
#[test]
fn test_transition_window_boundary() {
    let c = color();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let window = DerivationWindow::transition(
        Predicate::unary(move |history| {
            seen.fetch_add(1, Ordering::SeqCst);
            assert_eq!(history.len(), 2);
            false
        }),
        &[&c],
    )
    .unwrap();
    let probe = Factor::new("probe", [Level::derived("never", window), Level::new("other")])
        .unwrap();
    let block = Block::design_only(vec![probe]).unwrap();

    let sequence: Vec<Trial> = ["red", "green", "red"]
        .iter()
        .map(|c| trial([("color", *c)]))
        .collect();
    block.test(&sequence).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    calls.store(0, Ordering::SeqCst);
    block.test(&sequence[..1]).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

/// Empty crossing: fixed non-significant p-value, derivations still checked
#[test]
fn test_empty_crossing_degeneracy() {
    let (w, c) = (word(), color());
    let congruency = congruency(&w, &c);
    let block = Block::design_only(vec![congruency]).unwrap();

    let sequence = vec![trial([
        ("word", "red"),
        ("color", "red"),
        ("congruency", "incongruent"),
    ])];
    let report = block.test(&sequence).unwrap();

    assert!((report.p_value - 1.0).abs() < 1e-12);
    assert!(report.is_balanced());
    assert!(report.observed.is_empty());
    assert_eq!(report.levels.get("congruency"), Some(&false));

    // holds even for an empty sequence
    let report = block.test(&[]).unwrap();
    assert!((report.p_value - 1.0).abs() < 1e-12);
    assert_eq!(report.levels.get("congruency"), Some(&true));
}

#[test]
fn test_idempotence() {
    let (w, c) = (word(), color());
    let transition = color_transition(&c);
    let block = Block::new(
        vec![w.clone(), c.clone(), transition.clone()],
        vec![w, transition],
    )
    .unwrap();

    let sequence = vec![
        trial([("word", "red"), ("color", "red")]),
        trial([("word", "green"), ("color", "red"), ("transition", "repeat")]),
        trial([("word", "red"), ("color", "green"), ("transition", "switch")]),
        trial([("word", "green"), ("color", "red"), ("transition", "repeat")]),
    ];
    let first = block.test(&sequence).unwrap();
    let second = block.test(&sequence).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.p_value.to_bits(), second.p_value.to_bits());
}

/// Transition factors in the crossing drop the first trial and renormalize
#[test]
fn test_transition_crossing_renormalizes_expected() {
    let c = color();
    let transition = color_transition(&c);
    let block = Block::new(vec![c, transition.clone()], vec![transition]).unwrap();

    let colors = ["red", "red", "green", "green", "red", "red", "green"];
    let labels = [
        None,
        Some("repeat"),
        Some("switch"),
        Some("repeat"),
        Some("switch"),
        Some("repeat"),
        Some("switch"),
    ];
    let sequence: Vec<Trial> = colors
        .iter()
        .zip(labels)
        .map(|(color, label)| {
            let mut t = trial([("color", *color)]);
            if let Some(label) = label {
                t.insert("transition".to_string(), label.to_string());
            }
            t
        })
        .collect();

    let report = block.test(&sequence).unwrap();
    assert_eq!(report.excluded_trials, 1);
    assert_eq!(report.observed, vec![3, 3]);
    for e in &report.expected {
        assert!((e - 7.0 / 3.0).abs() < 1e-12);
    }
    assert!(report.unmatched_trials.is_empty());
    assert_eq!(report.levels.get("transition"), Some(&true));
    assert!(report.is_balanced());
}

#[test]
fn test_lenient_unmatched_trials_are_reported() {
    let block = Block::crossed(vec![word(), color()]).unwrap();
    let mut sequence = sequence_1();
    sequence.push(trial([("word", "blue"), ("color", "red")]));
    sequence.push(trial([("word", "red")]));

    let report = block.test(&sequence).unwrap();
    assert_eq!(report.observed, vec![1, 1, 1, 1]);
    assert_eq!(report.unmatched_trials, vec![4, 5]);
    // expected mass still spans all six trials
    assert_eq!(report.expected, vec![1.5; 4]);
}

#[test]
fn test_strict_rejects_unknown_level() {
    let block = Block::crossed(vec![word(), color()])
        .unwrap()
        .with_config(BalanceConfig::strict())
        .unwrap();
    let mut sequence = sequence_1();
    sequence.push(trial([("word", "blue"), ("color", "red")]));

    let err = block.test(&sequence).unwrap_err();
    assert_eq!(
        err,
        Error::Data(DataError::UnknownLevel {
            trial: 4,
            factor: "word".to_string(),
            value: "blue".to_string()
        })
    );
}

#[test]
fn test_strict_rejects_missing_value() {
    let block = Block::crossed(vec![word(), color()])
        .unwrap()
        .with_config(BalanceConfig::strict())
        .unwrap();
    let err = block.test(&[trial([("word", "red")])]).unwrap_err();
    assert!(matches!(
        err,
        Error::Data(DataError::MissingValue { trial: 0, .. })
    ));
}

#[test]
fn test_empty_sequence_is_statistical_error() {
    let block = Block::crossed(vec![word(), color()]).unwrap();
    let err = block.test(&[]).unwrap_err();
    assert_eq!(err, Error::Statistical(StatisticalError::ZeroExpectedMass));
}

#[test]
fn test_single_cell_crossing_is_statistical_error() {
    let only = Factor::new("only", ["x"]).unwrap();
    let block = Block::crossed(vec![only]).unwrap();
    let err = block.test(&[trial([("only", "x")])]).unwrap_err();
    assert_eq!(err, Error::Statistical(StatisticalError::TooFewCategories(1)));
}

#[test]
fn test_duplicate_factor_rejected() {
    let err = Block::crossed(vec![word(), word()]).unwrap_err();
    assert!(matches!(
        err,
        crate::error::ConfigurationError::DuplicateFactor { role: "design", .. }
    ));
}

#[test]
fn test_invalid_config_rejected() {
    let config = BalanceConfig {
        significance_level: 2.0,
        ..BalanceConfig::default()
    };
    assert!(Block::crossed(vec![word()]).unwrap().with_config(config).is_err());
}

#[test]
fn test_significance_level_drives_verdict() {
    let sequence = pairs(&[
        ("red", "red"),
        ("red", "red"),
        ("red", "red"),
        ("red", "green"),
        ("green", "red"),
        ("green", "green"),
    ]);
    let lenient = Block::crossed(vec![word(), color()]).unwrap();
    let report = lenient.test(&sequence).unwrap();
    let p = report.p_value;

    let strict_alpha = Block::crossed(vec![word(), color()])
        .unwrap()
        .with_config(BalanceConfig {
            significance_level: (p + 1.0) / 2.0,
            ..BalanceConfig::default()
        })
        .unwrap();
    assert!(report.is_balanced());
    assert!(!strict_alpha.test(&sequence).unwrap().is_balanced());
}

#[test]
fn test_block_is_shareable_across_threads() {
    let (w, c) = (word(), color());
    let congruency = congruency(&w, &c);
    let block = Block::new(vec![w.clone(), c.clone(), congruency], vec![w, c]).unwrap();
    let sequence = sequence_1();
    let reference = block.test(&sequence).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| block.test(&sequence).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), reference);
        }
    });
}
