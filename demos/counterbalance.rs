//! Counterbalancing walkthrough
//!
//! Tests a handful of word x color sequences against plain and weighted
//! designs, cross-validates them against the wrong design, then checks a
//! derived congruency level.
//!
//! ```bash
//! cargo run --example counterbalance
//! ```

use anyhow::Result;
use sourpea::balance::Block;
use sourpea::design::{DerivationWindow, Factor, Level, Predicate};
use sourpea::sequence::{trial, Trial};

fn sequence(rows: &[(&str, &str)]) -> Vec<Trial> {
    rows.iter()
        .map(|(word, color)| trial([("word", *word), ("color", *color)]))
        .collect()
}

fn main() -> Result<()> {
    // Plain 2 x 2 crossing
    let sequence_1 = sequence(&[
        ("red", "red"),
        ("green", "red"),
        ("red", "green"),
        ("green", "green"),
    ]);
    let word = Factor::new("word", ["red", "green"])?;
    let color = Factor::new("color", ["red", "green"])?;
    let design_1 = Block::crossed(vec![word, color])?;
    println!(
        "sequence 1, design 1: p = {:.4}",
        design_1.test(&sequence_1)?.p_value
    );

    // "red" words twice as often
    let sequence_2 = sequence(&[
        ("red", "red"),
        ("green", "red"),
        ("red", "red"),
        ("green", "green"),
        ("red", "green"),
        ("red", "green"),
    ]);
    let word = Factor::new("word", [Level::weighted("red", 2.0)?, "green".into()])?;
    let color = Factor::new("color", ["red", "green"])?;
    let design_2 = Block::crossed(vec![color, word])?;
    println!(
        "sequence 2, design 2: p = {:.4}",
        design_2.test(&sequence_2)?.p_value
    );

    // Both factors weighted
    let mut rows = vec![("red", "green"); 6];
    rows.extend([("red", "red"); 4]);
    rows.extend([("green", "green"); 3]);
    rows.extend([("green", "red"); 2]);
    let word = Factor::new(
        "word",
        [Level::weighted("red", 2.0)?, Level::weighted("green", 1.0)?],
    )?;
    let color = Factor::new(
        "color",
        [Level::weighted("red", 2.0)?, Level::weighted("green", 3.0)?],
    )?;
    let design_3 = Block::crossed(vec![word, color])?;
    println!(
        "sequence 3, design 3: p = {:.4}",
        design_3.test(&sequence(&rows))?.p_value
    );

    // Cross-validation: each sequence against the other design
    println!(
        "sequence 2, design 1: p = {:.4} (not balanced)",
        design_1.test(&sequence_2)?.p_value
    );
    println!(
        "sequence 1, design 2: p = {:.4} (not balanced)",
        design_2.test(&sequence_1)?.p_value
    );

    // Derived congruency level
    let word = Factor::new("word", ["red", "green"])?;
    let color = Factor::new("color", ["red", "green"])?;
    let congruent = DerivationWindow::same_trial(
        Predicate::binary(|w, c| w.current() == c.current()),
        &[&word, &color],
    )?;
    let incongruent = DerivationWindow::same_trial(
        Predicate::binary(|w, c| w.current() != c.current()),
        &[&word, &color],
    )?;
    let congruency = Factor::new(
        "congruency",
        [
            Level::derived("congruent", congruent),
            Level::derived("incongruent", incongruent),
        ],
    )?;
    let block = Block::new(
        vec![word.clone(), color.clone(), congruency],
        vec![word, color],
    )?;

    let labelled: Vec<Trial> = [
        ("red", "red", "congruent"),
        ("green", "red", "incongruent"),
        ("red", "green", "incongruent"),
        ("green", "green", "incongruent"),
    ]
    .iter()
    .map(|(w, c, k)| trial([("word", *w), ("color", *c), ("congruency", *k)]))
    .collect();

    print!("\n{}", block.test(&labelled)?.to_report_string());

    Ok(())
}
