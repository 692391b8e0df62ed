//! Trial sequences: the ordered observations a block is tested against
//!
//! A trial maps factor names to level names. Sequences are usually loaded
//! from a JSON array of objects:
//!
//! ```json
//! [
//!   {"word": "red", "color": "red"},
//!   {"word": "green", "color": "red"}
//! ]
//! ```
//!
//! Numbers and booleans are read as their textual form; `null` leaves the
//! factor without a value for that trial (as happens for transition factors
//! on the first trial).

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// One trial: factor name -> level name
pub type Trial = HashMap<String, String>;

/// Build a trial from `(factor, level)` pairs
///
/// # Example
/// ```
/// use sourpea::sequence::trial;
///
/// let t = trial([("word", "red"), ("color", "green")]);
/// assert_eq!(t.get("color").map(String::as_str), Some("green"));
/// ```
pub fn trial<I, K, V>(pairs: I) -> Trial
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Parse a trial sequence from JSON text
pub fn parse_sequence(content: &str) -> Result<Vec<Trial>> {
    let raw: Vec<HashMap<String, Value>> =
        serde_json::from_str(content).context("Failed to parse trial sequence JSON")?;

    raw.into_iter()
        .enumerate()
        .map(|(index, record)| {
            let mut trial = Trial::with_capacity(record.len());
            for (factor, value) in record {
                match value {
                    Value::Null => {}
                    Value::String(s) => {
                        trial.insert(factor, s);
                    }
                    Value::Number(n) => {
                        trial.insert(factor, n.to_string());
                    }
                    Value::Bool(b) => {
                        trial.insert(factor, b.to_string());
                    }
                    Value::Array(_) | Value::Object(_) => {
                        anyhow::bail!(
                            "Trial {}: value for '{}' must be a scalar, got {}",
                            index,
                            factor,
                            value
                        );
                    }
                }
            }
            Ok(trial)
        })
        .collect()
}

/// Load a trial sequence from a JSON file
pub fn load_sequence<P: AsRef<Path>>(path: P) -> Result<Vec<Trial>> {
    let path = path.as_ref();
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    parse_sequence(&content).with_context(|| format!("Invalid trial sequence in {}", path.display()))
}
