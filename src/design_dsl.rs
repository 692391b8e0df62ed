//! Design file parser
//!
//! Declares factors, levels, derived levels, the block and its balance
//! configuration in TOML, so a design can be checked without writing Rust.
//! Derived-level predicates come from a fixed vocabulary because closures
//! cannot be serialized.
//!
//! # Example design.toml
//!
//! ```toml
//! [[factor]]
//! name = "word"
//! levels = [{ name = "red", weight = 2 }, "green"]
//!
//! [[factor]]
//! name = "color"
//! levels = ["red", "green"]
//!
//! [[factor]]
//! name = "congruency"
//! levels = [
//!   { name = "congruent", window = { kind = "same_trial", factors = ["word", "color"], predicate = { type = "equal" } } },
//!   { name = "incongruent", window = { kind = "same_trial", factors = ["word", "color"], predicate = { type = "not_equal" } } },
//! ]
//!
//! [block]
//! design = ["word", "color", "congruency"]
//! crossing = ["word", "color"]
//!
//! [config]
//! significance_level = 0.05
//! data_policy = "strict"
//! ```

use crate::balance::{BalanceConfig, Block};
use crate::design::{DerivationWindow, Factor, History, Level, Predicate, WindowKind};
use crate::error::ConfigurationError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Root of a design file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DesignFile {
    /// Factors in declaration order. A window may only reference factors
    /// declared before the factor that owns it.
    #[serde(default)]
    pub factor: Vec<FactorSpec>,

    pub block: BlockSpec,

    #[serde(default)]
    pub config: BalanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactorSpec {
    pub name: String,
    pub levels: Vec<LevelSpec>,
}

/// A level: either a bare name or a table with weight and optional window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LevelSpec {
    Name(String),
    Detailed {
        name: String,
        #[serde(default = "default_weight")]
        weight: f64,
        #[serde(default)]
        window: Option<WindowSpec>,
    },
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowSpec {
    pub kind: WindowKind,

    /// Required for `span` windows, implied by the other kinds
    #[serde(default)]
    pub width: Option<usize>,

    pub factors: Vec<String>,

    pub predicate: PredicateSpec,
}

/// Built-in derivation predicates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PredicateSpec {
    /// All referenced factors currently hold the same value
    Equal,

    /// Not all referenced factors currently hold the same value
    NotEqual,

    /// Every referenced factor keeps one value across the window
    Repeat,

    /// Every referenced factor's newest value differs from its oldest
    Switch,

    /// Each referenced factor currently holds the listed value, in order
    Matches { values: Vec<String> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockSpec {
    /// Factors whose derived levels are validated
    pub design: Vec<String>,

    /// Factors whose combinations must be balanced (may be empty)
    #[serde(default)]
    pub crossing: Vec<String>,
}

fn all_equal(args: &[History<'_>]) -> bool {
    args.windows(2).all(|pair| pair[0].current() == pair[1].current())
}

impl PredicateSpec {
    /// Predicate over `arity` factors
    ///
    /// `matches` fixes its own arity to the number of listed values, so a
    /// mismatch surfaces as an arity error when the window is built.
    pub fn to_predicate(&self, arity: usize) -> Predicate {
        match self {
            PredicateSpec::Equal => Predicate::new(arity, all_equal),
            PredicateSpec::NotEqual => Predicate::new(arity, |args| !all_equal(args)),
            PredicateSpec::Repeat => {
                Predicate::new(arity, |args| args.iter().all(History::is_constant))
            }
            PredicateSpec::Switch => Predicate::new(arity, |args| {
                args.iter().all(|h| h.current() != h.oldest())
            }),
            PredicateSpec::Matches { values } => {
                let values = values.clone();
                Predicate::new(values.len(), move |args| {
                    args.iter().zip(&values).all(|(h, v)| h.current() == v)
                })
            }
        }
    }
}

impl WindowSpec {
    fn width(&self) -> Result<usize, ConfigurationError> {
        match (self.kind, self.width) {
            (WindowKind::SameTrial, None | Some(1)) => Ok(1),
            (WindowKind::Transition, None | Some(2)) => Ok(2),
            (WindowKind::Span, Some(width)) => Ok(width),
            (WindowKind::Span, None) => Err(ConfigurationError::Invalid(
                "span windows require an explicit width".to_string(),
            )),
            (kind, Some(width)) => Err(ConfigurationError::Invalid(format!(
                "{:?} window cannot have width {}",
                kind, width
            ))),
        }
    }

    fn build(
        &self,
        owner: &str,
        declared: &HashMap<String, Factor>,
    ) -> Result<DerivationWindow, ConfigurationError> {
        if let Some(unknown) = self.factors.iter().find(|f| !declared.contains_key(*f)) {
            return Err(ConfigurationError::UnknownFactor {
                factor: unknown.clone(),
                referrer: format!("a window of factor '{}'", owner),
            });
        }

        let predicate = self.predicate.to_predicate(self.factors.len());
        DerivationWindow::from_names(predicate, self.factors.clone(), self.width()?)
    }
}

impl LevelSpec {
    fn build(
        &self,
        owner: &str,
        declared: &HashMap<String, Factor>,
    ) -> Result<Level, ConfigurationError> {
        match self {
            LevelSpec::Name(name) => Ok(Level::new(name.as_str())),
            LevelSpec::Detailed {
                name,
                weight,
                window: None,
            } => Level::weighted(name.as_str(), *weight),
            LevelSpec::Detailed {
                name,
                weight,
                window: Some(window),
            } => Level::derived_weighted(name.as_str(), window.build(owner, declared)?, *weight),
        }
    }
}

impl DesignFile {
    /// Load a design from a TOML file
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sourpea::design_dsl::DesignFile;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let block = DesignFile::from_file("design.toml")?.build()?;
    /// println!("{} crossing cells", block.table().len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content)
    }

    /// Load a design from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }

    /// Build the factors, then the block, then apply the configuration
    pub fn build(&self) -> Result<Block, ConfigurationError> {
        let mut declared: HashMap<String, Factor> = HashMap::new();

        for spec in &self.factor {
            if declared.contains_key(&spec.name) {
                return Err(ConfigurationError::DuplicateFactor {
                    factor: spec.name.clone(),
                    role: "design file",
                });
            }
            let levels = spec
                .levels
                .iter()
                .map(|level| level.build(&spec.name, &declared))
                .collect::<Result<Vec<_>, _>>()?;
            let factor = Factor::new(spec.name.as_str(), levels)?;
            declared.insert(spec.name.clone(), factor);
        }

        let lookup = |names: &[String], role: &str| {
            names
                .iter()
                .map(|name| {
                    declared
                        .get(name)
                        .cloned()
                        .ok_or_else(|| ConfigurationError::UnknownFactor {
                            factor: name.clone(),
                            referrer: format!("the block {}", role),
                        })
                })
                .collect::<Result<Vec<_>, _>>()
        };

        let design = lookup(&self.block.design, "design")?;
        let crossing = lookup(&self.block.crossing, "crossing")?;

        Block::new(design, crossing)?.with_config(self.config)
    }
}
