//! Error types for design construction and balance testing
//!
//! Three families, matching when they can occur:
//! - [`ConfigurationError`]: malformed factors, levels or windows, raised at
//!   construction time
//! - [`DataError`]: problems in a trial sequence, raised from `Block::test`
//!   only under [`DataPolicy::Strict`](crate::balance::DataPolicy::Strict)
//! - [`StatisticalError`]: violated preconditions of the goodness-of-fit test

use thiserror::Error;

/// Caller misuse detected while building factors, levels, windows or blocks
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Factor '{factor}' has no levels")]
    EmptyFactor { factor: String },

    #[error("{what} name must not be empty")]
    EmptyName { what: &'static str },

    #[error("Level '{level}' has invalid weight {weight} (must be finite and > 0)")]
    InvalidWeight { level: String, weight: f64 },

    #[error("Factor '{factor}' declares level '{level}' more than once")]
    DuplicateLevel { factor: String, level: String },

    #[error("Factor '{factor}' appears more than once in the {role}")]
    DuplicateFactor { factor: String, role: &'static str },

    #[error("Predicate takes {expected} argument(s) but the window references {actual} factor(s)")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("Window width must be at least 1")]
    InvalidWidth,

    #[error("Derivation window must reference at least one factor")]
    EmptyWindow,

    #[error("Unknown factor '{factor}' referenced by {referrer}")]
    UnknownFactor { factor: String, referrer: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// A trial sequence that does not fit the declared design
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    #[error("Trial {trial} has no value for factor '{factor}'")]
    MissingValue { trial: usize, factor: String },

    #[error("Trial {trial} has value '{value}' for factor '{factor}', which is not one of its levels")]
    UnknownLevel {
        trial: usize,
        factor: String,
        value: String,
    },

    #[error("Trial {trial} matches no crossing combination")]
    UnmatchedTrial { trial: usize },
}

/// Preconditions of the chi-square goodness-of-fit test
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatisticalError {
    #[error("Expected count at index {index} is {value} (must be > 0)")]
    NonPositiveExpected { index: usize, value: f64 },

    #[error("Expected counts sum to zero")]
    ZeroExpectedMass,

    #[error("Observed has {observed} categories but expected has {expected}")]
    LengthMismatch { observed: usize, expected: usize },

    #[error("Goodness-of-fit needs at least 2 categories, got {0}")]
    TooFewCategories(usize),

    #[error("Chi-square distribution failed: {0}")]
    Distribution(String),
}

/// Any error produced by this crate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Statistical(#[from] StatisticalError),
}

pub type Result<T> = std::result::Result<T, Error>;
