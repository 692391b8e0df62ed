//! Sourpea - counterbalancing validation for factorial experiment designs
//!
//! This library checks whether an observed sequence of trials matches the
//! expected distribution of factor-level combinations, including levels
//! derived from trial history through sliding-window predicates.

pub mod balance;
pub mod cli;
pub mod design;
pub mod design_dsl;
pub mod error;
pub mod sequence;

pub use error::{ConfigurationError, DataError, Error, Result, StatisticalError};
