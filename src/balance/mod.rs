// Counterbalancing checks for factorial experiment designs
//
// A Block pairs a design (factors whose derived levels are validated) with a
// crossing (factors whose full combinatorial product must be balanced).
// Testing a trial sequence runs two independent checks:
//
// 1. Crossing goodness-of-fit: empirical counts of every crossing
//    combination against weight-proportional expected counts, via Pearson's
//    chi-square test (statrs for the survival function).
// 2. Derivation validation: every time a derived level's window predicate
//    fires, the trial must carry that derived level. Failures are sticky.
//
// Scientific Foundation:
// [1] Pearson, K. (1900). On the criterion that a given system of deviations
//     from the probable in the case of a correlated system of variables is
//     such that it can be reasonably supposed to have arisen from random
//     sampling. Philosophical Magazine.

mod block;
mod config;
mod crossing;
mod derivation;
mod report;
mod statistics;

pub use block::Block;
pub use config::{BalanceConfig, DataPolicy};
pub use crossing::{cartesian_product, CrossingCell, CrossingTable};
pub use derivation::{validate_derivations, DerivationCheck};
pub use report::BalanceReport;
pub use statistics::{chi_square_goodness_of_fit, ChiSquareTest};

#[cfg(test)]
mod tests;
