// Experiment design primitives: levels, factors and derivation windows
//
// A factorial design is declared once and never mutated:
// - Level: a named, weighted value a factor can take
// - DerivedLevel: a level whose correct use is decided by a predicate over
//   a trailing window of trials instead of being read from the data
// - Factor: an independent variable, an ordered list of levels
//
// Levels are a sum type (plain vs derived). The balance checks pattern-match
// on the variant.

mod factor;
mod level;
mod window;

pub use factor::Factor;
pub use level::{DerivedLevel, Level, PlainLevel};
pub use window::{DerivationWindow, History, Predicate, WindowKind};
