use crate::design::factor::Factor;
use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One referenced factor's values over a derivation window, oldest first
///
/// Same-trial windows hold exactly one value. Transition windows hold the
/// previous and the current trial's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct History<'a> {
    values: &'a [&'a str],
}

impl<'a> History<'a> {
    /// Wrap window values (oldest first). Returns `None` for an empty slice.
    pub fn new(values: &'a [&'a str]) -> Option<Self> {
        if values.is_empty() {
            None
        } else {
            Some(Self { values })
        }
    }

    /// Value at the newest trial in the window
    pub fn current(&self) -> &'a str {
        self.values[self.values.len() - 1]
    }

    /// Value one trial before the newest, if the window spans it
    pub fn previous(&self) -> Option<&'a str> {
        self.values.len().checked_sub(2).map(|i| self.values[i])
    }

    /// Value at the oldest trial in the window
    pub fn oldest(&self) -> &'a str {
        self.values[0]
    }

    pub fn values(&self) -> &'a [&'a str] {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True if the factor kept one value across the whole window
    pub fn is_constant(&self) -> bool {
        self.values.iter().all(|v| *v == self.current())
    }
}

type PredicateFn = dyn Fn(&[History<'_>]) -> bool + Send + Sync;

/// Caller-supplied predicate with a declared arity
///
/// The arity is checked against the window's factor count when the window
/// is built, so evaluation always receives one [`History`] per factor, in
/// the window's factor order.
///
/// # Example
/// ```
/// use sourpea::design::Predicate;
///
/// let congruent = Predicate::binary(|word, color| word.current() == color.current());
/// assert_eq!(congruent.arity(), 2);
/// ```
#[derive(Clone)]
pub struct Predicate {
    arity: usize,
    func: Arc<PredicateFn>,
}

impl Predicate {
    /// Predicate over `arity` factor histories
    pub fn new<F>(arity: usize, func: F) -> Self
    where
        F: Fn(&[History<'_>]) -> bool + Send + Sync + 'static,
    {
        Self {
            arity,
            func: Arc::new(func),
        }
    }

    pub fn unary<F>(func: F) -> Self
    where
        F: Fn(History<'_>) -> bool + Send + Sync + 'static,
    {
        Self::new(1, move |args| func(args[0]))
    }

    pub fn binary<F>(func: F) -> Self
    where
        F: Fn(History<'_>, History<'_>) -> bool + Send + Sync + 'static,
    {
        Self::new(2, move |args| func(args[0], args[1]))
    }

    pub fn ternary<F>(func: F) -> Self
    where
        F: Fn(History<'_>, History<'_>, History<'_>) -> bool + Send + Sync + 'static,
    {
        Self::new(3, move |args| func(args[0], args[1], args[2]))
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Evaluate over one history per referenced factor
    pub fn evaluate(&self, args: &[History<'_>]) -> bool {
        debug_assert_eq!(args.len(), self.arity);
        (self.func)(args)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Shape of a derivation window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    /// Width 1: the current trial only
    SameTrial,
    /// Width 2: the previous and the current trial
    Transition,
    /// Any other width
    Span,
}

/// Predicate evaluated over a fixed-width trailing window of trials
///
/// `factors` are the names of the factors whose values feed the predicate,
/// in argument order. A window of width `w` can first be evaluated at trial
/// index `w - 1`.
#[derive(Debug, Clone)]
pub struct DerivationWindow {
    predicate: Predicate,
    factors: Vec<String>,
    width: usize,
}

impl DerivationWindow {
    /// Window over the current trial only (width 1)
    pub fn same_trial(
        predicate: Predicate,
        factors: &[&Factor],
    ) -> Result<Self, ConfigurationError> {
        Self::new(predicate, factors, 1)
    }

    /// Window over the previous and the current trial (width 2)
    pub fn transition(
        predicate: Predicate,
        factors: &[&Factor],
    ) -> Result<Self, ConfigurationError> {
        Self::new(predicate, factors, 2)
    }

    /// Window of arbitrary width over the given factors
    pub fn new(
        predicate: Predicate,
        factors: &[&Factor],
        width: usize,
    ) -> Result<Self, ConfigurationError> {
        let names = factors.iter().map(|f| f.name().to_string()).collect();
        Self::from_names(predicate, names, width)
    }

    /// Window over factors referenced by name
    ///
    /// # Errors
    /// - [`ConfigurationError::InvalidWidth`] for width 0
    /// - [`ConfigurationError::EmptyWindow`] when no factor is referenced
    /// - [`ConfigurationError::ArityMismatch`] when the predicate arity differs
    ///   from the number of factors
    pub fn from_names(
        predicate: Predicate,
        factors: Vec<String>,
        width: usize,
    ) -> Result<Self, ConfigurationError> {
        if width == 0 {
            return Err(ConfigurationError::InvalidWidth);
        }
        if factors.is_empty() {
            return Err(ConfigurationError::EmptyWindow);
        }
        if predicate.arity() != factors.len() {
            return Err(ConfigurationError::ArityMismatch {
                expected: predicate.arity(),
                actual: factors.len(),
            });
        }
        Ok(Self {
            predicate,
            factors,
            width,
        })
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn factors(&self) -> &[String] {
        &self.factors
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of leading trials that lack enough history (`width - 1`)
    pub fn deficit(&self) -> usize {
        self.width - 1
    }

    pub fn kind(&self) -> WindowKind {
        match self.width {
            1 => WindowKind::SameTrial,
            2 => WindowKind::Transition,
            _ => WindowKind::Span,
        }
    }
}
