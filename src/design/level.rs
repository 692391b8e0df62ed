use crate::design::window::DerivationWindow;
use crate::error::ConfigurationError;

/// A level read directly from trial data
#[derive(Debug, Clone, PartialEq)]
pub struct PlainLevel {
    name: String,
    weight: f64,
}

/// A level whose correct placement is computed from trial history
///
/// During validation the window's predicate is evaluated over the trial
/// sequence; whenever it fires, the trial's value for the owning factor
/// must be this level's name.
#[derive(Debug, Clone)]
pub struct DerivedLevel {
    name: String,
    weight: f64,
    window: DerivationWindow,
}

impl DerivedLevel {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn window(&self) -> &DerivationWindow {
        &self.window
    }
}

/// One admissible value of a [`Factor`](crate::design::Factor)
///
/// Plain strings convert into unit-weight plain levels, so factors can be
/// declared as `Factor::new("color", ["red", "green"])`.
///
/// # Example
/// ```
/// use sourpea::design::Level;
///
/// let red = Level::weighted("red", 2.0).unwrap();
/// assert_eq!(red.name(), "red");
/// assert_eq!(red.weight(), 2.0);
///
/// let green: Level = "green".into();
/// assert_eq!(green.weight(), 1.0);
/// assert!(Level::weighted("blue", 0.0).is_err());
/// ```
#[derive(Debug, Clone)]
pub enum Level {
    Plain(PlainLevel),
    Derived(DerivedLevel),
}

fn check_weight(name: &str, weight: f64) -> Result<f64, ConfigurationError> {
    if weight.is_finite() && weight > 0.0 {
        Ok(weight)
    } else {
        Err(ConfigurationError::InvalidWeight {
            level: name.to_string(),
            weight,
        })
    }
}

impl Level {
    /// Plain level with weight 1
    pub fn new(name: impl Into<String>) -> Self {
        Level::Plain(PlainLevel {
            name: name.into(),
            weight: 1.0,
        })
    }

    /// Plain level with an explicit weight (finite, strictly positive)
    pub fn weighted(name: impl Into<String>, weight: f64) -> Result<Self, ConfigurationError> {
        let name = name.into();
        let weight = check_weight(&name, weight)?;
        Ok(Level::Plain(PlainLevel { name, weight }))
    }

    /// Derived level with weight 1
    pub fn derived(name: impl Into<String>, window: DerivationWindow) -> Self {
        Level::Derived(DerivedLevel {
            name: name.into(),
            weight: 1.0,
            window,
        })
    }

    /// Derived level with an explicit weight (finite, strictly positive)
    pub fn derived_weighted(
        name: impl Into<String>,
        window: DerivationWindow,
        weight: f64,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        let weight = check_weight(&name, weight)?;
        Ok(Level::Derived(DerivedLevel {
            name,
            weight,
            window,
        }))
    }

    pub fn name(&self) -> &str {
        match self {
            Level::Plain(level) => &level.name,
            Level::Derived(level) => &level.name,
        }
    }

    pub fn weight(&self) -> f64 {
        match self {
            Level::Plain(level) => level.weight,
            Level::Derived(level) => level.weight,
        }
    }

    /// The derivation window, for derived levels only
    pub fn window(&self) -> Option<&DerivationWindow> {
        match self {
            Level::Plain(_) => None,
            Level::Derived(level) => Some(&level.window),
        }
    }

    pub fn is_derived(&self) -> bool {
        matches!(self, Level::Derived(_))
    }

    /// Trials of history this level needs before it can be derived (`width - 1`)
    pub fn deficit(&self) -> usize {
        self.window().map_or(0, DerivationWindow::deficit)
    }
}

impl From<&str> for Level {
    fn from(name: &str) -> Self {
        Level::new(name)
    }
}

impl From<String> for Level {
    fn from(name: String) -> Self {
        Level::new(name)
    }
}

impl From<DerivedLevel> for Level {
    fn from(level: DerivedLevel) -> Self {
        Level::Derived(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{Factor, Predicate};

    fn color() -> Factor {
        Factor::new("color", ["red", "green"]).unwrap()
    }

    #[test]
    fn test_plain_level_defaults_to_unit_weight() {
        let level = Level::new("red");
        assert_eq!(level.name(), "red");
        assert_eq!(level.weight(), 1.0);
        assert!(!level.is_derived());
        assert!(level.window().is_none());
        assert_eq!(level.deficit(), 0);
    }

    #[test]
    fn test_weighted_level_rejects_bad_weights() {
        assert!(Level::weighted("a", 0.0).is_err());
        assert!(Level::weighted("a", -1.0).is_err());
        assert!(Level::weighted("a", f64::NAN).is_err());
        assert!(Level::weighted("a", f64::INFINITY).is_err());
        assert_eq!(Level::weighted("a", 0.5).unwrap().weight(), 0.5);
    }

    #[test]
    fn test_invalid_weight_names_level() {
        match Level::weighted("fast", -2.0) {
            Err(ConfigurationError::InvalidWeight { level, weight }) => {
                assert_eq!(level, "fast");
                assert_eq!(weight, -2.0);
            }
            other => panic!("Expected InvalidWeight, got {:?}", other),
        }
    }

    #[test]
    fn test_derived_level_exposes_window() {
        let color = color();
        let window =
            DerivationWindow::transition(Predicate::unary(|c| c.is_constant()), &[&color])
                .unwrap();
        let level = Level::derived("repeat", window);

        assert!(level.is_derived());
        assert_eq!(level.name(), "repeat");
        assert_eq!(level.weight(), 1.0);
        assert_eq!(level.window().map(DerivationWindow::width), Some(2));
        assert_eq!(level.deficit(), 1);
    }

    #[test]
    fn test_derived_weighted_validates() {
        let color = color();
        let window =
            DerivationWindow::same_trial(Predicate::unary(|c| c.current() == "red"), &[&color])
                .unwrap();
        assert!(Level::derived_weighted("is_red", window.clone(), 0.0).is_err());
        let level = Level::derived_weighted("is_red", window, 3.0).unwrap();
        assert_eq!(level.weight(), 3.0);
    }

    #[test]
    fn test_string_conversions() {
        let a: Level = "a".into();
        let b: Level = String::from("b").into();
        assert_eq!(a.name(), "a");
        assert_eq!(b.name(), "b");
    }
}
