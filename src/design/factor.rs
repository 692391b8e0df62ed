use crate::design::level::{DerivedLevel, Level};
use crate::error::ConfigurationError;
use std::collections::HashSet;

/// An independent variable: a name and an ordered, non-empty list of levels
///
/// # Example
/// ```
/// use sourpea::design::{Factor, Level};
///
/// let word = Factor::new("word", [Level::weighted("red", 2.0).unwrap(), "green".into()]).unwrap();
/// assert_eq!(word.level_names(), vec!["red", "green"]);
/// assert!(Factor::new("empty", Vec::<Level>::new()).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Factor {
    name: String,
    levels: Vec<Level>,
}

impl Factor {
    /// Build a factor from levels or level names
    ///
    /// # Errors
    /// Empty factor or level names, no levels, or a level name declared twice.
    pub fn new<I, L>(name: impl Into<String>, levels: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = L>,
        L: Into<Level>,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(ConfigurationError::EmptyName { what: "Factor" });
        }

        let levels: Vec<Level> = levels.into_iter().map(Into::into).collect();
        if levels.is_empty() {
            return Err(ConfigurationError::EmptyFactor { factor: name });
        }

        let mut seen = HashSet::new();
        for level in &levels {
            if level.name().is_empty() {
                return Err(ConfigurationError::EmptyName { what: "Level" });
            }
            if !seen.insert(level.name()) {
                return Err(ConfigurationError::DuplicateLevel {
                    factor: name.clone(),
                    level: level.name().to_string(),
                });
            }
        }

        Ok(Self { name, levels })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn level_names(&self) -> Vec<&str> {
        self.levels.iter().map(Level::name).collect()
    }

    pub fn level(&self, name: &str) -> Option<&Level> {
        self.levels.iter().find(|l| l.name() == name)
    }

    pub fn has_level(&self, name: &str) -> bool {
        self.level(name).is_some()
    }

    pub fn derived_levels(&self) -> impl Iterator<Item = &DerivedLevel> {
        self.levels.iter().filter_map(|level| match level {
            Level::Derived(derived) => Some(derived),
            Level::Plain(_) => None,
        })
    }

    pub fn has_derived_levels(&self) -> bool {
        self.levels.iter().any(Level::is_derived)
    }

    /// Largest history deficit among this factor's derived levels (0 if none)
    pub fn max_deficit(&self) -> usize {
        self.levels.iter().map(Level::deficit).max().unwrap_or(0)
    }
}
