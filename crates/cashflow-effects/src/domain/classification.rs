//! Residential/commercial classification of real estate.
//!
//! Board real estate is named `RealEstate01`, `RealEstate02`, ... and the
//! units numbered 1 through 9 are homes. That convention is the default
//! fallback rule; explicit entries always win over it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// How a piece of real estate is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Residence {
    /// A home; targeted by residential-only cards.
    Residential,
    /// Anything else.
    Commercial,
}

/// Classifies a name by its trailing number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuffixRule {
    /// Smallest residential unit number.
    pub min: u32,
    /// Largest residential unit number.
    pub max: u32,
}

impl SuffixRule {
    fn classify(self, name: &str) -> Residence {
        let digits_start = name
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_digit())
            .last()
            .map(|(i, _)| i);

        let number = digits_start.and_then(|start| name[start..].parse::<u32>().ok());
        match number {
            Some(n) if (self.min..=self.max).contains(&n) => Residence::Residential,
            _ => Residence::Commercial,
        }
    }
}

/// Name → residence lookup with an optional suffix rule for unlisted names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidenceTable {
    #[serde(default)]
    entries: HashMap<String, Residence>,
    #[serde(default)]
    fallback: Option<SuffixRule>,
}

impl Default for ResidenceTable {
    fn default() -> Self {
        Self::suffix_convention()
    }
}

impl ResidenceTable {
    /// Units numbered 1..=9 are residential, everything else commercial.
    #[must_use]
    pub fn suffix_convention() -> Self {
        Self {
            entries: HashMap::new(),
            fallback: Some(SuffixRule { min: 1, max: 9 }),
        }
    }

    /// Only listed names are residential.
    #[must_use]
    pub fn explicit() -> Self {
        Self {
            entries: HashMap::new(),
            fallback: None,
        }
    }

    /// Adds or replaces an explicit entry.
    #[must_use]
    pub fn with_entry(mut self, name: impl Into<String>, residence: Residence) -> Self {
        self.entries.insert(name.into(), residence);
        self
    }

    /// Classifies `name`.
    #[must_use]
    pub fn classify(&self, name: &str) -> Residence {
        if let Some(residence) = self.entries.get(name) {
            return *residence;
        }
        self.fallback
            .map_or(Residence::Commercial, |rule| rule.classify(name))
    }

    /// Shorthand for `classify(name) == Residential`.
    #[must_use]
    pub fn is_residential(&self, name: &str) -> bool {
        self.classify(name) == Residence::Residential
    }
}
