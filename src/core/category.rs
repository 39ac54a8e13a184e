//! Causal categories evidence can be sorted into.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of three mutually exclusive causal buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Someone's action or omission.
    Human,
    /// A process, policy, or organizational failure.
    Systemic,
    /// Circumstances outside anyone's control.
    External,
}

impl Category {
    /// Get all category variants, in tally order.
    pub fn all() -> &'static [Category] {
        &[Category::Human, Category::Systemic, Category::External]
    }

    /// Get the display name for this category.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Human => "Human",
            Category::Systemic => "Systemic",
            Category::External => "External",
        }
    }

    /// Label shown when this category leads the evidence.
    pub fn hypothesis_label(&self) -> &'static str {
        match self {
            Category::Human => "Individual error",
            Category::Systemic => "Organizational failure",
            Category::External => "Outside circumstances",
        }
    }

    /// Position of this category in [`Category::all`].
    pub(crate) fn index(self) -> usize {
        match self {
            Category::Human => 0,
            Category::Systemic => 1,
            Category::External => 2,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" => Ok(Category::Human),
            "systemic" => Ok(Category::Systemic),
            "external" => Ok(Category::External),
            other => Err(format!(
                "unknown category '{}' (expected human, systemic, or external)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_all_order() {
        for (i, category) in Category::all().iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }

    #[test]
    fn test_from_str_case_insensitive() {
        assert_eq!("Human".parse::<Category>(), Ok(Category::Human));
        assert_eq!("SYSTEMIC".parse::<Category>(), Ok(Category::Systemic));
        assert_eq!("external".parse::<Category>(), Ok(Category::External));
        assert!("weather".parse::<Category>().is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&Category::Systemic).unwrap();
        assert_eq!(json, "\"systemic\"");
        let parsed: Category = serde_json::from_str("\"external\"").unwrap();
        assert_eq!(parsed, Category::External);
    }

    #[test]
    fn test_labels_are_distinct() {
        let labels: std::collections::HashSet<_> =
            Category::all().iter().map(|c| c.hypothesis_label()).collect();
        assert_eq!(labels.len(), 3);
    }
}
