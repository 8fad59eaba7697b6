//! Consolidation options.

use crate::error::{Error, Result};

/// How strictly candidate spans must start on a begin row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strictness {
    /// Strict unless there are more flagged objects than begin rows
    #[default]
    Auto,
    /// Prefer begin rows, fall back to continuation rows when none match
    Strict,
    /// Accept begin and continuation rows alike
    Lenient,
}

impl Strictness {
    /// Parse `auto`, `strict` or `lenient`.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Strictness::Auto),
            "strict" => Ok(Strictness::Strict),
            "lenient" => Ok(Strictness::Lenient),
            other => Err(Error::Other(format!("unknown strictness '{other}'"))),
        }
    }

    /// Whether candidate search should prefer begin rows, given the number
    /// of flagged objects of a kind and the begin rows of that kind.
    pub fn is_strict(self, flagged: usize, begin_rows: usize) -> bool {
        match self {
            Strictness::Auto => flagged <= begin_rows,
            Strictness::Strict => true,
            Strictness::Lenient => false,
        }
    }
}

/// Options for tagger-output consolidation.
#[derive(Debug, Clone, Default)]
pub struct ConsolidationOptions {
    /// Candidate search mode
    pub strictness: Strictness,
}

impl ConsolidationOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the candidate search mode.
    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strictness_parse() {
        assert_eq!(Strictness::parse("Strict").unwrap(), Strictness::Strict);
        assert_eq!(Strictness::parse("lenient").unwrap(), Strictness::Lenient);
        assert_eq!(Strictness::parse("auto").unwrap(), Strictness::Auto);
        assert!(Strictness::parse("loose").is_err());
        assert_eq!(ConsolidationOptions::new().strictness, Strictness::Auto);
    }

    #[test]
    fn test_auto_strictness() {
        assert!(Strictness::Auto.is_strict(2, 2));
        assert!(!Strictness::Auto.is_strict(3, 2));
        assert!(Strictness::Strict.is_strict(3, 0));
        assert!(!Strictness::Lenient.is_strict(0, 5));
    }
}
