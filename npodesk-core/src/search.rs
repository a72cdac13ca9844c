//! Search-mode selector — criteria screening vs. explicit name/EIN lookup.
//!
//! The two strategies are mutually exclusive per request, but switching
//! modes never clears the other mode's stored input: a user who flips to
//! criteria mode and back gets their pasted EIN list back untouched.

use serde::{Deserialize, Serialize};

/// Which screening strategy is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Screen the fiscal-period universe through the filter composer.
    #[default]
    Criteria,
    /// Look up an explicit list of names or EINs.
    Explicit,
}

/// What the explicit terms are: organization names or EINs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermType {
    #[default]
    Name,
    Ein,
}

impl TermType {
    pub fn label(self) -> &'static str {
        match self {
            TermType::Name => "name",
            TermType::Ein => "ein",
        }
    }
}

/// Split raw multi-line input into search terms.
///
/// One term per line; surrounding whitespace is trimmed and blank lines are
/// dropped, so `"A\n\nB\n  \nC"` parses to `["A", "B", "C"]`.
pub fn parse_terms(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Holds the active mode and the explicit-search input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSelector {
    mode: SearchMode,
    term_type: TermType,
    raw_text: String,
}

impl SearchSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// Switch strategy. The inactive mode's input is preserved.
    pub fn set_mode(&mut self, mode: SearchMode) {
        self.mode = mode;
    }

    pub fn term_type(&self) -> TermType {
        self.term_type
    }

    pub fn set_term_type(&mut self, term_type: TermType) {
        self.term_type = term_type;
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn set_raw_text(&mut self, raw: impl Into<String>) {
        self.raw_text = raw.into();
    }

    /// Parsed terms from the raw input (independent of the active mode).
    pub fn terms(&self) -> Vec<String> {
        parse_terms(&self.raw_text)
    }

    /// Explicit mode needs at least one parsed term. Criteria mode is
    /// always valid here — even zero enabled filter modules is a legal
    /// request that screens the whole fiscal-period universe.
    pub fn is_valid(&self) -> bool {
        match self.mode {
            SearchMode::Criteria => true,
            SearchMode::Explicit => !self.terms().is_empty(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_drops_blank_and_whitespace_lines() {
        assert_eq!(parse_terms("A\n\nB\n  \nC"), vec!["A", "B", "C"]);
    }

    #[test]
    fn parse_trims_terms() {
        assert_eq!(
            parse_terms("  GOOD SAMARITAN SOCIETY  \n\tSALVATION ARMY\n"),
            vec!["GOOD SAMARITAN SOCIETY", "SALVATION ARMY"]
        );
    }

    #[test]
    fn parse_handles_crlf() {
        assert_eq!(parse_terms("12-3456789\r\n98-7654321"), vec![
            "12-3456789",
            "98-7654321"
        ]);
    }

    #[test]
    fn parse_empty_input() {
        assert!(parse_terms("").is_empty());
        assert!(parse_terms("   \n \n").is_empty());
    }

    #[test]
    fn explicit_requires_terms() {
        let mut sel = SearchSelector::new();
        sel.set_mode(SearchMode::Explicit);
        assert!(!sel.is_valid());

        sel.set_raw_text("12-3456789\n98-7654321");
        sel.set_term_type(TermType::Ein);
        assert!(sel.is_valid());
        assert_eq!(sel.terms(), vec!["12-3456789", "98-7654321"]);
    }

    #[test]
    fn criteria_always_valid() {
        let sel = SearchSelector::new();
        assert_eq!(sel.mode(), SearchMode::Criteria);
        assert!(sel.is_valid());
    }

    #[test]
    fn mode_switch_preserves_input() {
        let mut sel = SearchSelector::new();
        sel.set_mode(SearchMode::Explicit);
        sel.set_raw_text("SOME ORG");
        sel.set_mode(SearchMode::Criteria);
        sel.set_mode(SearchMode::Explicit);
        assert_eq!(sel.raw_text(), "SOME ORG");
        assert!(sel.is_valid());
    }
}
