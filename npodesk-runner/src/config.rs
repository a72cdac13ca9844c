//! Serializable query configuration.
//!
//! A `QueryConfig` captures one complete pass through the wizard: the
//! fiscal period, either filter modules or an explicit search (never
//! both), which candidates to confirm, and what to export. Stored as TOML:
//!
//! ```toml
//! [fiscal]
//! year = 2023
//! month = 6
//!
//! [filters.geographic]
//! state = "CA"
//!
//! [output]
//! fields = ["ein", "campus", "st"]
//! format = "csv"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use npodesk_core::export::ExportFormat;
use npodesk_core::search::TermType;

/// Errors from loading or validating a query config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("[filters] and [search] are mutually exclusive — pick one strategy")]
    BothStrategies,

    #[error("[search] requires at least one term")]
    NoSearchTerms,

    #[error("[output] requires at least one field")]
    NoFields,

    #[error("fiscal month {0} is out of range (1-12)")]
    MonthOutOfRange(u32),
}

/// One complete wizard pass, as configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryConfig {
    pub fiscal: FiscalConfig,

    /// Criteria-mode filter modules. A present section enables the module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<FiltersConfig>,

    /// Explicit-search strategy. Mutually exclusive with `filters`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchConfig>,

    #[serde(default)]
    pub selection: SelectionConfig,

    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FiscalConfig {
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FiltersConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geographic: Option<GeoConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial: Option<FinancialConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operational: Option<OperationalConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeoConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FinancialConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_revenue: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_revenue: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_assets: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_assets: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_ilu: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ilu: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_alu: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_alu: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    #[serde(default)]
    pub term_type: TermType,
    pub terms: Vec<String>,
}

/// Which screened candidates to confirm. Default: all of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectionConfig {
    /// Explicit EINs to confirm; omit to confirm every candidate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eins: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub fields: Vec<String>,
    pub format: ExportFormat,
}

impl QueryConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: QueryConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.filters.is_some() && self.search.is_some() {
            return Err(ConfigError::BothStrategies);
        }
        if let Some(search) = &self.search {
            if search.terms.iter().all(|t| t.trim().is_empty()) {
                return Err(ConfigError::NoSearchTerms);
            }
        }
        if self.output.fields.is_empty() {
            return Err(ConfigError::NoFields);
        }
        if let Some(month) = self.fiscal.month {
            if !(1..=12).contains(&month) {
                return Err(ConfigError::MonthOutOfRange(month));
            }
        }
        // Range ordering (min vs max) is deliberately not checked: the
        // backend arbitrates, and an inverted range just matches nothing.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_criteria_config() {
        let config = QueryConfig::from_toml(
            r#"
            [fiscal]
            year = 2023
            month = 6

            [filters.geographic]
            state = "CA"
            city = "LOS ANGELES"

            [filters.financial]
            min_revenue = 1000000.0
            max_revenue = 50000000.0

            [filters.operational]
            min_ilu = 50

            [selection]
            eins = ["95-1644589"]

            [output]
            fields = ["ein", "campus", "st"]
            format = "csv"
            "#,
        )
        .unwrap();

        assert_eq!(config.fiscal.year, 2023);
        assert_eq!(config.fiscal.month, Some(6));
        let filters = config.filters.unwrap();
        assert_eq!(
            filters.geographic.unwrap().state.as_deref(),
            Some("CA")
        );
        assert_eq!(filters.operational.unwrap().min_ilu, Some(50));
        assert_eq!(config.selection.eins.unwrap(), ["95-1644589"]);
        assert_eq!(config.output.format, ExportFormat::Csv);
    }

    #[test]
    fn parses_search_config() {
        let config = QueryConfig::from_toml(
            r#"
            [fiscal]
            year = 2023

            [search]
            term_type = "ein"
            terms = ["12-3456789", "98-7654321"]

            [output]
            fields = ["ein"]
            format = "json"
            "#,
        )
        .unwrap();

        let search = config.search.unwrap();
        assert_eq!(search.term_type, TermType::Ein);
        assert_eq!(search.terms.len(), 2);
        assert!(config.selection.eins.is_none());
    }

    #[test]
    fn rejects_both_strategies() {
        let err = QueryConfig::from_toml(
            r#"
            [fiscal]
            year = 2023

            [filters.geographic]
            state = "CA"

            [search]
            terms = ["X"]

            [output]
            fields = ["ein"]
            format = "csv"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::BothStrategies));
    }

    #[test]
    fn rejects_empty_search_terms() {
        let err = QueryConfig::from_toml(
            r#"
            [fiscal]
            year = 2023

            [search]
            terms = ["  "]

            [output]
            fields = ["ein"]
            format = "csv"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::NoSearchTerms));
    }

    #[test]
    fn rejects_empty_fields() {
        let err = QueryConfig::from_toml(
            r#"
            [fiscal]
            year = 2023

            [output]
            fields = []
            format = "csv"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::NoFields));
    }

    #[test]
    fn rejects_month_out_of_range() {
        let err = QueryConfig::from_toml(
            r#"
            [fiscal]
            year = 2023
            month = 13

            [output]
            fields = ["ein"]
            format = "csv"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MonthOutOfRange(13)));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = QueryConfig::from_toml(
            r#"
            [fiscal]
            year = 2023
            quarter = 2

            [output]
            fields = ["ein"]
            format = "csv"
            "#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn inverted_range_is_accepted() {
        // Backend-arbitrated: an inverted range parses fine and simply
        // screens to nothing.
        let config = QueryConfig::from_toml(
            r#"
            [fiscal]
            year = 2023

            [filters.financial]
            min_revenue = 100.0
            max_revenue = 1.0

            [output]
            fields = ["ein"]
            format = "csv"
            "#,
        );
        assert!(config.is_ok());
    }
}
