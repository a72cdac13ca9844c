//! Export assembly — the final request combining selection, fields, format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Output formats the backend can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Json => "json",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Json => "application/json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown export format '{0}' (expected csv, xlsx, or json)")]
pub struct UnknownFormat(String);

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" => Ok(ExportFormat::Xlsx),
            "json" => Ok(ExportFormat::Json),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}

/// The final export request: confirmed EINs, chosen fields, output format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub eins: Vec<String>,
    pub fields: Vec<String>,
    pub format: ExportFormat,
}

impl ExportRequest {
    /// Pure composition — no I/O, no validation beyond what the wizard has
    /// already gated (non-empty selection and field set).
    pub fn assemble(eins: Vec<String>, fields: Vec<String>, format: ExportFormat) -> Self {
        Self {
            eins,
            fields,
            format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_round_trips_through_serde() {
        let json = serde_json::to_string(&ExportFormat::Xlsx).unwrap();
        assert_eq!(json, "\"xlsx\"");
        let back: ExportFormat = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ExportFormat::Xlsx);
    }

    #[test]
    fn format_from_str() {
        assert_eq!("CSV".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert_eq!("json".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert!("parquet".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn assemble_preserves_inputs_verbatim() {
        let request = ExportRequest::assemble(
            vec!["12-3456789".into(), "98-7654321".into()],
            vec!["ein".into(), "campus".into()],
            ExportFormat::Csv,
        );
        assert_eq!(request.eins.len(), 2);
        assert_eq!(request.fields, ["ein", "campus"]);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["format"], "csv");
        assert_eq!(json["eins"][0], "12-3456789");
    }
}
