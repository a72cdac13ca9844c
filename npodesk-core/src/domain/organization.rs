//! Organization record as returned by the screening backend.
//!
//! Field names mirror the dataset's column names on the wire (`campus` for
//! the organization name, `st` for the state, the Form 990 line references
//! for financials) so the struct deserializes straight out of a screening
//! response. Everything beyond the identifying columns is optional — the
//! dataset is sparse and older filings are missing most financial lines.

use serde::{Deserialize, Serialize};

/// One organization-year row from the filings dataset.
///
/// `ein` is the unique identifier across the dataset and the key the
/// selection set tracks. Uniqueness is a property of the upstream data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub ein: String,

    /// Organization name (dataset column: `campus`).
    #[serde(rename = "campus")]
    pub name: String,

    pub city: String,

    #[serde(rename = "st")]
    pub state: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiscal_year: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiscal_month: Option<u32>,

    /// Total revenue, current year (Form 990 Part I line 12).
    #[serde(
        default,
        rename = "part_i_summary_12_total_revenue_cy",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_revenue: Option<f64>,

    /// Total assets, end of year (Form 990 Part X line 16).
    #[serde(
        default,
        rename = "part_x_line_16_total_assets_eoy",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_assets: Option<f64>,

    /// Independent living units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ilu_count: Option<u32>,

    /// Assisted living units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alu_count: Option<u32>,
}
