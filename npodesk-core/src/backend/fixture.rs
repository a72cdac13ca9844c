//! In-memory gateway with backend-equivalent query semantics.
//!
//! Serves a dataset held in memory, matching the way the hosted SQL
//! matches: case-insensitive equality on state and city, inclusive numeric
//! ranges that never match a missing value, case-insensitive substring
//! search for names, exact match for EINs. Option lists are the distinct
//! values present in the data — years descending, months ascending, names
//! alphabetical — and screening results come back in name order.
//!
//! Used for `--offline` CLI runs and as the test double throughout the
//! workspace. Ships with a small built-in sample of senior-living filings.

use serde_json::Value;
use std::collections::BTreeSet;

use super::{BackendError, BackendGateway, ExportPayload};
use crate::domain::{FieldDescriptor, Organization};
use crate::export::{ExportFormat, ExportRequest};
use crate::screening::{CriteriaRequest, ExplicitRequest, ScreeningRequest};
use crate::search::TermType;

/// Gateway over an in-memory organization list.
pub struct FixtureGateway {
    organizations: Vec<Organization>,
    catalog: Vec<FieldDescriptor>,
}

impl FixtureGateway {
    pub fn new(organizations: Vec<Organization>) -> Self {
        Self {
            organizations,
            catalog: default_catalog(),
        }
    }

    /// Replace the field catalog (defaults to the full dataset schema).
    pub fn with_catalog(mut self, catalog: Vec<FieldDescriptor>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Built-in sample dataset spanning two fiscal years and four states.
    pub fn sample() -> Self {
        Self::new(sample_organizations())
    }

    pub fn organizations(&self) -> &[Organization] {
        &self.organizations
    }

    fn rows_for_year(&self, year: i32) -> impl Iterator<Item = &Organization> {
        self.organizations
            .iter()
            .filter(move |o| o.fiscal_year == Some(year))
    }
}

impl BackendGateway for FixtureGateway {
    fn name(&self) -> &str {
        "fixture"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn fiscal_years(&self) -> Result<Vec<i32>, BackendError> {
        let distinct: BTreeSet<i32> = self
            .organizations
            .iter()
            .filter_map(|o| o.fiscal_year)
            .collect();
        // Newest first, the way the backend serves them.
        Ok(distinct.into_iter().rev().collect())
    }

    fn fiscal_months(&self, year: i32) -> Result<Vec<u32>, BackendError> {
        let distinct: BTreeSet<u32> = self
            .rows_for_year(year)
            .filter_map(|o| o.fiscal_month)
            .collect();
        Ok(distinct.into_iter().collect())
    }

    fn states(&self, year: i32) -> Result<Vec<String>, BackendError> {
        let distinct: BTreeSet<String> = self
            .rows_for_year(year)
            .map(|o| o.state.to_ascii_uppercase())
            .collect();
        Ok(distinct.into_iter().collect())
    }

    fn cities(&self, year: i32, state: &str) -> Result<Vec<String>, BackendError> {
        let distinct: BTreeSet<String> = self
            .rows_for_year(year)
            .filter(|o| o.state.eq_ignore_ascii_case(state))
            .map(|o| o.city.to_ascii_uppercase())
            .collect();
        Ok(distinct.into_iter().collect())
    }

    fn screen(&self, request: &ScreeningRequest) -> Result<Vec<Organization>, BackendError> {
        let mut results: Vec<Organization> = self
            .organizations
            .iter()
            .filter(|org| match request {
                ScreeningRequest::Criteria(body) => matches_criteria(org, body),
                ScreeningRequest::Explicit(body) => matches_explicit(org, body),
            })
            .cloned()
            .collect();
        results.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(results)
    }

    fn field_catalog(&self) -> Result<Vec<FieldDescriptor>, BackendError> {
        Ok(self.catalog.clone())
    }

    fn export(&self, request: &ExportRequest) -> Result<ExportPayload, BackendError> {
        for field in &request.fields {
            if !self.catalog.iter().any(|f| &f.name == field) {
                return Err(BackendError::Rejected {
                    status: 400,
                    detail: format!("unknown export field '{field}'"),
                });
            }
        }

        // Rows in the order the EINs were confirmed.
        let rows: Vec<&Organization> = request
            .eins
            .iter()
            .filter_map(|ein| self.organizations.iter().find(|o| &o.ein == ein))
            .collect();

        match request.format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.write_record(&request.fields)
                    .map_err(|e| BackendError::Other(format!("csv write: {e}")))?;
                for org in &rows {
                    let json = org_row(org);
                    let record: Vec<String> = request
                        .fields
                        .iter()
                        .map(|f| cell_text(json.get(f)))
                        .collect();
                    wtr.write_record(&record)
                        .map_err(|e| BackendError::Other(format!("csv write: {e}")))?;
                }
                let bytes = wtr
                    .into_inner()
                    .map_err(|e| BackendError::Other(format!("csv flush: {e}")))?;
                Ok(ExportPayload {
                    filename: Some("nonprofits_export.csv".into()),
                    content_type: ExportFormat::Csv.media_type().into(),
                    bytes,
                })
            }
            ExportFormat::Json => {
                let records: Vec<Value> = rows
                    .iter()
                    .map(|org| {
                        let json = org_row(org);
                        let mut map = serde_json::Map::new();
                        for f in &request.fields {
                            map.insert(f.clone(), json.get(f).cloned().unwrap_or(Value::Null));
                        }
                        Value::Object(map)
                    })
                    .collect();
                let bytes = serde_json::to_vec_pretty(&records)
                    .map_err(|e| BackendError::Other(format!("json export: {e}")))?;
                Ok(ExportPayload {
                    filename: Some("nonprofits_export.json".into()),
                    content_type: ExportFormat::Json.media_type().into(),
                    bytes,
                })
            }
            ExportFormat::Xlsx => Err(BackendError::Rejected {
                status: 501,
                detail: "xlsx export requires the hosted backend".into(),
            }),
        }
    }
}

/// One organization as a JSON object keyed by dataset column names.
fn org_row(org: &Organization) -> Value {
    serde_json::to_value(org).expect("organization serialization failed")
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn matches_criteria(org: &Organization, body: &CriteriaRequest) -> bool {
    if org.fiscal_year != Some(body.fiscal_year) {
        return false;
    }
    if let Some(month) = body.fiscal_month {
        if org.fiscal_month != Some(month) {
            return false;
        }
    }

    if let Some(geo) = &body.filters.geo_filters {
        if let Some(state) = &geo.state {
            if !org.state.eq_ignore_ascii_case(state) {
                return false;
            }
        }
        if let Some(city) = &geo.city {
            if !org.city.eq_ignore_ascii_case(city) {
                return false;
            }
        }
    }

    if let Some(fin) = &body.filters.financial_filters {
        if !within_f64(org.total_revenue, fin.min_revenue, fin.max_revenue) {
            return false;
        }
        if !within_f64(org.total_assets, fin.min_assets, fin.max_assets) {
            return false;
        }
    }

    if let Some(ops) = &body.filters.operational_filters {
        if !within_u32(org.ilu_count, ops.min_ilu, ops.max_ilu) {
            return false;
        }
        if !within_u32(org.alu_count, ops.min_alu, ops.max_alu) {
            return false;
        }
    }

    true
}

fn matches_explicit(org: &Organization, body: &ExplicitRequest) -> bool {
    if org.fiscal_year != Some(body.fiscal_year) {
        return false;
    }
    if let Some(month) = body.fiscal_month {
        if org.fiscal_month != Some(month) {
            return false;
        }
    }

    match body.search_type {
        TermType::Name => {
            let name = org.name.to_ascii_lowercase();
            body.search_terms
                .iter()
                .any(|t| name.contains(&t.to_ascii_lowercase()))
        }
        TermType::Ein => body.search_terms.iter().any(|t| t == &org.ein),
    }
}

/// An unbounded side passes; a bounded side needs a present value inside it
/// (SQL comparisons against NULL match nothing).
fn within_f64(value: Option<f64>, min: Option<f64>, max: Option<f64>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    let Some(v) = value else { return false };
    min.map_or(true, |m| v >= m) && max.map_or(true, |m| v <= m)
}

fn within_u32(value: Option<u32>, min: Option<u32>, max: Option<u32>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    let Some(v) = value else { return false };
    min.map_or(true, |m| v >= m) && max.map_or(true, |m| v <= m)
}

/// Catalog covering every column the sample dataset carries.
fn default_catalog() -> Vec<FieldDescriptor> {
    fn field(name: &str, category: &str, display_name: &str) -> FieldDescriptor {
        FieldDescriptor {
            name: name.into(),
            category: category.into(),
            display_name: display_name.into(),
        }
    }

    vec![
        field("ein", "Identification", "EIN"),
        field("campus", "Identification", "Organization Name"),
        field("address", "Location", "Street Address"),
        field("city", "Location", "City"),
        field("st", "Location", "State"),
        field("zip", "Location", "ZIP Code"),
        field("fiscal_year", "Filing Period", "Fiscal Year"),
        field("fiscal_month", "Filing Period", "Fiscal Ending Month"),
        field(
            "part_i_summary_12_total_revenue_cy",
            "Financial",
            "Total Revenue (CY)",
        ),
        field(
            "part_x_line_16_total_assets_eoy",
            "Financial",
            "Total Assets (EOY)",
        ),
        field("ilu_count", "Operational", "Independent Living Units"),
        field("alu_count", "Operational", "Assisted Living Units"),
    ]
}

fn sample_organizations() -> Vec<Organization> {
    fn org(
        ein: &str,
        name: &str,
        city: &str,
        state: &str,
        year: i32,
        month: u32,
        revenue: f64,
        assets: f64,
        ilu: u32,
        alu: u32,
    ) -> Organization {
        Organization {
            ein: ein.into(),
            name: name.into(),
            city: city.into(),
            state: state.into(),
            zip: None,
            address: None,
            fiscal_year: Some(year),
            fiscal_month: Some(month),
            total_revenue: Some(revenue),
            total_assets: Some(assets),
            ilu_count: Some(ilu),
            alu_count: Some(alu),
        }
    }

    vec![
        org("95-1644589", "GOOD SAMARITAN SOCIETY", "LOS ANGELES", "CA", 2023, 6, 12_500_000.0, 40_200_000.0, 220, 85),
        org("94-1156335", "PACIFIC RETIREMENT SERVICES", "SAN FRANCISCO", "CA", 2023, 12, 48_900_000.0, 152_000_000.0, 410, 120),
        org("33-0052735", "CASA DE MANANA", "SAN DIEGO", "CA", 2023, 6, 9_800_000.0, 31_500_000.0, 180, 40),
        org("95-2039198", "SOLHEIM LUTHERAN HOME", "LOS ANGELES", "CA", 2023, 12, 7_100_000.0, 18_900_000.0, 95, 60),
        org("13-5562308", "SALVATION ARMY RESIDENCES", "NEW YORK", "NY", 2023, 9, 88_400_000.0, 301_000_000.0, 530, 0),
        org("16-0743921", "EPISCOPAL SENIOR LIFE", "BUFFALO", "NY", 2023, 12, 22_700_000.0, 64_800_000.0, 260, 140),
        org("36-2167096", "FRIENDSHIP VILLAGE", "CHICAGO", "IL", 2023, 6, 31_300_000.0, 97_200_000.0, 340, 110),
        org("74-1563270", "BUCKNER RETIREMENT SERVICES", "AUSTIN", "TX", 2023, 12, 54_600_000.0, 188_000_000.0, 470, 160),
        org("74-2407955", "LONGHORN VILLAGE", "AUSTIN", "TX", 2023, 6, 17_900_000.0, 55_300_000.0, 205, 75),
        org("95-1831116", "HOLLENBECK PALMS", "LOS ANGELES", "CA", 2022, 12, 11_200_000.0, 35_700_000.0, 150, 95),
        org("94-1279336", "SEQUOIAS SAN FRANCISCO", "SAN FRANCISCO", "CA", 2022, 6, 28_800_000.0, 89_100_000.0, 290, 55),
        org("13-1740011", "GREENWICH HOUSE", "NEW YORK", "NY", 2022, 6, 14_300_000.0, 27_400_000.0, 0, 0),
        org("36-2513729", "SMITH VILLAGE", "CHICAGO", "IL", 2022, 12, 19_500_000.0, 48_600_000.0, 175, 90),
        org("74-1109733", "MORNINGSIDE MINISTRIES", "SAN ANTONIO", "TX", 2022, 9, 26_100_000.0, 71_900_000.0, 230, 130),
    ]
}
