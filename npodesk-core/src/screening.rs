//! Screening requests — the composed payload that narrows the universe.
//!
//! Exactly one strategy is sent per request: either the assembled filter
//! modules (criteria) or an explicit term list. Each request carries a
//! content fingerprint; the wizard uses it both to discard in-flight
//! responses whose request no longer matches and to detect that an
//! upstream edit has made previous screening results stale.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::FiscalPeriod;
use crate::filters::FilterSet;
use crate::search::TermType;

/// Content hash identifying one composed screening request.
///
/// Two requests with identical strategy, fiscal period, and parameters have
/// the same fingerprint, so re-screening an unchanged wizard is a no-op
/// from the staleness tracker's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestFingerprint(String);

impl fmt::Display for RequestFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Criteria-mode body for `POST /api/filter/enhanced`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriteriaRequest {
    pub fiscal_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiscal_month: Option<u32>,
    #[serde(flatten)]
    pub filters: FilterSet,
}

/// Explicit-mode body for `POST /api/search/batch`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplicitRequest {
    pub fiscal_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiscal_month: Option<u32>,
    pub search_terms: Vec<String>,
    pub search_type: TermType,
}

/// A composed screening request, ready for the gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreeningRequest {
    Criteria(CriteriaRequest),
    Explicit(ExplicitRequest),
}

impl ScreeningRequest {
    pub fn criteria(period: FiscalPeriod, filters: FilterSet) -> Self {
        ScreeningRequest::Criteria(CriteriaRequest {
            fiscal_year: period.year,
            fiscal_month: period.month,
            filters,
        })
    }

    pub fn explicit(period: FiscalPeriod, terms: Vec<String>, term_type: TermType) -> Self {
        ScreeningRequest::Explicit(ExplicitRequest {
            fiscal_year: period.year,
            fiscal_month: period.month,
            search_terms: terms,
            search_type: term_type,
        })
    }

    pub fn fiscal_year(&self) -> i32 {
        match self {
            ScreeningRequest::Criteria(c) => c.fiscal_year,
            ScreeningRequest::Explicit(e) => e.fiscal_year,
        }
    }

    pub fn fiscal_month(&self) -> Option<u32> {
        match self {
            ScreeningRequest::Criteria(c) => c.fiscal_month,
            ScreeningRequest::Explicit(e) => e.fiscal_month,
        }
    }

    /// Backend route this request posts to.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ScreeningRequest::Criteria(_) => "/api/filter/enhanced",
            ScreeningRequest::Explicit(_) => "/api/search/batch",
        }
    }

    /// Deterministic content hash over the endpoint and canonical JSON body.
    ///
    /// The endpoint is included so an empty criteria request and an
    /// explicit request can never collide.
    pub fn fingerprint(&self) -> RequestFingerprint {
        let body = match self {
            ScreeningRequest::Criteria(c) => serde_json::to_string(c),
            ScreeningRequest::Explicit(e) => serde_json::to_string(e),
        }
        .expect("screening request serialization failed");
        let hash = blake3::hash(format!("{}:{body}", self.endpoint()).as_bytes());
        RequestFingerprint(hash.to_hex().to_string())
    }
}
