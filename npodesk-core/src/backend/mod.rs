//! Backend gateway — the transport seam between the core and the data service.
//!
//! The `BackendGateway` trait abstracts over the hosted HTTP service and the
//! in-memory fixture so the wizard, runner, and tests never care where the
//! data comes from. Implementations do the I/O; the core only composes
//! requests and interprets tagged responses.

use thiserror::Error;

use crate::domain::{FieldDescriptor, Organization};
use crate::export::ExportRequest;
use crate::screening::ScreeningRequest;

pub mod fixture;
pub mod http;
pub mod outage;

pub use fixture::FixtureGateway;
pub use http::HttpGateway;
pub use outage::OutageGuard;

/// Structured error types for backend operations.
///
/// Designed to be displayable to the user as-is; the wizard converts them
/// into notices at the component boundary.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by the backend (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    /// The backend refused the request (4xx). Carries the FastAPI `detail`
    /// message when one was provided.
    #[error("request rejected (HTTP {status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("backend cooling down after repeated failures")]
    OutageCooldown,

    #[error("backend error: {0}")]
    Other(String),
}

/// A downloadable export payload returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    /// Suggested filename (from Content-Disposition, when present).
    pub filename: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// The backend surface the core consumes.
///
/// Option lists are scoped exactly as the resolver keys them: months and
/// states by year, cities by year and state.
pub trait BackendGateway: Send + Sync {
    /// Human-readable name of this gateway.
    fn name(&self) -> &str;

    /// Whether requests are currently worth attempting.
    fn is_available(&self) -> bool;

    fn fiscal_years(&self) -> Result<Vec<i32>, BackendError>;

    fn fiscal_months(&self, year: i32) -> Result<Vec<u32>, BackendError>;

    fn states(&self, year: i32) -> Result<Vec<String>, BackendError>;

    fn cities(&self, year: i32, state: &str) -> Result<Vec<String>, BackendError>;

    /// Execute a screening request and return the candidate organizations.
    fn screen(&self, request: &ScreeningRequest) -> Result<Vec<Organization>, BackendError>;

    fn field_catalog(&self) -> Result<Vec<FieldDescriptor>, BackendError>;

    /// Produce the export payload for a confirmed selection.
    fn export(&self, request: &ExportRequest) -> Result<ExportPayload, BackendError>;
}
