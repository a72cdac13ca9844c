//! HTTP gateway to the hosted filings data service.
//!
//! Wraps the backend's REST surface: option lists under
//! `/api/available-*`, screening via `POST /api/filter/enhanced` and
//! `POST /api/search/batch`, the field catalog at `/api/fields`, and
//! `POST /api/export` for the final payload. Transient failures retry with
//! exponential backoff, 429 honors Retry-After, and the outage guard stops
//! new attempts once the service looks down. FastAPI error bodies
//! (`{"detail": ...}`) are surfaced verbatim.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::outage::OutageGuard;
use super::{BackendError, BackendGateway, ExportPayload};
use crate::domain::{FieldDescriptor, Organization};
use crate::export::ExportRequest;
use crate::screening::ScreeningRequest;

#[derive(Debug, Deserialize)]
struct YearsResponse {
    years: Vec<i32>,
}

#[derive(Debug, Deserialize)]
struct MonthsResponse {
    months: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct StatesResponse {
    states: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CitiesResponse {
    cities: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ScreenResponse {
    #[serde(default)]
    results: Vec<Organization>,
}

#[derive(Debug, Deserialize)]
struct FieldsResponse {
    fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Blocking HTTP gateway.
pub struct HttpGateway {
    client: reqwest::blocking::Client,
    base_url: String,
    guard: Arc<OutageGuard>,
    max_retries: u32,
    base_delay: Duration,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, guard: Arc<OutageGuard>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            guard,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Run one request with retry, backoff, and the outage guard.
    ///
    /// `build` constructs a fresh request each attempt (bodies are not
    /// reusable across sends).
    fn execute(
        &self,
        path: &str,
        build: impl Fn(&reqwest::blocking::Client) -> reqwest::blocking::RequestBuilder,
    ) -> Result<reqwest::blocking::Response, BackendError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                warn!(path, attempt, "retrying backend request");
                std::thread::sleep(delay);
            }

            if !self.guard.try_acquire() {
                return Err(BackendError::OutageCooldown);
            }

            debug!(path, attempt, "backend request");
            match build(&self.client).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        self.guard.record_failure();
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        last_error = Some(BackendError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if status.is_client_error() {
                        // 4xx means our request was wrong — retrying the
                        // same bytes cannot help.
                        let detail = resp
                            .json::<ErrorBody>()
                            .map(|b| b.detail)
                            .unwrap_or_else(|_| status.to_string());
                        return Err(BackendError::Rejected {
                            status: status.as_u16(),
                            detail,
                        });
                    }

                    if !status.is_success() {
                        self.guard.record_failure();
                        last_error = Some(BackendError::Other(format!("HTTP {status} for {path}")));
                        continue;
                    }

                    self.guard.record_success();
                    return Ok(resp);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        self.guard.record_failure();
                        last_error = Some(BackendError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(BackendError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| BackendError::Other("max retries exceeded".into())))
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, BackendError> {
        let url = self.url(path);
        let resp = self.execute(path, |client| client.get(&url).query(query))?;
        resp.json::<T>()
            .map_err(|e| BackendError::ResponseFormatChanged(format!("{path}: {e}")))
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        let url = self.url(path);
        let resp = self.execute(path, |client| client.post(&url).json(body))?;
        resp.json::<T>()
            .map_err(|e| BackendError::ResponseFormatChanged(format!("{path}: {e}")))
    }
}

impl BackendGateway for HttpGateway {
    fn name(&self) -> &str {
        "filings_api"
    }

    fn is_available(&self) -> bool {
        !self.guard.is_open()
    }

    fn fiscal_years(&self) -> Result<Vec<i32>, BackendError> {
        let resp: YearsResponse = self.get_json("/api/available-years", &[])?;
        Ok(resp.years)
    }

    fn fiscal_months(&self, year: i32) -> Result<Vec<u32>, BackendError> {
        let resp: MonthsResponse =
            self.get_json("/api/available-months", &[("year", year.to_string())])?;
        Ok(resp.months)
    }

    fn states(&self, year: i32) -> Result<Vec<String>, BackendError> {
        let resp: StatesResponse =
            self.get_json("/api/available-states", &[("fiscal_year", year.to_string())])?;
        Ok(resp.states)
    }

    fn cities(&self, year: i32, state: &str) -> Result<Vec<String>, BackendError> {
        let resp: CitiesResponse = self.get_json(
            "/api/available-cities",
            &[
                ("fiscal_year", year.to_string()),
                ("state", state.to_string()),
            ],
        )?;
        Ok(resp.cities)
    }

    fn screen(&self, request: &ScreeningRequest) -> Result<Vec<Organization>, BackendError> {
        let resp: ScreenResponse = match request {
            ScreeningRequest::Criteria(body) => self.post_json(request.endpoint(), body)?,
            ScreeningRequest::Explicit(body) => self.post_json(request.endpoint(), body)?,
        };
        Ok(resp.results)
    }

    fn field_catalog(&self) -> Result<Vec<FieldDescriptor>, BackendError> {
        let resp: FieldsResponse = self.get_json("/api/fields", &[])?;
        Ok(resp.fields)
    }

    fn export(&self, request: &ExportRequest) -> Result<ExportPayload, BackendError> {
        let path = "/api/export";
        let url = self.url(path);
        let resp = self.execute(path, |client| client.post(&url).json(request))?;

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let filename = resp
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_attachment_filename);
        let bytes = resp
            .bytes()
            .map_err(|e| BackendError::Other(format!("reading export payload: {e}")))?
            .to_vec();

        Ok(ExportPayload {
            filename,
            content_type,
            bytes,
        })
    }
}

/// Pull the filename out of a Content-Disposition header.
fn parse_attachment_filename(header: &str) -> Option<String> {
    let (_, rest) = header.split_once("filename=")?;
    let name = rest.split(';').next()?.trim().trim_matches('"');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
