//! Geographic filter values: state, and optionally a city within it.

use serde::{Deserialize, Serialize};

/// State/city pair for the geographic module.
///
/// `city` is only meaningful while `state` is set; the composer enforces
/// that ordering. Wire key for the state is the dataset column `st`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoFilterValues {
    #[serde(rename = "st")]
    pub state: Option<String>,
    pub city: Option<String>,
}

impl GeoFilterValues {
    pub fn is_empty(&self) -> bool {
        self.state.is_none() && self.city.is_none()
    }
}
