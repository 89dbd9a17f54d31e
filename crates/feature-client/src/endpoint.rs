use crate::error::{FetchError, Result};

/// Base URL of a hosted feature layer, e.g.
/// `https://maps.example.gov/arcgis/rest/services/Transportation/MapServer/14`.
///
/// The layer must answer a `?f=json` metadata request with a
/// `maxRecordCount` field and expose the standard `query` operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureServiceEndpoint {
    base: String,
}

impl FeatureServiceEndpoint {
    pub fn new(base: impl Into<String>) -> Result<Self> {
        let base = base.into();
        let trimmed = base.trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(FetchError::EndpointUnavailable {
                url: base,
                step: "endpoint",
                reason: "empty base URL".to_string(),
            });
        }
        Ok(Self {
            base: trimmed.to_string(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// URL answering the layer metadata request.
    pub fn metadata_url(&self) -> &str {
        &self.base
    }

    /// URL of the `query` operation.
    pub fn query_url(&self) -> String {
        format!("{}/query", self.base)
    }
}

impl std::fmt::Display for FeatureServiceEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base)
    }
}
