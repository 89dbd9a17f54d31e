use thiserror::Error;

pub type Result<T> = std::result::Result<T, FetchError>;

/// Errors surfaced by a feature fetch. All variants are terminal for the
/// current call; the fetcher never retries internally.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport failure, timeout, or non-2xx response at any step, or a
    /// metadata document that does not describe a usable feature layer.
    #[error("endpoint unavailable during {step}: {url}: {reason}")]
    EndpointUnavailable {
        url: String,
        step: &'static str,
        reason: String,
    },

    /// The service answered but rejected the query itself (bad filter
    /// syntax, unknown field).
    #[error("predicate rejected by {url}: {message} (where: {predicate})")]
    PredicateRejected {
        url: String,
        predicate: String,
        message: String,
    },

    /// Valid JSON without the expected shape.
    #[error("malformed response from {url} during {step}: {reason}")]
    MalformedResponse {
        url: String,
        step: &'static str,
        reason: String,
    },
}

impl FetchError {
    pub(crate) fn unavailable(url: &str, step: &'static str, reason: impl Into<String>) -> Self {
        FetchError::EndpointUnavailable {
            url: url.to_string(),
            step,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(url: &str, step: &'static str, reason: impl Into<String>) -> Self {
        FetchError::MalformedResponse {
            url: url.to_string(),
            step,
            reason: reason.into(),
        }
    }
}
