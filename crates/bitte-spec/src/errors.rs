use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Code used when a validator reports a problem without one of its own.
pub const OPENAPI_ERROR: &str = "OPENAPI_ERROR";
pub const INVALID_SPEC_FORMAT: &str = "INVALID_SPEC_FORMAT";
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";

/// A single validation problem as handed back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub message: String,
    #[serde(default)]
    pub code: String,
}

impl ErrorObject {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
        }
    }

    /// An error whose originating validator supplied no code.
    pub fn uncoded(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: String::new(),
        }
    }

    /// The code to show users, falling back to [`OPENAPI_ERROR`].
    pub fn code_or_default(&self) -> &str {
        if self.code.is_empty() {
            OPENAPI_ERROR
        } else {
            &self.code
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("response is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("Failed to fetch {url} after {retries} retries: {source}")]
    Exhausted {
        url: String,
        retries: u32,
        #[source]
        source: Box<FetchError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_code_falls_back_to_openapi_error() {
        assert_eq!(ErrorObject::uncoded("boom").code_or_default(), OPENAPI_ERROR);
        assert_eq!(ErrorObject::new("", "boom").code_or_default(), OPENAPI_ERROR);
        assert_eq!(ErrorObject::new(" ", "boom").code_or_default(), " ");
        assert_eq!(ErrorObject::new("X", "boom").code_or_default(), "X");
    }

    #[test]
    fn exhausted_names_url_and_retry_count() {
        let e = FetchError::Exhausted {
            url: "https://example.com/spec.json".into(),
            retries: 3,
            source: Box::new(FetchError::Status(500)),
        };
        assert_eq!(
            e.to_string(),
            "Failed to fetch https://example.com/spec.json after 3 retries: HTTP error! status: 500"
        );
    }
}
