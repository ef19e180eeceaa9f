//! Error taxonomy shared by the three stages.

use thiserror::Error;

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Every stage invocation fails with exactly one of these. None of them are
/// recovered from inside a stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A reference or parameter was missing or malformed. Raised before any
    /// store I/O happens.
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("failed to fetch {uri}: {source}")]
    StoreFetch {
        uri: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to store {uri}: {source}")]
    StoreWrite {
        uri: String,
        #[source]
        source: anyhow::Error,
    },

    /// Fetched bytes did not decode into a frequency table.
    #[error("failed to parse {uri}: {message}")]
    Parse { uri: String, message: String },
}

impl PipelineError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Stable machine-readable code, reported alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::StoreFetch { .. } => "store_fetch",
            Self::StoreWrite { .. } => "store_write",
            Self::Parse { .. } => "parse",
        }
    }

    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::BadRequest(_))
    }
}
