//! Error types shared by the import pipeline and the destination client.

/// Failure talking to the destination calendar store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("destination responded with {status}: {message}")]
    Status { status: u16, message: String },
    #[error("could not decode destination response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid destination URL: {0}")]
    InvalidUrl(String),
}

/// Failure of an import as a whole.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("could not fetch document: {0}")]
    Fetch(String),
    #[error("the iCal file has an invalid format: {0}")]
    MalformedFormat(String),
    #[error("empty iCal file")]
    EmptyDocument,
    #[error("destination rejected event '{uid}': {source}")]
    Create {
        uid: String,
        #[source]
        source: StoreError,
    },
}

impl ImportError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        ImportError::MalformedFormat(message.into())
    }
}

impl From<ical::parser::ParserError> for ImportError {
    fn from(err: ical::parser::ParserError) -> Self {
        ImportError::MalformedFormat(err.to_string())
    }
}

impl From<rrule::RRuleError> for ImportError {
    fn from(err: rrule::RRuleError) -> Self {
        ImportError::MalformedFormat(err.to_string())
    }
}
