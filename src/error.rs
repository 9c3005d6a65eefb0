use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    /// Malformed private key, missing field, unreadable config.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}: {body}")]
    UnexpectedStatus {
        url: String,
        status: u16,
        body: String,
    },

    #[error("token exchange did not finish within {0:?}")]
    Timeout(Duration),

    /// The body could not be decoded into the expected shape. Status and raw
    /// body are kept for diagnostics.
    #[error("error decoding response from {url} with status {status}: {source}; body: {body}")]
    Decode {
        url: String,
        status: u16,
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

impl TokenError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        TokenError::Configuration(msg.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, TokenError::Configuration(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            TokenError::Transport { .. } | TokenError::UnexpectedStatus { .. } | TokenError::Timeout(_)
        )
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, TokenError::Decode { .. })
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        TokenError::Configuration(format!("invalid app private key: {}", e))
    }
}
