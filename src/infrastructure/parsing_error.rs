//! Pipeline-level error types
//!
//! Missing HTML elements are not errors; parsers fill in empty values instead.
//! Everything here aborts the processing of a single product URL.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("HTTP request failed: {url} - {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP request failed with status {status}: {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Render API rejected {url}: {status} - {message}")]
    RenderApi {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Render API returned an unusable response for {url}: {reason}")]
    RenderResponse { url: String, reason: String },

    #[error("Render API key is not configured")]
    MissingApiKey,

    #[error("No parser available for URL: {url}")]
    UnsupportedSource { url: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl ScrapeError {
    pub fn http(url: &str, source: reqwest::Error) -> Self {
        Self::Http {
            url: url.to_string(),
            source,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether trying the same URL again later could succeed
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Http { .. } => true,
            Self::HttpStatus { status, .. } | Self::RenderApi { status, .. } => {
                *status == 429 || *status >= 500
            }
            Self::RenderResponse { .. } => true,
            Self::MissingApiKey | Self::UnsupportedSource { .. } | Self::Configuration { .. } => false,
        }
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;
