//! Error types for XTab
//!
//! Validation and remote errors are shown to the user as a transient
//! notification; storage parse errors never reach this type because loads
//! recover with an empty or default value.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum XTabError {
    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl XTabError {
    pub fn validation(message: impl Into<String>) -> Self {
        XTabError::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, XTabError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, XTabError>;

/// Turn a non-success HTTP response into `XTabError::Remote`
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(XTabError::Remote(remote_message(status.as_u16(), &body)))
}

/// Pull the service's own message out of an error body.
///
/// PostgREST puts it at `/message`, Google APIs at `/error/message`; anything
/// else is passed through raw.
pub(crate) fn remote_message(status: u16, body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/message")
                .or_else(|| v.pointer("/error/message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string());

    if message.is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {}: {}", status, message)
    }
}
