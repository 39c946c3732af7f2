//! The backend wraps every JSON response in `{status, code, message, results}`.

use serde::Deserialize;
use thiserror::Error;

use crate::infra::secrets::{redact_text, sanitize_error_code};

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "none_results")]
    pub results: Option<T>,
}

fn none_results<T>() -> Option<T> {
    None
}

#[derive(Debug, Error)]
pub enum GowaError {
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned HTTP {http_status}: {message}")]
    Backend {
        http_status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("backend response for {context} was not the expected envelope: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("backend envelope for {context} carried no results")]
    MissingResults { context: &'static str },
}

impl GowaError {
    pub fn backend_code(&self) -> Option<&str> {
        match self {
            Self::Backend { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Backend { http_status, .. } => Some(*http_status),
            Self::Transport(source) => source.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.http_status() == Some(401)
    }

    /// The backend refuses `/app/login` when a device is already linked. The
    /// condition is recoverable and detected the way the dashboard did it: a
    /// substring match on the reported message or code.
    pub fn is_already_logged_in(&self) -> bool {
        let Self::Backend { code, message, .. } = self else {
            return false;
        };

        message.to_ascii_lowercase().contains("already logged in")
            || message.contains("ALREADY_LOGGED_IN")
            || code
                .as_deref()
                .is_some_and(|code| code.contains("ALREADY_LOGGED_IN"))
    }
}

/// Log-safe rendering of a backend error: the sanitized backend code plus the
/// display text with credential-looking chunks redacted. Backend message text
/// is attacker-influenced and may echo request headers.
pub fn describe_for_log(error: &GowaError) -> String {
    format!(
        "{}: {}",
        sanitize_error_code(error.backend_code().unwrap_or_default()),
        redact_text(&error.to_string())
    )
}

/// Builds the error for a non-2xx response: backend-provided message/code when
/// the body parses as an envelope, raw body text otherwise.
pub fn error_from_response(http_status: u16, body: &str) -> GowaError {
    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        code: Option<String>,
        #[serde(default)]
        message: Option<String>,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => {
            let message = parsed
                .message
                .clone()
                .or_else(|| parsed.code.clone())
                .unwrap_or_else(|| body.to_owned());
            GowaError::Backend {
                http_status,
                code: parsed.code,
                message,
            }
        }
        Err(_) => GowaError::Backend {
            http_status,
            code: None,
            message: body.to_owned(),
        },
    }
}

/// Unwraps a 2xx body into its `results` payload.
pub fn decode_results<T: serde::de::DeserializeOwned>(
    context: &'static str,
    body: &str,
) -> Result<T, GowaError> {
    let envelope: Envelope<T> =
        serde_json::from_str(body).map_err(|source| GowaError::Decode { context, source })?;

    envelope
        .results
        .ok_or(GowaError::MissingResults { context })
}
