//! Error types for the mimic crate.

use std::io;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while compiling or looking up fingerprints.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// JA3 string does not have the five comma-separated fields.
    #[error("Malformed JA3 descriptor: {0}")]
    MalformedDescriptor(String),

    /// A numeric JA3 token failed to convert.
    #[error("Invalid {field} token: {token:?}")]
    InvalidToken { field: &'static str, token: String },

    /// Signature algorithm is neither a known name nor a 16-bit hex value.
    #[error("{0} is not a valid supported signature algorithm")]
    InvalidSignatureAlgorithm(String),

    /// Extension id referenced by the descriptor has no catalogue entry.
    #[error("Unknown extension with id {0} provided")]
    UnknownExtension(u16),

    /// Profile name is not in the registry.
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// Named ClientHello identity could not be turned into a specification.
    #[error("No specification available for ClientHello identity {0}")]
    UnresolvedIdentity(String),

    /// HTTP/2 settings, settings order or pseudo-header order are inconsistent.
    #[error("Invalid HTTP/2 settings: {0}")]
    InvalidHttp2Settings(String),

    /// Cookie parsing error.
    #[error("Cookie parse error: {0}")]
    CookieParse(String),

    /// URL parsing error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a malformed descriptor error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDescriptor(message.into())
    }

    /// Create an invalid token error for the named JA3 field.
    pub fn invalid_token(field: &'static str, token: impl Into<String>) -> Self {
        Self::InvalidToken {
            field,
            token: token.into(),
        }
    }

    /// Create an HTTP/2 settings error.
    pub fn http2_settings(message: impl Into<String>) -> Self {
        Self::InvalidHttp2Settings(message.into())
    }

    /// Create a cookie parse error.
    pub fn cookie(message: impl Into<String>) -> Self {
        Self::CookieParse(message.into())
    }
}
