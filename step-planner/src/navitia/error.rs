//! Navitia client error types.

/// Errors from the navitia HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum NavitiaError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        /// Leading part of the offending body, for diagnostics.
        body: Option<String>,
    },

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the API
    #[error("rate limited by navitia API")]
    RateLimited,

    /// Invalid API key or unauthorized
    #[error("unauthorized: check PRIM_API_KEY")]
    Unauthorized,

    /// The API key cannot be sent as a header value
    #[error("invalid API key format")]
    InvalidApiKey,
}
