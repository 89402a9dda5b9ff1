use jobfair_core::validation::FieldErrors;

/// Errors from the job-fair REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, body decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API refused the request: a 4xx status, or a 2xx envelope that
    /// still carried `errors`.
    #[error("Request rejected ({status}): {message}")]
    Rejected {
        status: u16,
        message: String,
        field_errors: FieldErrors,
    },

    /// The API failed on its side (5xx).
    #[error("Job fair API error ({status}): {body}")]
    Server { status: u16, body: String },

    /// A successful response body was not a valid envelope.
    #[error("Could not decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },

    /// A successful response did not carry the expected `data`.
    #[error("Response from {endpoint} had no data")]
    MissingData { endpoint: String },
}
