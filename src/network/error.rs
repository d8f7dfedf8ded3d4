/// Failures talking to the AyurTrace backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),

    /// The request never produced a response (refused, reset, DNS...).
    #[error("network error: {0}")]
    Transport(String),

    /// The backend answered with a non-success HTTP status.
    #[error("server returned HTTP {status}")]
    Status { status: u16 },

    /// The body was not the JSON we expected.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// HTTP succeeded but the payload reported `status != "success"`.
    #[error("{0}")]
    Rejected(String),
}
