use thiserror::Error;

pub type ResolveResult<T> = Result<T, ResolveError>;

/// listing-level errors abort the batch, everything else is caught per
/// channel and the batch keeps going
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("network error after {attempts} attempts for {url}: {source}")]
    Network {
        url: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("upstream returned {status} for {url}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("expected pattern not found: {0}")]
    Parse(String),

    #[error("server lookup failed: {0}")]
    Lookup(String),

    #[error("no channels found in listing page")]
    NoChannelsFound,
}
