use thiserror::Error;

pub type ListingResult<T> = Result<T, ListingError>;

/// Failures a listing section can hit between a click and a re-render.
#[derive(Debug, Error)]
pub enum ListingError {
    /// Section root is missing a data attribute or one of its region containers.
    #[error("listing section misconfigured: {0}")]
    Configuration(String),

    #[error("search request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-reqwest clients report transport failures as plain text.
    #[error("search transport failed: {0}")]
    Transport(String),

    #[error("search response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("search response has no results summary")]
    MissingSummary,

    #[error("invalid listing settings: {0}")]
    Settings(String),
}
