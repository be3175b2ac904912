use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid response encoding: {0}")]
    InvalidEncoding(String),
}

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Remote store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed listing response: {0}")]
    MalformedListing(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Store lock poisoned")]
    Poisoned,

    #[error("Corrupt row {id}: {reason}")]
    CorruptRow { id: i64, reason: String },
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Not authorized: no access token")]
    NotAuthorized,

    #[error("Remote store: {0}")]
    Remote(#[from] RemoteError),

    #[error("Local store: {0}")]
    Store(#[from] StoreError),

    #[error("Malformed recipe collection: {0}")]
    Serde(#[from] serde_json::Error),
}
