/// Convenient result alias for updater operations.
pub type Result<T> = std::result::Result<T, UpdaterError>;

/// Boxed cause attached to a failed operation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while checking for, retrieving or applying an
/// update. One variant per failure domain so callers can branch on the kind
/// instead of parsing messages.
#[derive(thiserror::Error, Debug)]
pub enum UpdaterError {
    /// The OS reports no usable network interface.
    #[error("no active network connection")]
    NetworkUnavailable,
    /// A mandatory configuration value was missing or empty.
    #[error("configuration value `{0}` must be present and non-empty")]
    Config(&'static str),
    /// Fetching or parsing the remote version marker failed.
    #[error("failed to read remote version marker: {0}")]
    VersionFetch(#[source] BoxError),
    /// The artifact download failed to start or the transfer errored.
    #[error("failed to download update artifact: {0}")]
    UpdateFetch(#[source] BoxError),
    /// Fetching or storing the changelog failed.
    #[error("failed to retrieve changelog: {0}")]
    Changelog(#[source] BoxError),
    /// The downloaded artifact could not be launched.
    #[error("failed to run update: {0}")]
    Run(#[source] BoxError),
    /// Local filesystem upkeep failed.
    #[error("filesystem operation failed: {0}")]
    Io(#[from] std::io::Error),
}

impl UpdaterError {
    pub(crate) fn version_fetch(cause: impl Into<BoxError>) -> Self {
        UpdaterError::VersionFetch(cause.into())
    }

    pub(crate) fn update_fetch(cause: impl Into<BoxError>) -> Self {
        UpdaterError::UpdateFetch(cause.into())
    }

    pub(crate) fn changelog(cause: impl Into<BoxError>) -> Self {
        UpdaterError::Changelog(cause.into())
    }

    pub(crate) fn run(cause: impl Into<BoxError>) -> Self {
        UpdaterError::Run(cause.into())
    }
}

/// Result alias for transport-level operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Failure inside the transport while talking to a remote endpoint. The
/// updater wraps these into the matching [`UpdaterError`] kind, so transport
/// types never appear in the public error surface.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// The HTTP request failed or the server answered with an error status.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Writing downloaded data to disk failed.
    #[error("writing downloaded data failed: {0}")]
    Io(#[from] std::io::Error),
    /// Transport-specific failure with no richer cause.
    #[error("{0}")]
    Other(String),
}
