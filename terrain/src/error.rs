use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerrainError {
    #[error("missing required parameters")]
    Builder,

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("invalid source configuration: {0}")]
    Config(String),

    /// The source cannot resolve any point: a missing raster path, a
    /// directory without height files, an unreadable tile, or an HTTP
    /// client that could not be built.
    #[error("elevation source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("profile cancelled")]
    Cancelled,
}

impl TerrainError {
    /// Returns true for errors that prevent any sample from being
    /// resolved, as opposed to a malformed request.
    pub fn is_source_unavailable(&self) -> bool {
        matches!(self, Self::SourceUnavailable(_))
    }
}
