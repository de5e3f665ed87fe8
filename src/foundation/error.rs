/// Crate-wide result alias.
pub type MosaicResult<T> = Result<T, MosaicError>;

/// Errors surfaced by the capture, alignment and preview paths.
///
/// Alignment outcomes (weak alignment, rejected frames, cancellation) are reported as
/// [`MosaicStatus`](crate::MosaicStatus) values, not errors.
#[derive(thiserror::Error, Debug)]
pub enum MosaicError {
    /// Caller passed a buffer or argument of the wrong shape.
    #[error("validation error: {0}")]
    Validation(String),

    /// A transform could not be inverted or converted.
    #[error("transform error: {0}")]
    Transform(String),

    /// Shared or per-tier pixel buffer misuse.
    #[error("buffer error: {0}")]
    Buffer(String),

    /// Session operation invoked in the wrong state.
    #[error("session error: {0}")]
    Session(String),

    /// GPU backend failure.
    #[error("render error: {0}")]
    Render(String),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Output buffer allocation failed.
    #[error("allocation error: {0}")]
    Allocation(String),

    /// Anything else, with its source preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MosaicError {
    /// Build a [`MosaicError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MosaicError::Transform`].
    pub fn transform(msg: impl Into<String>) -> Self {
        Self::Transform(msg.into())
    }

    /// Build a [`MosaicError::Buffer`].
    pub fn buffer(msg: impl Into<String>) -> Self {
        Self::Buffer(msg.into())
    }

    /// Build a [`MosaicError::Session`].
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }

    /// Build a [`MosaicError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`MosaicError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`MosaicError::Allocation`].
    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::Allocation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
