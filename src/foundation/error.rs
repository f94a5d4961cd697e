/// Convenience result type used across skinforge.
pub type SkinResult<T> = Result<T, SkinError>;

/// Top-level error taxonomy used by the compositing engine.
///
/// Per-representation failures are contained by the assembler; only
/// [`SkinError::Archive`] aborts a whole run.
#[derive(thiserror::Error, Debug)]
pub enum SkinError {
    /// Malformed input document (SVG or JSON). Fatal to that document only.
    #[error("parse error: {0}")]
    Parse(String),

    /// Missing or non-numeric placement geometry or document dimensions.
    /// Fatal to one substitution, not to the compositing pass.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// Invalid project configuration or CLI selector.
    #[error("validation error: {0}")]
    Validation(String),

    /// The skin archive could not be written or finalized. Fatal to the run.
    #[error("archive error: {0}")]
    Archive(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SkinError {
    /// Build a [`SkinError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`SkinError::Geometry`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Build a [`SkinError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SkinError::Archive`] value.
    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive(msg.into())
    }
}
