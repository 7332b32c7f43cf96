/// Convenience result type used across loglayout.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Top-level error taxonomy used by layout APIs.
#[derive(thiserror::Error, Debug)]
pub enum LayoutError {
    /// A layout tree is wired incorrectly (missing body, unknown reference, ...).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A layout was used outside of its `Initialized` state.
    #[error("lifecycle error: {0}")]
    Lifecycle(String),

    /// A layout failed to produce text for an event.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing configs and events.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Errors from sinks writing rendered output.
    #[error("io error: {0}")]
    Io(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LayoutError {
    /// Build a [`LayoutError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`LayoutError::Lifecycle`] value.
    pub fn lifecycle(msg: impl Into<String>) -> Self {
        Self::Lifecycle(msg.into())
    }

    /// Build a [`LayoutError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`LayoutError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`LayoutError::Io`] value.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
