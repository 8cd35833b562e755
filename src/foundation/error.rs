/// Convenience result type used across portada.
pub type PortadaResult<T> = Result<T, PortadaError>;

/// Top-level error taxonomy used by composer, renderer and storage APIs.
///
/// None of these are fatal to a running session: the session boundary turns them into
/// "nothing happened" outcomes (see [`crate::CoverSession`]).
#[derive(thiserror::Error, Debug)]
pub enum PortadaError {
    /// Invalid user-provided configuration or input data.
    #[error("validation error: {0}")]
    Validation(String),

    /// An encoded image payload could not be read or decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Errors while painting or flattening a layer stack.
    #[error("render error: {0}")]
    Render(String),

    /// Durable local storage could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PortadaError {
    /// Build a [`PortadaError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PortadaError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`PortadaError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`PortadaError::Storage`] value.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Build a [`PortadaError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
