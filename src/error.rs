//! Error types for the voxel atlas pipeline.

use thiserror::Error;

/// Result type alias using AtlasError.
pub type Result<T> = std::result::Result<T, AtlasError>;

/// Main error type for palette, atlas and export operations.
#[derive(Error, Debug)]
pub enum AtlasError {
    /// Configuration value out of its allowed range.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A voxel sample carried a color that cannot be mapped to 8-bit channels.
    #[error("Invalid voxel sample #{index}: {reason}")]
    InvalidSample { index: usize, reason: String },

    /// A palette index outside the atlas grid reached the UV mapper.
    #[error("Palette index {index} is outside the atlas grid of {tile_count} tiles")]
    ContractViolation { index: usize, tile_count: usize },

    /// Tried to persist an atlas built from an empty palette.
    #[error("Atlas is empty: no palette entries to write")]
    EmptyAtlas,

    /// Failed to encode or process an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to export a scene.
    #[error("Export error: {0}")]
    Export(String),
}

/// Outcome of a run that honours cooperative cancellation.
///
/// Cancellation is not a failure, so it is reported here rather than through
/// [`AtlasError`].
#[derive(Debug, Clone, PartialEq)]
pub enum Completion<T> {
    /// The run finished and produced a value.
    Completed(T),
    /// The caller requested early termination; partial results were dropped.
    Cancelled,
}

impl<T> Completion<T> {
    /// Check whether the run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Completion::Cancelled)
    }

    /// Get the completed value, if any.
    pub fn completed(self) -> Option<T> {
        match self {
            Completion::Completed(value) => Some(value),
            Completion::Cancelled => None,
        }
    }

    /// Map the completed value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Completion<U> {
        match self {
            Completion::Completed(value) => Completion::Completed(f(value)),
            Completion::Cancelled => Completion::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_helpers() {
        let done: Completion<u32> = Completion::Completed(3);
        assert!(!done.is_cancelled());
        assert_eq!(done.clone().map(|v| v * 2), Completion::Completed(6));
        assert_eq!(done.completed(), Some(3));

        let cancelled: Completion<u32> = Completion::Cancelled;
        assert!(cancelled.is_cancelled());
        assert_eq!(cancelled.completed(), None);
    }

    #[test]
    fn test_error_messages() {
        let err = AtlasError::ContractViolation { index: 9, tile_count: 4 };
        assert_eq!(
            err.to_string(),
            "Palette index 9 is outside the atlas grid of 4 tiles"
        );

        let err = AtlasError::InvalidSample { index: 2, reason: "channel is NaN".into() };
        assert!(err.to_string().contains("#2"));
    }
}
