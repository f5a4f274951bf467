use thiserror::Error;

/// Errors originating from the conversion pipeline and its collaborators.
///
/// Every variant is recoverable: shells report the message and keep the
/// previously produced art untouched.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Source file missing, unreadable, or in an unsupported format.
    #[error("Impossible de décoder {path} : {reason}")]
    DecodeFailure {
        /// Path of the source file.
        path: String,
        /// Underlying decoder message.
        reason: String,
    },

    /// Zero-area or corrupt grid reaching the adjustment stage.
    #[error("Image invalide : {0}")]
    InvalidImage(String),

    /// Degenerate source or resample target.
    #[error("Dimensions invalides : {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// I/O or encoding failure while writing an export.
    #[error("Échec de l'export vers {path} : {reason}")]
    ExportFailure {
        /// Destination path.
        path: String,
        /// Underlying error message.
        reason: String,
    },

    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),
}

impl CoreError {
    /// Build an `ExportFailure` from any displayable error.
    pub fn export(path: impl AsRef<std::path::Path>, reason: impl std::fmt::Display) -> Self {
        Self::ExportFailure {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Build a `DecodeFailure` from any displayable error.
    pub fn decode(path: impl AsRef<std::path::Path>, reason: impl std::fmt::Display) -> Self {
        Self::DecodeFailure {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_dimensions_message_carries_sizes() {
        let err = CoreError::InvalidDimensions {
            width: 0,
            height: 12,
        };
        assert!(err.to_string().contains("0×12"));
    }

    #[test]
    fn export_helper_keeps_path() {
        let err = CoreError::export("out/art.txt", "disk full");
        match err {
            CoreError::ExportFailure { path, reason } => {
                assert_eq!(path, "out/art.txt");
                assert_eq!(reason, "disk full");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
