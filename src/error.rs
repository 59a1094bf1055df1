//! Error type shared by every stage of the mesh pipeline.
//!
//! Three failure families exist and none of them is retried:
//!
//! - **Configuration**: missing or empty station set, unknown padding
//!   strategy, parameters outside the range a generator accepts.
//! - **File format**: malformed model or elevation files. These always carry
//!   the 1-based line number of the offending line.
//! - **Domain**: unknown surface names and shape mismatches between the grid,
//!   the resistivity volume and elevation surfaces.

use thiserror::Error;

/// Error type for mesh construction, topography draping and model I/O.
#[derive(Debug, Error)]
pub enum MeshError {
    /// Invalid or incomplete configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed input file.
    #[error("File format error at line {line}: {message}")]
    FileFormat { line: usize, message: String },

    /// Inconsistent model state (unknown surface, shape mismatch).
    #[error("Domain error: {0}")]
    Domain(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MeshError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        MeshError::Configuration(message.into())
    }

    pub(crate) fn domain(message: impl Into<String>) -> Self {
        MeshError::Domain(message.into())
    }

    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        MeshError::FileFormat {
            line,
            message: message.into(),
        }
    }
}

/// Convenience alias for `Result<T, MeshError>`.
pub type Result<T> = std::result::Result<T, MeshError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_format_message_has_line() {
        let err = MeshError::format(7, "expected 3 values");
        assert_eq!(
            err.to_string(),
            "File format error at line 7: expected 3 values"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.rho");
        let err: MeshError = io.into();
        assert!(matches!(err, MeshError::Io(_)));
    }
}
