// crates/core/src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by payload shape validation, before any job exists.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("particles must be between 1 and {max}, got {got}")]
    ParticlesOutOfRange { got: u32, max: u32 },

    #[error("steps must be between 1 and {max}, got {got}")]
    StepsOutOfRange { got: u64, max: u64 },

    #[error("coupling must be a finite value in (0, {max}], got {got}")]
    CouplingOutOfRange { got: f64, max: f64 },

    #[error("unknown preset: {id}")]
    UnknownPreset { id: String },
}

/// Errors raised by a simulation engine while a job is running.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("simulation diverged at step {step}: {message}")]
    Diverged { step: u64, message: String },

    #[error("engine internal error: {0}")]
    Internal(String),
}

/// Errors that can occur while writing an export file.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export directory not found: {path}")]
    DirNotFound { path: PathBuf },

    #[error("permission denied writing export: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("export name is empty after sanitization: {name:?}")]
    EmptyName { name: String },

    #[error("data is not JSON-serializable: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ExportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::DirNotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_error_display() {
        let err = PayloadError::StepsOutOfRange { got: 0, max: 10_000_000 };
        assert!(err.to_string().contains("steps"));
        assert!(err.to_string().contains("got 0"));
    }

    #[test]
    fn test_export_error_io_classification() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = ExportError::io("/tmp/exports", io_err);
        assert!(matches!(err, ExportError::DirNotFound { .. }));

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ExportError::io("/tmp/exports", io_err);
        assert!(matches!(err, ExportError::PermissionDenied { .. }));

        let io_err = std::io::Error::new(std::io::ErrorKind::TimedOut, "timeout");
        let err = ExportError::io("/tmp/exports", io_err);
        assert!(matches!(err, ExportError::Io { .. }));
    }

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::Diverged { step: 412, message: "energy blew up".into() };
        assert!(err.to_string().contains("step 412"));
    }
}
