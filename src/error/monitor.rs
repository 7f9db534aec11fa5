use std::{io, path::PathBuf};

use filecast_error::{BrokerError, ErrorExt, StackError, StatusCode};
use thiserror::Error;

pub type MonitorResult<T> = Result<T, MonitorError>;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Path {path} is outside of the watched root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("Path {0} is not valid UTF-8")]
    NonUtf8Path(PathBuf),

    #[error("File watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Broker error: {0}")]
    Broker(#[from] BrokerError),

    #[error("Audit log error: {0}")]
    Audit(#[from] StackError),
}

impl ErrorExt for MonitorError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Read { source, .. } => match source.kind() {
                io::ErrorKind::NotFound => StatusCode::NotFound,
                io::ErrorKind::PermissionDenied => StatusCode::PermissionDenied,
                io::ErrorKind::InvalidData => StatusCode::InvalidUtf8,
                _ => StatusCode::Io,
            },
            Self::OutsideRoot { .. } => StatusCode::OutsideRoot,
            Self::NonUtf8Path(_) => StatusCode::InvalidUtf8,
            Self::Watch(_) => StatusCode::WatchFailed,
            Self::Broker(e) => e.status_code(),
            Self::Audit(e) => e.status_code(),
        }
    }

    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        let mut tags = vec![
            ("error_type", "monitor".to_string()),
            ("status_code", self.status_code().to_string()),
        ];
        match self {
            Self::Read { path, .. } | Self::OutsideRoot { path, .. } | Self::NonUtf8Path(path) => {
                tags.push(("path", path.display().to_string()))
            }
            Self::Broker(e) => tags.extend(e.metrics_tags().into_iter().skip(2)),
            Self::Watch(_) | Self::Audit(_) => {}
        }
        tags
    }
}
