//! Error types

use std::io;
use thiserror::Error;

/// Errors that stop the governor before the monitoring loop starts.
#[derive(Error, Debug)]
pub enum GovernorError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, GovernorError>;

impl GovernorError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        GovernorError::Config(msg.into())
    }
}

/// Failure of a single suspend or resume action.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("process {0} no longer exists")]
    Vanished(u32),

    #[error("permission denied signalling process {0}")]
    PermissionDenied(u32),

    #[error("failed to signal process {pid}: {source}")]
    Os { pid: u32, source: io::Error },
}

impl ActionError {
    pub fn from_errno(pid: u32, err: io::Error) -> Self {
        match err.raw_os_error() {
            Some(libc::ESRCH) => ActionError::Vanished(pid),
            Some(libc::EPERM) => ActionError::PermissionDenied(pid),
            _ => ActionError::Os { pid, source: err },
        }
    }

    pub fn is_vanished(&self) -> bool {
        matches!(self, ActionError::Vanished(_))
    }
}

/// Delivery failure of a notification. Always swallowed by the dispatcher.
#[derive(Error, Debug)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);
