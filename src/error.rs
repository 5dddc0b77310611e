use std::path::PathBuf;
use thiserror::Error;

/// Non-fatal problems met while scanning or deleting.
#[derive(Error, Debug)]
pub enum BuddyError {
    /// A configured root is missing or is not a directory.
    #[error("monitor path does not exist: {}", .0.display())]
    RootNotDirectory(PathBuf),

    #[error("permission denied for {}", .0.display())]
    PermissionDenied(PathBuf),

    /// Directory traversal failed below a root. walkdir's message already
    /// names the path.
    #[error("{source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("error checking file {}: {source}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to delete {}: {source}", .path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuddyError {
    /// Classify an I/O failure on `path` as a stat error, folding
    /// permission problems into their own variant.
    pub fn metadata(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            Self::PermissionDenied(path)
        } else {
            Self::Metadata { path, source }
        }
    }

    pub fn walk(source: walkdir::Error) -> Self {
        let path = source.path().map(|p| p.to_path_buf()).unwrap_or_default();
        let denied = source
            .io_error()
            .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied);
        if denied {
            Self::PermissionDenied(path)
        } else {
            Self::Walk { path, source }
        }
    }

    /// Classify a failed stat of a walked entry. Only I/O failures are
    /// stat errors; anything else walkdir reports stays a traversal error.
    pub fn entry(path: PathBuf, source: walkdir::Error) -> Self {
        match source.io_error() {
            Some(io) => Self::metadata(path, std::io::Error::new(io.kind(), io.to_string())),
            None => Self::walk(source),
        }
    }
}

/// Misuse of the scan/delete cycle.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CycleError {
    #[error("a scan or deletion is already in progress")]
    Busy,

    #[error("no candidate list is waiting for confirmation")]
    NotAwaitingConfirmation,
}

/// Rejected values from the settings form.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SettingsError {
    #[error("threshold of {value} days is outside {min}..={max}")]
    ThresholdOutOfRange { value: u32, min: u32, max: u32 },

    #[error("folder is already monitored: {}", .0.display())]
    DuplicateRoot(PathBuf),

    #[error("folder path is empty")]
    EmptyRoot,
}
