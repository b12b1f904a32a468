//! Errors produced while serving a directory endpoint request.

use std::io;

/// Failure of a single directory endpoint request.
///
/// Every variant names the path that was attempted so operators can tell
/// permission problems from missing files straight from the response.
#[derive(Debug, thiserror::Error)]
pub enum DirError {
    /// Neither the directory-open nor the file-open succeeded.
    #[error("Cannot open `{path}'")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A read on an opened file failed; buffered bytes are discarded.
    #[error("Cannot read `{path}'")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Closing a fully enumerated directory failed.
    ///
    /// Unreachable under a sane OS, reported as a fatal condition.
    #[error("Cannot close directory `{path}'")]
    EnumerationClose {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The resolved path leaves the base directory (only with `confine_to_base`).
    #[error("`{path}' is outside the base directory")]
    OutsideBase { path: String },
}

impl DirError {
    /// Path the failed operation was attempted on
    pub fn path(&self) -> &str {
        match self {
            Self::Open { path, .. }
            | Self::Read { path, .. }
            | Self::EnumerationClose { path, .. }
            | Self::OutsideBase { path } => path,
        }
    }

    /// Underlying OS error, if any
    pub const fn os_error(&self) -> Option<&io::Error> {
        match self {
            Self::Open { source, .. }
            | Self::Read { source, .. }
            | Self::EnumerationClose { source, .. } => Some(source),
            Self::OutsideBase { .. } => None,
        }
    }

    /// Whether the error signals an invariant violation rather than a bad request
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::EnumerationClose { .. })
    }

    /// Message shown to the caller: the failed operation plus the OS description.
    ///
    /// The OS description carries the raw error code, e.g. `(os error 2)`.
    pub fn user_message(&self) -> String {
        match self.os_error() {
            Some(source) => format!("{self}: {source}"),
            None => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_message_names_path_and_os_error() {
        let err = DirError::Open {
            path: "/no/such".to_string(),
            source: io::Error::from_raw_os_error(2),
        };
        let message = err.user_message();
        assert!(message.starts_with("Cannot open `/no/such'"));
        assert!(message.contains("os error 2"));
        assert_eq!(err.path(), "/no/such");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_outside_base_has_no_os_error() {
        let err = DirError::OutsideBase {
            path: "/srv/../etc".to_string(),
        };
        assert!(err.os_error().is_none());
        assert_eq!(err.user_message(), "`/srv/../etc' is outside the base directory");
    }

    #[test]
    fn test_close_failure_is_fatal() {
        let err = DirError::EnumerationClose {
            path: "/var".to_string(),
            source: io::Error::other("bad handle"),
        };
        assert!(err.is_fatal());
        assert_eq!(err.user_message(), "Cannot close directory `/var': bad handle");
    }
}
