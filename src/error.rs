//! Error types.

use std::time::Duration;
use thiserror::Error;

/// Result alias for cache operations.
pub type Result<T> = std::result::Result<T, DnsCacheError>;

/// Errors returned by cache operations.
#[derive(Debug, Error)]
pub enum DnsCacheError {
    /// The name resolver could not resolve the host.
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        /// The host that was looked up.
        host: String,
        /// The underlying resolver error.
        #[source]
        source: std::io::Error,
    },

    /// The lookup did not finish within the given deadline.
    #[error("lookup of {host} timed out after {timeout:?}")]
    Timeout {
        /// The host that was looked up.
        host: String,
        /// The deadline that elapsed.
        timeout: Duration,
    },

    /// The cache was constructed outside a tokio runtime.
    #[error("no tokio runtime to run the refresh task: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

impl DnsCacheError {
    /// Returns the host this error relates to, if any.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        match self {
            Self::Resolve { host, .. } | Self::Timeout { host, .. } => Some(host.as_str()),
            Self::NoRuntime(_) => None,
        }
    }

    /// Returns `true` if the lookup was cut off by a deadline, either ours
    /// or one reported by the underlying resolver.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Resolve { source, .. } => source.kind() == std::io::ErrorKind::TimedOut,
            Self::NoRuntime(_) => false,
        }
    }
}
