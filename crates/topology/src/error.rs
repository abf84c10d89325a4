//! Discovery error types

use crate::backend::BackendKind;
use thiserror::Error;

/// Errors raised while discovering devices
///
/// The selector treats `AccessDenied` as soft everywhere and `Unavailable`
/// as soft while another backend remains; everything else is hard.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The backend could not open the device list due to permissions
    #[error("{backend}: access denied: {reason}")]
    AccessDenied {
        backend: BackendKind,
        reason: String,
    },

    /// The discovery mechanism itself could not run
    #[error("{backend}: backend unavailable: {reason}")]
    Unavailable {
        backend: BackendKind,
        reason: String,
    },

    /// A structured document from the backend could not be decoded
    #[error("{backend}: malformed output: {reason}")]
    Malformed {
        backend: BackendKind,
        reason: String,
    },

    /// No strategy was registered with the selector
    #[error("no discovery backends configured")]
    NoBackends,
}

impl DiscoveryError {
    pub fn access_denied(backend: BackendKind, reason: impl Into<String>) -> Self {
        Self::AccessDenied {
            backend,
            reason: reason.into(),
        }
    }

    pub fn unavailable(backend: BackendKind, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            backend,
            reason: reason.into(),
        }
    }

    pub fn malformed(backend: BackendKind, reason: impl Into<String>) -> Self {
        Self::Malformed {
            backend,
            reason: reason.into(),
        }
    }

    /// Backend that produced the error, if any
    pub fn backend(&self) -> Option<BackendKind> {
        match self {
            Self::AccessDenied { backend, .. }
            | Self::Unavailable { backend, .. }
            | Self::Malformed { backend, .. } => Some(*backend),
            Self::NoBackends => None,
        }
    }

    /// Whether the selector may move on to the next backend.
    ///
    /// `has_next` is false for the last backend in the preference order.
    pub fn is_soft(&self, has_next: bool) -> bool {
        match self {
            Self::AccessDenied { .. } => true,
            Self::Unavailable { .. } => has_next,
            Self::Malformed { .. } | Self::NoBackends => false,
        }
    }
}

/// Type alias for discovery results
pub type Result<T> = std::result::Result<T, DiscoveryError>;
