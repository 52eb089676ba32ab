//! Error definitions
//!
//! This module provides error types for testkit-mock.
//!
//! Every error here signals misuse of the framework itself: installing a
//! patcher twice, restoring one that is not installed, registering the same
//! module mock twice, or asking for a call that never happened. Errors raised
//! by a user-supplied implementation are never wrapped in this type; they are
//! recorded and then returned to the caller unchanged.

use thiserror::Error;

/// Main error type for testkit-mock
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A patcher was asked to install while it already holds a binding.
    #[error("patcher for `{property}` is already installed")]
    AlreadyInstalled {
        /// Name of the binding the patcher manages.
        property: String,
    },

    /// A patcher was asked to restore without being installed first.
    #[error("patcher for `{property}` is not installed")]
    NotInstalled {
        /// Name of the binding the patcher manages.
        property: String,
    },

    /// A module mock was registered twice in the same scope.
    #[error("module mock `{identifier}` is already registered in this scope")]
    DuplicateRegistration {
        /// The module identifier that was registered twice.
        identifier: String,
    },

    /// A call index past the end of the recorded history was requested.
    #[error("call {index} was never made: {count} call(s) recorded")]
    OutOfRange {
        /// The requested 1-indexed call number.
        index: usize,
        /// The number of calls actually recorded.
        count: usize,
    },
}

impl Error {
    /// Create an [`Error::AlreadyInstalled`] for the given binding name.
    #[must_use]
    pub fn already_installed(property: impl Into<String>) -> Self {
        Self::AlreadyInstalled {
            property: property.into(),
        }
    }

    /// Create an [`Error::NotInstalled`] for the given binding name.
    #[must_use]
    pub fn not_installed(property: impl Into<String>) -> Self {
        Self::NotInstalled {
            property: property.into(),
        }
    }

    /// Create an [`Error::DuplicateRegistration`] for the given identifier.
    #[must_use]
    pub fn duplicate_registration(identifier: impl Into<String>) -> Self {
        Self::DuplicateRegistration {
            identifier: identifier.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
