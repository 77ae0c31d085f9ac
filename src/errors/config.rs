// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by the configuration store.

use thiserror::Error;

/// The store operation that tripped over a read-only key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOnlyOperation {
    Set,
    Unset,
}

impl std::fmt::Display for ReadOnlyOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadOnlyOperation::Set => write!(f, "set"),
            ReadOnlyOperation::Unset => write!(f, "unset"),
        }
    }
}

/// Errors that can occur while reading or writing a [`Config`](crate::config::Config).
///
/// Only [`MissingKey`](ConfigError::MissingKey) and [`BadCast`](ConfigError::BadCast)
/// are recoverable through the `*_or` accessors; everything else propagates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The key has no value in the store.
    #[error("No such configuration value: '{key}'")]
    MissingKey { key: String },

    /// The stored text could not be coerced into the requested type.
    #[error("Failed to cast configuration value '{key}' = '{value}' to {target}")]
    BadCast {
        key: String,
        value: String,
        target: &'static str,
    },

    /// A set or unset was attempted on a key marked read-only.
    #[error("Cannot {operation} read-only configuration value '{key}'")]
    ReadOnlyViolation {
        key: String,
        operation: ReadOnlyOperation,
    },
}
