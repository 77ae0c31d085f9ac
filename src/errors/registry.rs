// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for process type registration and instantiation.

use crate::errors::definition::join_issues;
use crate::errors::{ProcessError, ValidationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    /// No factory is registered under the requested type name.
    #[error("No such process type: '{type_name}'")]
    NoSuchType { type_name: String },

    /// A second registration was attempted for a type name.
    #[error("Process type '{type_name}' is already registered")]
    TypeAlreadyExists { type_name: String },

    /// Cluster definitions offered for registration failed validation.
    #[error("Refusing to register invalid cluster definitions:\n{}", join_issues(.issues))]
    InvalidDefinitions { issues: Vec<ValidationError> },

    /// The factory for a known type refused to build the process.
    #[error("Failed to create process '{name}' of type '{type_name}': {source}")]
    Construction {
        type_name: String,
        name: String,
        #[source]
        source: ProcessError,
    },
}
