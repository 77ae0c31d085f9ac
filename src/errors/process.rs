// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by processes: lifecycle violations, configuration failures and
//! attempts to run something that is not runnable.

use crate::errors::{ClusterError, ConfigError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    /// A cluster is structural sugar and has no step of its own.
    #[error("Process cluster '{name}' cannot be stepped; it must be flattened into its constituents")]
    ClusterNotExecutable { name: String },

    #[error("Process '{name}' has already been configured")]
    AlreadyConfigured { name: String },

    #[error("Process '{name}' has not been configured")]
    NotConfigured { name: String },

    #[error("Process '{name}' has already been initialized")]
    AlreadyInitialized { name: String },

    #[error("Process '{name}' has not been initialized")]
    NotInitialized { name: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A factory failed while assembling a cluster.
    #[error(transparent)]
    Cluster(Box<ClusterError>),
}

impl From<ClusterError> for ProcessError {
    fn from(error: ClusterError) -> Self {
        ProcessError::Cluster(Box::new(error))
    }
}
