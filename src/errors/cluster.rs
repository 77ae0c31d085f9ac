// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for process cluster assembly.
//!
//! Every variant is raised before the cluster is mutated, so a failed call
//! leaves the cluster exactly as it was.

use crate::errors::{ConfigError, RegistryError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClusterError {
    /// A constituent with this local name was already added.
    #[error("Cluster '{cluster}' already has a process named '{name}'")]
    DuplicateName { cluster: String, name: String },

    /// A mapping or connection referenced a local name that was never added.
    #[error("Cluster '{cluster}' has no process named '{name}'")]
    NoSuchConstituent { cluster: String, name: String },

    /// The constituent does not declare the port in the required direction.
    #[error("Process '{process}' has no port named '{port}'")]
    NoSuchPort { process: String, port: String },

    /// The port is already claimed by another mapping.
    #[error("Port '{port}' on '{process}' is already mapped")]
    PortReconnect { process: String, port: String },

    /// Config mappings must be recorded before the constituent exists.
    #[error(
        "Cluster '{cluster}' cannot map '{key}' to '{name}:{mapped_key}' because '{name}' has already been added"
    )]
    MappingAfterConstituentExists {
        cluster: String,
        key: String,
        name: String,
        mapped_key: String,
    },

    /// The constituent's own configuration already protects the target key.
    #[error(
        "Cluster '{cluster}' cannot map '{key}' ('{value}') onto read-only '{name}:{mapped_key}' ('{ro_value}')"
    )]
    MappingToReadOnlyValue {
        cluster: String,
        key: String,
        value: String,
        name: String,
        mapped_key: String,
        ro_value: String,
    },

    /// A cluster type turned up inside its own construction.
    #[error("Cluster type '{cluster_type}' nests itself: {}", join_cycle(.cycle))]
    RecursiveNesting {
        cluster_type: String,
        /// Types being built, outermost first, ending with the repeated type
        cycle: Vec<String>,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

fn join_cycle(cycle: &[String]) -> String {
    cycle.join(" -> ")
}
