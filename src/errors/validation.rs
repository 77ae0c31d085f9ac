// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Problems found while validating a cluster definition file
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Two definitions share a cluster type name
    DuplicateClusterType {
        cluster_type: String,
    },
    /// Two constituents inside one definition share a local name
    DuplicateConstituent {
        cluster_type: String,
        name: String,
    },
    /// A mapping or connection names a constituent the definition never declares
    UnknownConstituent {
        cluster_type: String,
        name: String,
        /// Where the reference was found ("input", "output", "connection")
        context: &'static str,
    },
    /// A config mapping reads a cluster key the definition never declares
    UndeclaredClusterKey {
        cluster_type: String,
        name: String,
        key: String,
    },
    /// Cluster types nest each other in a loop and could never be built
    CyclicNesting {
        /// The cycle path, first type repeated at the end
        cycle: Vec<String>,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateClusterType { cluster_type } => {
                write!(f, "Duplicate cluster type: '{}'", cluster_type)
            }
            ValidationError::DuplicateConstituent { cluster_type, name } => {
                write!(
                    f,
                    "Cluster '{}' declares process '{}' more than once",
                    cluster_type, name
                )
            }
            ValidationError::UnknownConstituent {
                cluster_type,
                name,
                context,
            } => {
                write!(
                    f,
                    "Cluster '{}' references unknown process '{}' in {}",
                    cluster_type, name, context
                )
            }
            ValidationError::UndeclaredClusterKey {
                cluster_type,
                name,
                key,
            } => {
                write!(
                    f,
                    "Cluster '{}' maps undeclared key '{}' into process '{}'",
                    cluster_type, key, name
                )
            }
            ValidationError::CyclicNesting { cycle } => {
                write!(f, "Cyclic cluster nesting detected: {}", cycle.join(" -> "))
            }
        }
    }
}

impl std::error::Error for ValidationError {}
