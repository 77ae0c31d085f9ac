// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for process cluster assembly and reconfiguration.
//!
//! This module contains message types for logging events related to:
//! * Config mappings recorded ahead of constituent creation
//! * Constituents joining a cluster
//! * Port mappings and internal connections
//! * Reconfiguration passes and rejected steps

use crate::observability::messages::StructuredLog;
use crate::pipeline::Connection;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A cluster key was scheduled for a constituent that does not exist yet.
///
/// # Log Level
/// `debug!` - Diagnostic information
pub struct ConfigMappingRecorded<'a> {
    pub cluster: &'a str,
    pub key: &'a str,
    pub name: &'a str,
    pub mapped_key: &'a str,
}

impl Display for ConfigMappingRecorded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cluster '{}' maps '{}' onto '{}:{}'",
            self.cluster, self.key, self.name, self.mapped_key
        )
    }
}

impl StructuredLog for ConfigMappingRecorded<'_> {
    fn log(&self) {
        tracing::debug!(
            cluster = self.cluster,
            key = self.key,
            constituent = self.name,
            mapped_key = self.mapped_key,
            "{}", self
        );
    }
}

/// A constituent was instantiated and registered in a cluster.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_sprocket::observability::messages::cluster::ConstituentAdded;
///
/// let msg = ConstituentAdded {
///     cluster: "chain",
///     name: "blur",
///     qualified_name: "chain/blur",
///     process_type: "passthrough",
///     mapped_keys: 1,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ConstituentAdded<'a> {
    pub cluster: &'a str,
    pub name: &'a str,
    pub qualified_name: &'a str,
    pub process_type: &'a str,
    pub mapped_keys: usize,
}

impl Display for ConstituentAdded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cluster '{}' added '{}' as '{}' (type={}, mapped_keys={})",
            self.cluster, self.name, self.qualified_name, self.process_type, self.mapped_keys
        )
    }
}

impl StructuredLog for ConstituentAdded<'_> {
    fn log(&self) {
        tracing::info!(
            cluster = self.cluster,
            constituent = self.name,
            qualified_name = self.qualified_name,
            process_type = self.process_type,
            mapped_keys = self.mapped_keys,
            "{}", self
        );
    }
}

/// A mapped cluster value replaced a value the constituent's base
/// configuration already carried.
///
/// # Log Level
/// `warn!` - Potential configuration mistake
pub struct MappingOverwritesValue<'a> {
    pub cluster: &'a str,
    pub name: &'a str,
    pub mapped_key: &'a str,
    pub previous: &'a str,
    pub value: &'a str,
}

impl Display for MappingOverwritesValue<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cluster '{}' overwrites '{}:{}' ('{}' -> '{}') with a mapped value",
            self.cluster, self.name, self.mapped_key, self.previous, self.value
        )
    }
}

impl StructuredLog for MappingOverwritesValue<'_> {
    fn log(&self) {
        tracing::warn!(
            cluster = self.cluster,
            constituent = self.name,
            mapped_key = self.mapped_key,
            "{}", self
        );
    }
}

/// A cluster port was mapped onto a constituent port.
///
/// # Log Level
/// `debug!` - Diagnostic information
pub struct PortMapped<'a> {
    pub cluster: &'a str,
    /// "input" or "output"
    pub direction: &'a str,
    pub connection: &'a Connection,
}

impl Display for PortMapped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cluster '{}' mapped {}: {}",
            self.cluster, self.direction, self.connection
        )
    }
}

impl StructuredLog for PortMapped<'_> {
    fn log(&self) {
        tracing::debug!(
            cluster = self.cluster,
            direction = self.direction,
            upstream = %self.connection.upstream,
            downstream = %self.connection.downstream,
            "{}", self
        );
    }
}

/// Two constituents were connected inside a cluster.
///
/// # Log Level
/// `debug!` - Diagnostic information
pub struct ConstituentsConnected<'a> {
    pub cluster: &'a str,
    pub connection: &'a Connection,
}

impl Display for ConstituentsConnected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cluster '{}' connected {}", self.cluster, self.connection)
    }
}

impl StructuredLog for ConstituentsConnected<'_> {
    fn log(&self) {
        tracing::debug!(
            cluster = self.cluster,
            upstream = %self.connection.upstream,
            downstream = %self.connection.downstream,
            "{}", self
        );
    }
}

/// Reconfiguration pass started over a cluster's constituents.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ClusterReconfigureStarted<'a> {
    pub cluster: &'a str,
    pub constituent_count: usize,
    pub tunable_keys: &'a [String],
}

impl Display for ClusterReconfigureStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Reconfiguring cluster '{}': {} constituents, tunable keys [{}]",
            self.cluster,
            self.constituent_count,
            self.tunable_keys.join(", ")
        )
    }
}

impl StructuredLog for ClusterReconfigureStarted<'_> {
    fn log(&self) {
        tracing::info!(
            cluster = self.cluster,
            constituent_count = self.constituent_count,
            tunable_count = self.tunable_keys.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "cluster_reconfigure",
            span_name = name,
            cluster = self.cluster,
            constituent_count = self.constituent_count,
        )
    }
}

/// Someone tried to step a cluster directly.
///
/// # Log Level
/// `error!` - Programming error in the caller
pub struct ClusterStepRejected<'a> {
    pub cluster: &'a str,
}

impl Display for ClusterStepRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cluster '{}' was stepped directly; clusters are not executable",
            self.cluster
        )
    }
}

impl StructuredLog for ClusterStepRejected<'_> {
    fn log(&self) {
        tracing::error!(cluster = self.cluster, "{}", self);
    }
}

/// Cluster assembly from a definition started.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ClusterBuildStarted<'a> {
    pub cluster_type: &'a str,
    pub name: &'a str,
    pub constituent_count: usize,
}

impl Display for ClusterBuildStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Building cluster '{}' of type '{}' with {} constituents",
            self.name, self.cluster_type, self.constituent_count
        )
    }
}

impl StructuredLog for ClusterBuildStarted<'_> {
    fn log(&self) {
        tracing::info!(
            cluster_type = self.cluster_type,
            cluster = self.name,
            constituent_count = self.constituent_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "cluster_build",
            span_name = name,
            cluster_type = self.cluster_type,
            cluster = self.name,
        )
    }
}

/// Cluster assembly failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ClusterBuildFailed<'a> {
    pub name: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ClusterBuildFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Failed to build cluster '{}': {}", self.name, self.error)
    }
}

impl StructuredLog for ClusterBuildFailed<'_> {
    fn log(&self) {
        tracing::error!(cluster = self.name, error = %self.error, "{}", self);
    }
}
