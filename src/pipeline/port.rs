// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Port addresses, connections and process naming.

use crate::config::consts::PROCESS_NAME_SEP;
use serde::Serialize;
use std::fmt;

/// One end of an edge: a port on a named process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PortAddress {
    pub process: String,
    pub port: String,
}

impl PortAddress {
    pub fn new(process: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            process: process.into(),
            port: port.into(),
        }
    }
}

impl fmt::Display for PortAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.process, self.port)
    }
}

/// A directed edge from an upstream output to a downstream input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Connection {
    pub upstream: PortAddress,
    pub downstream: PortAddress,
}

impl Connection {
    pub fn new(upstream: PortAddress, downstream: PortAddress) -> Self {
        Self {
            upstream,
            downstream,
        }
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.upstream, self.downstream)
    }
}

/// What a process declares about one of its ports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortInfo {
    /// Opaque data type tag; an empty string accepts anything.
    pub port_type: String,
    pub description: String,
}

impl PortInfo {
    pub fn new(port_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            port_type: port_type.into(),
            description: description.into(),
        }
    }
}

/// Name a constituent is known by outside its cluster.
///
/// Nesting composes: a process `blur` inside cluster `outer/inner` is
/// `outer/inner/blur`.
///
/// ```
/// use the_sprocket::pipeline::qualified_name;
///
/// assert_eq!(qualified_name("outer/inner", "blur"), "outer/inner/blur");
/// ```
pub fn qualified_name(cluster: &str, local: &str) -> String {
    format!("{}{}{}", cluster, PROCESS_NAME_SEP, local)
}

/// Split a qualified name into its ancestor clusters and the local name.
#[cfg(test)]
pub(crate) fn split_qualified_name(name: &str) -> (Option<&str>, &str) {
    match name.rsplit_once(PROCESS_NAME_SEP) {
        Some((parent, local)) => (Some(parent), local),
        None => (None, name),
    }
}
