// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Process composition: ports, the shared process base, the process registry
//! and process clusters.

mod cluster;
mod process_core;
mod port;
mod registry;


pub use cluster::{ClusterLayout, ConstituentLayout, ProcessCluster, CLUSTER_TYPE};
pub use process_core::{ConfigKeyInfo, ProcessCore, ProcessState, ProvideAccess};
pub use port::{qualified_name, Connection, PortAddress, PortInfo};
#[cfg(test)]
pub(crate) use port::split_qualified_name;
pub use registry::{ProcessFactory, ProcessRegistry};
