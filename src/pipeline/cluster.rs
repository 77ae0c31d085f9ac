// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Composite processes.
//!
//! A [`ProcessCluster`] packages a sub-graph of constituent processes and
//! exposes a chosen subset of their ports and configuration as its own. It
//! never runs: an external pipeline builder reads the constituents and the
//! three connection lists and splices them into the enclosing graph.
//!
//! # Build order
//!
//! Clusters are built once, in order:
//!
//! 1. [`declare_config_key`](ProcessCluster::declare_config_key) for every
//!    cluster-level key,
//! 2. [`map_config`](ProcessCluster::map_config) for every key a constituent
//!    should receive,
//! 3. [`add_process`](ProcessCluster::add_process) for each constituent,
//! 4. [`map_input`](ProcessCluster::map_input),
//!    [`map_output`](ProcessCluster::map_output) and
//!    [`connect`](ProcessCluster::connect).
//!
//! Once wrapped in an `Arc<dyn Process>` the topology is fixed; only
//! configuration values move, through [`Process::reconfigure`].
//!
//! # Example
//!
//! ```
//! use the_sprocket::backends::local;
//! use the_sprocket::config::Config;
//! use the_sprocket::pipeline::{ConfigKeyInfo, ProcessCluster, ProcessRegistry};
//! use the_sprocket::traits::Process;
//!
//! let mut registry = ProcessRegistry::new();
//! local::register_processes(&mut registry).unwrap();
//!
//! let mut cluster = ProcessCluster::new("chain", Config::new());
//! cluster.declare_config_key("tag", ConfigKeyInfo::new(Some("chained"), "label for both", true));
//! cluster.map_config("tag", "first", "label").unwrap();
//! cluster.add_process(&registry, "first", "passthrough", &Config::new()).unwrap();
//! cluster.add_process(&registry, "second", "passthrough", &Config::new()).unwrap();
//! cluster.connect("first", "out", "second", "in").unwrap();
//! cluster.map_input("frames", "first", "in").unwrap();
//! cluster.map_output("result", "second", "out").unwrap();
//!
//! let first = cluster.process("first").unwrap();
//! assert_eq!(first.name(), "chain/first");
//! assert_eq!(first.config().get("label").unwrap(), "chained");
//! assert!(first.config().is_read_only("label"));
//! assert!(cluster.has_input_port("frames"));
//! ```

use crate::config::consts::CLUSTER_PROPERTY;
use crate::config::Config;
use crate::errors::{ClusterError, ProcessError};
use crate::observability::messages::cluster::{
    ClusterReconfigureStarted, ClusterStepRejected, ConfigMappingRecorded, ConstituentAdded,
    ConstituentsConnected, MappingOverwritesValue, PortMapped,
};
use crate::observability::messages::StructuredLog;
use crate::pipeline::process_core::{ConfigKeyInfo, ProcessCore, ProvideAccess};
use crate::pipeline::port::{qualified_name, Connection, PortAddress};
use crate::pipeline::registry::ProcessRegistry;
use crate::traits::Process;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Process type used for clusters built by hand.
pub const CLUSTER_TYPE: &str = "cluster";

/// A cluster key to be copied into a constituent under `mapped_key`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ConfigMapping {
    key: String,
    mapped_key: String,
}

pub struct ProcessCluster {
    core: ProcessCore,
    /// Local constituent name to its pending or applied config mappings.
    config_map: HashMap<String, Vec<ConfigMapping>>,
    processes: BTreeMap<String, Arc<dyn Process>>,
    input_mappings: Vec<Connection>,
    output_mappings: Vec<Connection>,
    internal_connections: Vec<Connection>,
}

impl ProcessCluster {
    pub fn new(name: &str, config: Config) -> Self {
        Self::with_type(name, CLUSTER_TYPE, config)
    }

    /// A cluster registered under its own process type, such as one built
    /// from a definition file.
    pub fn with_type(name: &str, process_type: &str, config: Config) -> Self {
        let mut core = ProcessCore::new(name, process_type, config);
        core.add_property(CLUSTER_PROPERTY);

        Self {
            core,
            config_map: HashMap::new(),
            processes: BTreeMap::new(),
            input_mappings: Vec::new(),
            output_mappings: Vec::new(),
            internal_connections: Vec::new(),
        }
    }

    /// Declare a cluster-level configuration key.
    pub fn declare_config_key(&mut self, key: &str, info: ConfigKeyInfo) {
        self.core.declare_config_key(key, info);
    }

    /// Arrange for the cluster's `key` to be written into constituent `name`
    /// as `mapped_key` when it is added.
    pub fn map_config(&mut self, key: &str, name: &str, mapped_key: &str) -> Result<(), ClusterError> {
        if self.processes.contains_key(name) {
            return Err(ClusterError::MappingAfterConstituentExists {
                cluster: self.name().to_string(),
                key: key.to_string(),
                name: name.to_string(),
                mapped_key: mapped_key.to_string(),
            });
        }

        ConfigMappingRecorded {
            cluster: self.name(),
            key,
            name,
            mapped_key,
        }
        .log();

        self.config_map
            .entry(name.to_string())
            .or_default()
            .push(ConfigMapping {
                key: key.to_string(),
                mapped_key: mapped_key.to_string(),
            });
        Ok(())
    }

    /// Instantiate a constituent of `process_type` under the local `name`.
    ///
    /// The constituent's configuration starts as a copy of `base` and receives
    /// every value mapped onto it, each locked read-only. Nothing is registered
    /// when this fails.
    pub fn add_process(
        &mut self,
        registry: &ProcessRegistry,
        name: &str,
        process_type: &str,
        base: &Config,
    ) -> Result<(), ClusterError> {
        if self.processes.contains_key(name) {
            return Err(ClusterError::DuplicateName {
                cluster: self.name().to_string(),
                name: name.to_string(),
            });
        }

        let effective = self.effective_config(name, base)?;
        let qualified = qualified_name(self.name(), name);
        let process = registry.create_process(process_type, &qualified, effective)?;

        ConstituentAdded {
            cluster: self.name(),
            name,
            qualified_name: &qualified,
            process_type,
            mapped_keys: self.config_map.get(name).map_or(0, Vec::len),
        }
        .log();

        self.processes.insert(name.to_string(), process);
        Ok(())
    }

    /// `base` with every pending mapping for `name` applied and locked.
    fn effective_config(&self, name: &str, base: &Config) -> Result<Config, ClusterError> {
        let effective = base.copy();

        for mapping in self.config_map.get(name).into_iter().flatten() {
            let value: String = self.core.config_value(&mapping.key)?;

            if base.is_read_only(&mapping.mapped_key) {
                return Err(ClusterError::MappingToReadOnlyValue {
                    cluster: self.name().to_string(),
                    key: mapping.key.clone(),
                    value,
                    name: name.to_string(),
                    mapped_key: mapping.mapped_key.clone(),
                    ro_value: base.get_or(&mapping.mapped_key, ""),
                });
            }

            if let Ok(previous) = effective.get(&mapping.mapped_key) {
                MappingOverwritesValue {
                    cluster: self.name(),
                    name,
                    mapped_key: &mapping.mapped_key,
                    previous: &previous,
                    value: &value,
                }
                .log();
            }

            // A second mapping onto the same key trips over the first lock.
            effective.set(&mapping.mapped_key, value)?;
            effective.mark_read_only(&mapping.mapped_key);
        }

        Ok(effective)
    }

    fn constituent(&self, name: &str) -> Result<&Arc<dyn Process>, ClusterError> {
        self.processes
            .get(name)
            .ok_or_else(|| ClusterError::NoSuchConstituent {
                cluster: self.name().to_string(),
                name: name.to_string(),
            })
    }

    /// Expose constituent `name`'s input `process_port` as the cluster input
    /// `port`. One cluster input may feed several constituent inputs.
    pub fn map_input(&mut self, port: &str, name: &str, process_port: &str) -> Result<(), ClusterError> {
        let process = self.constituent(name)?;
        if !process.has_input_port(process_port) {
            return Err(ClusterError::NoSuchPort {
                process: process.name().to_string(),
                port: process_port.to_string(),
            });
        }

        let downstream = PortAddress::new(process.name(), process_port);
        if self
            .input_mappings
            .iter()
            .any(|mapping| mapping.downstream == downstream)
        {
            return Err(ClusterError::PortReconnect {
                process: downstream.process,
                port: downstream.port,
            });
        }

        let info = process
            .core()
            .input_port_info(process_port)
            .cloned()
            .unwrap_or_default();
        let connection = Connection::new(PortAddress::new(self.name(), port), downstream);

        PortMapped {
            cluster: self.name(),
            direction: "input",
            connection: &connection,
        }
        .log();

        self.core.declare_input_port(port, info);
        self.input_mappings.push(connection);
        Ok(())
    }

    /// Expose constituent `name`'s output `process_port` as the cluster
    /// output `port`.
    ///
    /// Only the cluster port is checked for reuse; one constituent output may
    /// back several cluster outputs.
    pub fn map_output(&mut self, port: &str, name: &str, process_port: &str) -> Result<(), ClusterError> {
        let process = self.constituent(name)?;
        if !process.has_output_port(process_port) {
            return Err(ClusterError::NoSuchPort {
                process: process.name().to_string(),
                port: process_port.to_string(),
            });
        }

        if self
            .output_mappings
            .iter()
            .any(|mapping| mapping.downstream.port == port)
        {
            return Err(ClusterError::PortReconnect {
                process: self.name().to_string(),
                port: port.to_string(),
            });
        }

        let info = process
            .core()
            .output_port_info(process_port)
            .cloned()
            .unwrap_or_default();
        let connection = Connection::new(
            PortAddress::new(process.name(), process_port),
            PortAddress::new(self.name(), port),
        );

        PortMapped {
            cluster: self.name(),
            direction: "output",
            connection: &connection,
        }
        .log();

        self.core.declare_output_port(port, info);
        self.output_mappings.push(connection);
        Ok(())
    }

    /// Connect two constituents inside the cluster.
    pub fn connect(
        &mut self,
        upstream: &str,
        upstream_port: &str,
        downstream: &str,
        downstream_port: &str,
    ) -> Result<(), ClusterError> {
        let up = self.constituent(upstream)?;
        let down = self.constituent(downstream)?;

        if !up.has_output_port(upstream_port) {
            return Err(ClusterError::NoSuchPort {
                process: up.name().to_string(),
                port: upstream_port.to_string(),
            });
        }
        if !down.has_input_port(downstream_port) {
            return Err(ClusterError::NoSuchPort {
                process: down.name().to_string(),
                port: downstream_port.to_string(),
            });
        }

        let connection = Connection::new(
            PortAddress::new(up.name(), upstream_port),
            PortAddress::new(down.name(), downstream_port),
        );

        ConstituentsConnected {
            cluster: self.name(),
            connection: &connection,
        }
        .log();

        self.internal_connections.push(connection);
        Ok(())
    }

    /// A constituent by local name.
    pub fn process(&self, name: &str) -> Option<&Arc<dyn Process>> {
        self.processes.get(name)
    }

    /// Every constituent, ordered by local name.
    pub fn processes(&self) -> Vec<Arc<dyn Process>> {
        self.processes.values().cloned().collect()
    }

    pub fn input_mappings(&self) -> &[Connection] {
        &self.input_mappings
    }

    pub fn output_mappings(&self) -> &[Connection] {
        &self.output_mappings
    }

    pub fn internal_connections(&self) -> &[Connection] {
        &self.internal_connections
    }

    /// A serializable snapshot of the cluster's topology and configuration,
    /// descending into nested clusters.
    pub fn layout(&self) -> ClusterLayout {
        let constituents = self
            .processes
            .iter()
            .map(|(local, process)| ConstituentLayout {
                name: local.clone(),
                qualified_name: process.name().to_string(),
                process_type: process.process_type().to_string(),
                config: config_snapshot(process.config()),
                cluster: process.as_cluster().map(|inner| Box::new(inner.layout())),
            })
            .collect();

        ClusterLayout {
            name: self.name().to_string(),
            process_type: self.process_type().to_string(),
            config: config_snapshot(self.config()),
            constituents,
            inputs: self.input_mappings.clone(),
            outputs: self.output_mappings.clone(),
            connections: self.internal_connections.clone(),
        }
    }
}

#[async_trait]
impl Process for ProcessCluster {
    fn core(&self) -> &ProcessCore {
        &self.core
    }

    async fn step(&self) -> Result<(), ProcessError> {
        ClusterStepRejected {
            cluster: self.name(),
        }
        .log();
        Err(ProcessError::ClusterNotExecutable {
            name: self.name().to_string(),
        })
    }

    /// Push mapped tunable values into each constituent, let each constituent
    /// adopt its own subblock of `conf`, then reconfigure the cluster itself.
    ///
    /// Mapped values are read from the cluster's configuration as it stands
    /// when this is called.
    fn reconfigure(&self, conf: &Config) -> Result<(), ProcessError> {
        let tunable = self.core.available_tunable_config();

        let started = ClusterReconfigureStarted {
            cluster: self.name(),
            constituent_count: self.processes.len(),
            tunable_keys: &tunable,
        };
        let span = started.span("cluster_reconfigure");
        let _guard = span.enter();
        started.log();

        for (name, process) in &self.processes {
            let provided = Config::new();
            for mapping in self.config_map.get(name).into_iter().flatten() {
                if !tunable.contains(&mapping.key) {
                    continue;
                }
                let value: String = self.core.config_value(&mapping.key)?;
                provided.set(&mapping.mapped_key, value)?;
            }

            process.reconfigure(&conf.subblock(name))?;
            process.reconfigure_with_provides(&provided, ProvideAccess::new())?;
        }

        self.core.reconfigure(conf)?;
        self.on_reconfigure(conf)
    }

    fn as_cluster(&self) -> Option<&ProcessCluster> {
        Some(self)
    }
}

impl fmt::Debug for ProcessCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessCluster")
            .field("name", &self.name())
            .field("process_type", &self.process_type())
            .field("processes", &self.processes.keys().collect::<Vec<_>>())
            .field("input_mappings", &self.input_mappings)
            .field("output_mappings", &self.output_mappings)
            .field("internal_connections", &self.internal_connections)
            .finish()
    }
}

fn config_snapshot(config: &Config) -> BTreeMap<String, String> {
    config
        .available_keys()
        .into_iter()
        .map(|key| {
            let value = config.get_or(&key, "");
            (key, value)
        })
        .collect()
}

/// Topology and configuration of a cluster, as handed to a pipeline builder.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterLayout {
    pub name: String,
    pub process_type: String,
    pub config: BTreeMap<String, String>,
    pub constituents: Vec<ConstituentLayout>,
    pub inputs: Vec<Connection>,
    pub outputs: Vec<Connection>,
    pub connections: Vec<Connection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConstituentLayout {
    pub name: String,
    pub qualified_name: String,
    pub process_type: String,
    pub config: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<Box<ClusterLayout>>,
}

impl ClusterLayout {
    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        writeln!(f, "{}cluster {} ({})", pad, self.name, self.process_type)?;
        for (key, value) in &self.config {
            writeln!(f, "{}  config {} = {}", pad, key, value)?;
        }
        for constituent in &self.constituents {
            match &constituent.cluster {
                Some(inner) => inner.write_indented(f, depth + 1)?,
                None => {
                    writeln!(
                        f,
                        "{}  process {} ({})",
                        pad, constituent.qualified_name, constituent.process_type
                    )?;
                    for (key, value) in &constituent.config {
                        writeln!(f, "{}    config {} = {}", pad, key, value)?;
                    }
                }
            }
        }
        for input in &self.inputs {
            writeln!(f, "{}  input {}", pad, input)?;
        }
        for output in &self.outputs {
            writeln!(f, "{}  output {}", pad, output)?;
        }
        for connection in &self.connections {
            writeln!(f, "{}  connect {}", pad, connection)?;
        }
        Ok(())
    }
}

impl fmt::Display for ClusterLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{stub_registry, StubProcess};
    use crate::errors::ConfigError;

    fn cluster_with_key(name: &str, key: &str, value: &str, tunable: bool) -> ProcessCluster {
        let config = Config::new();
        config.set(key, value).unwrap();
        let mut cluster = ProcessCluster::new(name, config);
        cluster.declare_config_key(key, ConfigKeyInfo::new(None, "cluster key", tunable));
        cluster
    }

    #[test]
    fn test_cluster_property_and_type() {
        let cluster = ProcessCluster::new("outer", Config::new());

        assert!(cluster.properties().contains(CLUSTER_PROPERTY));
        assert_eq!(cluster.process_type(), CLUSTER_TYPE);
        assert!(cluster.as_cluster().is_some());
    }

    #[test]
    fn test_map_config_bakes_value_into_constituent() {
        let registry = stub_registry();
        let mut cluster = cluster_with_key("outer", "k", "42", true);

        cluster.map_config("k", "childA", "ck").unwrap();
        cluster
            .add_process(&registry, "childA", "stub", &Config::new())
            .unwrap();

        let child = cluster.process("childA").unwrap();
        assert_eq!(child.config().get("ck").unwrap(), "42");
        assert!(child.config().is_read_only("ck"));
        assert!(matches!(
            child.config().set("ck", "7"),
            Err(ConfigError::ReadOnlyViolation { .. })
        ));
    }

    #[test]
    fn test_mapped_value_uses_declared_default() {
        let registry = stub_registry();
        let mut cluster = ProcessCluster::new("outer", Config::new());
        cluster.declare_config_key("rate", ConfigKeyInfo::new(Some("5"), "rate", true));

        cluster.map_config("rate", "a", "speed").unwrap();
        cluster.add_process(&registry, "a", "stub", &Config::new()).unwrap();

        assert_eq!(cluster.process("a").unwrap().config().get("speed").unwrap(), "5");
    }

    #[test]
    fn test_map_config_after_add_process_fails() {
        let registry = stub_registry();
        let mut cluster = cluster_with_key("outer", "k", "1", true);
        cluster.add_process(&registry, "childA", "stub", &Config::new()).unwrap();

        let result = cluster.map_config("k", "childA", "ck");

        assert!(matches!(
            result,
            Err(ClusterError::MappingAfterConstituentExists { ref name, .. }) if name == "childA"
        ));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let registry = stub_registry();
        let mut cluster = ProcessCluster::new("outer", Config::new());
        cluster.add_process(&registry, "a", "stub", &Config::new()).unwrap();

        let result = cluster.add_process(&registry, "a", "stub_sink", &Config::new());

        assert!(matches!(result, Err(ClusterError::DuplicateName { .. })));
        assert_eq!(cluster.process("a").unwrap().process_type(), "stub");
    }

    #[test]
    fn test_mapping_to_read_only_base_value_fails_without_registering() {
        let registry = stub_registry();
        let mut cluster = cluster_with_key("outer", "k", "new", true);
        cluster.map_config("k", "a", "ck").unwrap();

        let base = Config::new();
        base.set("ck", "protected").unwrap();
        base.mark_read_only("ck");

        let result = cluster.add_process(&registry, "a", "stub", &base);

        match result {
            Err(ClusterError::MappingToReadOnlyValue { value, ro_value, .. }) => {
                assert_eq!(value, "new");
                assert_eq!(ro_value, "protected");
            }
            other => panic!("expected read-only mapping failure, got {:?}", other),
        }
        assert!(cluster.process("a").is_none());
        assert!(cluster.processes().is_empty());
    }

    #[test]
    fn test_base_read_only_keys_stay_read_only() {
        let registry = stub_registry();
        let mut cluster = cluster_with_key("outer", "k", "v", true);
        cluster.map_config("k", "a", "ck").unwrap();

        let base = Config::new();
        base.set("mode", "fixed").unwrap();
        base.mark_read_only("mode");
        base.set("speed", "2").unwrap();

        cluster.add_process(&registry, "a", "stub", &base).unwrap();

        let config = cluster.process("a").unwrap().config().clone();
        assert!(config.is_read_only("mode"));
        assert!(config.is_read_only("ck"));
        assert!(!config.is_read_only("speed"));
        assert!(!config.shares_storage_with(&base));
    }

    #[test]
    fn test_mapping_overwrites_plain_base_value() {
        let registry = stub_registry();
        let mut cluster = cluster_with_key("outer", "k", "cluster", true);
        cluster.map_config("k", "a", "mode").unwrap();

        let base = Config::new();
        base.set("mode", "own").unwrap();

        cluster.add_process(&registry, "a", "stub", &base).unwrap();

        assert_eq!(cluster.process("a").unwrap().config().get("mode").unwrap(), "cluster");
        assert_eq!(base.get("mode").unwrap(), "own");
    }

    #[test]
    fn test_missing_cluster_value_fails_add_process() {
        let registry = stub_registry();
        let mut cluster = ProcessCluster::new("outer", Config::new());
        cluster.map_config("undeclared", "a", "ck").unwrap();

        let result = cluster.add_process(&registry, "a", "stub", &Config::new());

        assert!(matches!(
            result,
            Err(ClusterError::Config(ConfigError::MissingKey { .. }))
        ));
        assert!(cluster.process("a").is_none());
    }

    #[test]
    fn test_unknown_type_fails_add_process() {
        let registry = stub_registry();
        let mut cluster = ProcessCluster::new("outer", Config::new());

        let result = cluster.add_process(&registry, "a", "nope", &Config::new());

        assert!(matches!(result, Err(ClusterError::Registry(_))));
        assert!(cluster.processes().is_empty());
    }

    #[test]
    fn test_map_input_twice_to_same_port_fails() {
        let registry = stub_registry();
        let mut cluster = ProcessCluster::new("outer", Config::new());
        cluster.add_process(&registry, "a", "stub", &Config::new()).unwrap();

        cluster.map_input("first", "a", "in").unwrap();
        let result = cluster.map_input("second", "a", "in");

        assert!(matches!(
            result,
            Err(ClusterError::PortReconnect { ref process, ref port }) if process == "outer/a" && port == "in"
        ));
        assert_eq!(cluster.input_mappings().len(), 1);
    }

    #[test]
    fn test_map_input_fans_out_one_cluster_port() {
        let registry = stub_registry();
        let mut cluster = ProcessCluster::new("outer", Config::new());
        cluster.add_process(&registry, "a", "stub", &Config::new()).unwrap();
        cluster.add_process(&registry, "b", "stub", &Config::new()).unwrap();

        cluster.map_input("frames", "a", "in").unwrap();
        cluster.map_input("frames", "b", "in").unwrap();

        assert_eq!(cluster.input_mappings().len(), 2);
        assert_eq!(cluster.input_ports(), vec!["frames"]);
        assert_eq!(
            cluster.input_mappings()[1].upstream,
            PortAddress::new("outer", "frames")
        );
    }

    #[test]
    fn test_mapping_errors() {
        let registry = stub_registry();
        let mut cluster = ProcessCluster::new("outer", Config::new());
        cluster.add_process(&registry, "src", "stub_source", &Config::new()).unwrap();

        assert!(matches!(
            cluster.map_input("x", "ghost", "in"),
            Err(ClusterError::NoSuchConstituent { .. })
        ));
        assert!(matches!(
            cluster.map_input("x", "src", "in"),
            Err(ClusterError::NoSuchPort { .. })
        ));
        assert!(matches!(
            cluster.map_output("x", "ghost", "out"),
            Err(ClusterError::NoSuchConstituent { .. })
        ));
        assert!(matches!(
            cluster.map_output("x", "src", "in"),
            Err(ClusterError::NoSuchPort { .. })
        ));
        assert!(cluster.input_ports().is_empty());
        assert!(cluster.output_ports().is_empty());
    }

    #[test]
    fn test_map_output_rejects_reused_cluster_port() {
        let registry = stub_registry();
        let mut cluster = ProcessCluster::new("outer", Config::new());
        cluster.add_process(&registry, "a", "stub", &Config::new()).unwrap();
        cluster.add_process(&registry, "b", "stub", &Config::new()).unwrap();

        cluster.map_output("result", "a", "out").unwrap();
        let result = cluster.map_output("result", "b", "out");

        assert!(matches!(
            result,
            Err(ClusterError::PortReconnect { ref process, ref port }) if process == "outer" && port == "result"
        ));
    }

    // Only the cluster port is checked: one constituent output may still back
    // two cluster outputs.
    #[test]
    fn test_map_output_allows_reused_constituent_port() {
        let registry = stub_registry();
        let mut cluster = ProcessCluster::new("outer", Config::new());
        cluster.add_process(&registry, "a", "stub", &Config::new()).unwrap();

        cluster.map_output("left", "a", "out").unwrap();
        cluster.map_output("right", "a", "out").unwrap();

        assert_eq!(cluster.output_mappings().len(), 2);
        assert_eq!(cluster.output_ports(), vec!["left", "right"]);
    }

    #[test]
    fn test_connect_checks_both_sides() {
        let registry = stub_registry();
        let mut cluster = ProcessCluster::new("outer", Config::new());
        cluster.add_process(&registry, "src", "stub_source", &Config::new()).unwrap();
        cluster.add_process(&registry, "dst", "stub_sink", &Config::new()).unwrap();

        assert!(matches!(
            cluster.connect("ghost", "out", "dst", "in"),
            Err(ClusterError::NoSuchConstituent { .. })
        ));
        assert!(matches!(
            cluster.connect("src", "out", "ghost", "in"),
            Err(ClusterError::NoSuchConstituent { .. })
        ));
        assert!(matches!(
            cluster.connect("src", "in", "dst", "in"),
            Err(ClusterError::NoSuchPort { ref port, .. }) if port == "in"
        ));
        assert!(matches!(
            cluster.connect("src", "out", "dst", "out"),
            Err(ClusterError::NoSuchPort { ref port, .. }) if port == "out"
        ));
        assert!(cluster.internal_connections().is_empty());

        cluster.connect("src", "out", "dst", "in").unwrap();
        assert_eq!(
            cluster.internal_connections(),
            &[Connection::new(
                PortAddress::new("outer/src", "out"),
                PortAddress::new("outer/dst", "in"),
            )]
        );
    }

    #[test]
    fn test_reconfigure_pushes_tunable_mapped_values() {
        let registry = stub_registry();
        let config = Config::new();
        config.set("rate", "1").unwrap();
        config.set("fixed", "a").unwrap();
        let mut cluster = ProcessCluster::new("outer", config);
        cluster.declare_config_key("rate", ConfigKeyInfo::new(None, "rate", true));
        cluster.declare_config_key("fixed", ConfigKeyInfo::new(None, "fixed", false));
        cluster.map_config("rate", "a", "speed").unwrap();
        cluster.map_config("fixed", "a", "mode").unwrap();
        cluster.add_process(&registry, "a", "stub", &Config::new()).unwrap();

        cluster.config().set("rate", "9").unwrap();
        cluster.config().set("fixed", "b").unwrap();
        cluster.reconfigure(&Config::new()).unwrap();

        let child = cluster.process("a").unwrap();
        assert_eq!(child.config().get("speed").unwrap(), "9");
        assert_eq!(child.config().get("mode").unwrap(), "a");
        assert!(child.config().is_read_only("speed"));
    }

    #[test]
    fn test_only_the_owning_cluster_rewrites_mapped_keys() {
        let registry = stub_registry();
        let config = Config::new();
        config.set("rate", "1").unwrap();
        let mut cluster = ProcessCluster::new("outer", config);
        cluster.declare_config_key("rate", ConfigKeyInfo::new(None, "rate", true));
        cluster.map_config("rate", "a", "speed").unwrap();
        cluster.add_process(&registry, "a", "stub", &Config::new()).unwrap();
        let child = cluster.process("a").unwrap();

        assert!(matches!(
            child.config().set("speed", "66"),
            Err(ConfigError::ReadOnlyViolation { .. })
        ));
        let update = Config::new();
        update.set("speed", "66").unwrap();
        child.reconfigure(&update).unwrap();
        assert_eq!(child.config().get("speed").unwrap(), "1");

        cluster.config().set("rate", "2").unwrap();
        cluster.reconfigure(&Config::new()).unwrap();
        assert_eq!(child.config().get("speed").unwrap(), "2");
    }

    #[test]
    fn test_reconfigure_hands_constituents_their_subblock() {
        let registry = stub_registry();
        let mut cluster = ProcessCluster::new("outer", Config::new());
        cluster.add_process(&registry, "a", "stub", &Config::new()).unwrap();
        cluster.add_process(&registry, "b", "stub", &Config::new()).unwrap();

        let update = Config::new();
        update.set("a:speed", "4").unwrap();
        update.set("a:depth", "99").unwrap();
        update.set("b:mode", "fast").unwrap();
        cluster.reconfigure(&update).unwrap();

        let a = cluster.process("a").unwrap();
        let b = cluster.process("b").unwrap();
        assert_eq!(a.config().get("speed").unwrap(), "4");
        assert!(!a.config().has_value("depth"));
        assert!(!a.config().has_value("mode"));
        assert_eq!(b.config().get("mode").unwrap(), "fast");
    }

    #[test]
    fn test_reconfigure_cannot_override_mapped_value_through_subblock() {
        let registry = stub_registry();
        let mut cluster = cluster_with_key("outer", "rate", "3", true);
        cluster.map_config("rate", "a", "speed").unwrap();
        cluster.add_process(&registry, "a", "stub", &Config::new()).unwrap();

        let update = Config::new();
        update.set("a:speed", "100").unwrap();
        cluster.reconfigure(&update).unwrap();

        assert_eq!(cluster.process("a").unwrap().config().get("speed").unwrap(), "3");
    }

    #[test]
    fn test_reconfigure_updates_cluster_tunables_last() {
        let registry = stub_registry();
        let mut cluster = cluster_with_key("outer", "rate", "3", true);
        cluster.map_config("rate", "a", "speed").unwrap();
        cluster.add_process(&registry, "a", "stub", &Config::new()).unwrap();

        let update = Config::new();
        update.set("rate", "8").unwrap();
        cluster.reconfigure(&update).unwrap();

        // constituents saw the value the cluster held when the pass started
        assert_eq!(cluster.config().get("rate").unwrap(), "8");
        assert_eq!(cluster.process("a").unwrap().config().get("speed").unwrap(), "3");

        cluster.reconfigure(&Config::new()).unwrap();
        assert_eq!(cluster.process("a").unwrap().config().get("speed").unwrap(), "8");
    }

    #[test]
    fn test_reconfigure_runs_constituent_hooks() {
        let created: Arc<parking_lot::Mutex<Vec<Arc<StubProcess>>>> = Arc::default();
        let slot = Arc::clone(&created);
        let mut registry = ProcessRegistry::new();
        registry
            .register_process("stub", "recording stub", move |_, name, config| {
                let process = Arc::new(StubProcess::new(name, config));
                slot.lock().push(Arc::clone(&process));
                Ok(process as Arc<dyn Process>)
            })
            .unwrap();
        let mut cluster = ProcessCluster::new("outer", Config::new());
        cluster.add_process(&registry, "a", "stub", &Config::new()).unwrap();

        cluster.reconfigure(&Config::new()).unwrap();

        // once for the subblock pass, once for the provided pass
        let created = created.lock();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].reconfigure_calls(), 2);
    }

    #[tokio::test]
    async fn test_step_is_rejected() {
        let cluster = ProcessCluster::new("outer", Config::new());

        let result = cluster.step().await;

        assert!(matches!(
            result,
            Err(ProcessError::ClusterNotExecutable { ref name }) if name == "outer"
        ));
    }

    #[test]
    fn test_layout_lists_everything() {
        let registry = stub_registry();
        let mut cluster = cluster_with_key("outer", "k", "v", true);
        cluster.map_config("k", "a", "mode").unwrap();
        cluster.add_process(&registry, "a", "stub", &Config::new()).unwrap();
        cluster.add_process(&registry, "b", "stub", &Config::new()).unwrap();
        cluster.connect("a", "out", "b", "in").unwrap();
        cluster.map_input("frames", "a", "in").unwrap();
        cluster.map_output("result", "b", "out").unwrap();

        let layout = cluster.layout();

        assert_eq!(layout.name, "outer");
        assert_eq!(layout.constituents.len(), 2);
        assert_eq!(layout.constituents[0].qualified_name, "outer/a");
        assert_eq!(layout.constituents[0].config.get("mode").unwrap(), "v");
        assert_eq!(layout.inputs.len(), 1);
        assert_eq!(layout.outputs.len(), 1);
        assert_eq!(layout.connections.len(), 1);

        let rendered = layout.to_string();
        assert!(rendered.contains("process outer/a (stub)"));
        assert!(rendered.contains("connect outer/a.out -> outer/b.in"));

        let json = serde_json::to_value(&layout).unwrap();
        assert_eq!(json["constituents"][1]["name"], "b");
        assert!(json["constituents"][1].get("cluster").is_none());
    }
}
