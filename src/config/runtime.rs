// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Turning cluster definitions into clusters.
//!
//! [`build_cluster`] applies one definition to a fresh [`ProcessCluster`];
//! [`register_cluster_definitions`] registers every definition of a file as a
//! process type whose factory does exactly that, so clusters can be created
//! through a registry like any other process and nested inside each other.
//!
//! Registration validates the file first, which rejects nesting loops inside
//! one file. Loops spread across separately registered files are caught while
//! building: a cluster type that is already under construction further up the
//! current thread's build stack fails with [`ClusterError::RecursiveNesting`].
//!
//! # Examples
//!
//! ```
//! use the_sprocket::backends::local;
//! use the_sprocket::config::{register_cluster_definitions, Config, DefinitionFile};
//! use the_sprocket::pipeline::ProcessRegistry;
//!
//! let definitions = DefinitionFile::from_yaml_str(r#"
//! clusters:
//!   - type: relay
//!     processes:
//!       - { name: copy, type: passthrough }
//!     inputs:
//!       - { port: in, process: copy, process_port: in }
//! "#).unwrap();
//!
//! let mut registry = ProcessRegistry::new();
//! local::register_processes(&mut registry).unwrap();
//! register_cluster_definitions(&mut registry, &definitions).unwrap();
//!
//! let relay = registry.create_process("relay", "relay", Config::new()).unwrap();
//! assert!(relay.has_input_port("in"));
//! assert_eq!(relay.as_cluster().unwrap().processes()[0].name(), "relay/copy");
//! ```

use crate::config::loader::{ClusterDefinition, ConstituentDefinition, DefinitionFile};
use crate::config::{validate_definitions, Config};
use crate::errors::{ClusterError, RegistryError};
use crate::observability::messages::cluster::{ClusterBuildFailed, ClusterBuildStarted};
use crate::observability::messages::definition::ClusterTypeRegistered;
use crate::observability::messages::StructuredLog;
use crate::pipeline::{ConfigKeyInfo, ProcessCluster, ProcessRegistry};
use crate::traits::Process;
use std::cell::RefCell;
use std::sync::Arc;

thread_local! {
    static BUILDING: RefCell<Vec<String>> = RefCell::new(Vec::new());
}

/// Marks a cluster type as under construction until dropped.
struct NestingGuard;

impl NestingGuard {
    fn enter(cluster_type: &str) -> Result<Self, ClusterError> {
        BUILDING.with(|building| {
            let mut building = building.borrow_mut();
            if let Some(start) = building.iter().position(|entry| entry == cluster_type) {
                let mut cycle = building[start..].to_vec();
                cycle.push(cluster_type.to_string());
                return Err(ClusterError::RecursiveNesting {
                    cluster_type: cluster_type.to_string(),
                    cycle,
                });
            }
            building.push(cluster_type.to_string());
            Ok(NestingGuard)
        })
    }
}

impl Drop for NestingGuard {
    fn drop(&mut self) {
        BUILDING.with(|building| {
            building.borrow_mut().pop();
        });
    }
}

/// Build the cluster `definition` describes, named `name`, with `config` as
/// the cluster's own configuration.
///
/// Keys under `<constituent>:` in `config` override that constituent's
/// definition settings, except settings the definition marks read-only.
pub fn build_cluster(
    definition: &ClusterDefinition,
    registry: &ProcessRegistry,
    name: &str,
    config: Config,
) -> Result<ProcessCluster, ClusterError> {
    let started = ClusterBuildStarted {
        cluster_type: &definition.cluster_type,
        name,
        constituent_count: definition.processes.len(),
    };
    let span = started.span("cluster_build");
    let _guard = span.enter();
    started.log();

    let result = match NestingGuard::enter(&definition.cluster_type) {
        Ok(_nesting) => assemble(definition, registry, name, config),
        Err(error) => Err(error),
    };
    result.map_err(|error| {
        ClusterBuildFailed { name, error: &error }.log();
        error
    })
}

fn assemble(
    definition: &ClusterDefinition,
    registry: &ProcessRegistry,
    name: &str,
    config: Config,
) -> Result<ProcessCluster, ClusterError> {
    let mut cluster = ProcessCluster::with_type(name, &definition.cluster_type, config);

    for key in &definition.config {
        let default = key.default.as_ref().map(|value| value.to_string());
        cluster.declare_config_key(
            &key.key,
            ConfigKeyInfo::new(default.as_deref(), key.description.clone(), key.tunable),
        );
    }

    for process in &definition.processes {
        for mapping in &process.map {
            cluster.map_config(&mapping.from, &process.name, &mapping.to)?;
        }
    }

    for process in &definition.processes {
        let base = constituent_config(process, cluster.config())?;
        cluster.add_process(registry, &process.name, &process.process_type, &base)?;
    }

    for input in &definition.inputs {
        cluster.map_input(&input.port, &input.process, &input.process_port)?;
    }
    for output in &definition.outputs {
        cluster.map_output(&output.port, &output.process, &output.process_port)?;
    }
    for connection in &definition.connections {
        cluster.connect(
            &connection.from.process,
            &connection.from.port,
            &connection.to.process,
            &connection.to.port,
        )?;
    }

    Ok(cluster)
}

/// Definition settings overlaid by the cluster configuration's subblock for
/// the constituent.
fn constituent_config(process: &ConstituentDefinition, cluster_config: &Config) -> Result<Config, ClusterError> {
    let base = Config::new();
    for setting in &process.config {
        base.set(&setting.key, setting.value.to_string())?;
        if setting.read_only {
            base.mark_read_only(&setting.key);
        }
    }

    let overrides = cluster_config.subblock(&process.name);
    for key in overrides.available_keys() {
        base.set(&key, overrides.get(&key)?)?;
    }

    Ok(base)
}

/// Register every definition in `file` as a process type.
///
/// The file is validated first and nothing is registered if it fails.
/// Definitions may nest each other in any order within the file, or types
/// registered from other files; constituents are only resolved when a cluster
/// is instantiated.
pub fn register_cluster_definitions(
    registry: &mut ProcessRegistry,
    file: &DefinitionFile,
) -> Result<(), RegistryError> {
    validate_definitions(file).map_err(|issues| RegistryError::InvalidDefinitions { issues })?;

    for definition in &file.clusters {
        let shared = Arc::new(definition.clone());
        let description = if definition.description.is_empty() {
            format!("Cluster of {} processes", definition.processes.len())
        } else {
            definition.description.clone()
        };

        registry.register_process(&definition.cluster_type, &description, move |registry, name, config| {
            let cluster = build_cluster(&shared, registry, name, config)?;
            Ok(Arc::new(cluster) as Arc<dyn Process>)
        })?;

        ClusterTypeRegistered {
            cluster_type: &definition.cluster_type,
            constituent_count: definition.processes.len(),
        }
        .log();
    }
    Ok(())
}
