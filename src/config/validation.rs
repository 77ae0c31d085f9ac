// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Validation of cluster definition files.
//!
//! Definitions are checked before anything is registered so a bad file fails
//! as a whole, with every problem listed, rather than part-way through
//! registration or, worse, the first time someone instantiates a cluster.
//!
//! # Validation Pipeline
//!
//! 1. **Uniqueness**: cluster types are unique in the file, constituent names
//!    are unique within each cluster
//! 2. **References**: config mappings read declared cluster keys; port
//!    mappings and connections name declared constituents
//! 3. **Nesting**: cluster types do not contain themselves, directly or
//!    through other cluster types in the same file
//!
//! Nesting is only checked once the first two stages pass.
//!
//! Port names are not checked here. Whether a constituent has a port is only
//! known once it exists, so the cluster reports that during assembly.
//!
//! # Example
//!
//! ```rust
//! use the_sprocket::config::{validate_definitions, DefinitionFile};
//! use the_sprocket::errors::ValidationError;
//!
//! let file = DefinitionFile::from_yaml_str(r#"
//! clusters:
//!   - type: loop_a
//!     processes:
//!       - { name: inner, type: loop_b }
//!   - type: loop_b
//!     processes:
//!       - { name: inner, type: loop_a }
//! "#).unwrap();
//!
//! let errors = validate_definitions(&file).unwrap_err();
//! assert!(matches!(errors[0], ValidationError::CyclicNesting { .. }));
//! ```

use crate::config::loader::{ClusterDefinition, DefinitionFile};
use crate::errors::ValidationError;
use std::collections::{BTreeMap, HashSet};

/// Validate every definition in `file`, accumulating all issues found.
pub fn validate_definitions(file: &DefinitionFile) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(duplicates) = validate_unique_cluster_types(file) {
        errors.extend(duplicates);
    }

    for cluster in &file.clusters {
        if let Err(issues) = validate_cluster(cluster) {
            errors.extend(issues);
        }
    }

    if errors.is_empty() {
        if let Err(cycles) = validate_acyclic_nesting(file) {
            errors.extend(cycles);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_unique_cluster_types(file: &DefinitionFile) -> Result<(), Vec<ValidationError>> {
    let mut seen = HashSet::new();
    let errors: Vec<ValidationError> = file
        .clusters
        .iter()
        .filter(|cluster| !seen.insert(cluster.cluster_type.as_str()))
        .map(|cluster| ValidationError::DuplicateClusterType {
            cluster_type: cluster.cluster_type.clone(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_cluster(cluster: &ClusterDefinition) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut names = HashSet::new();

    for process in &cluster.processes {
        if !names.insert(process.name.as_str()) {
            errors.push(ValidationError::DuplicateConstituent {
                cluster_type: cluster.cluster_type.clone(),
                name: process.name.clone(),
            });
        }
    }

    let declared_keys: HashSet<&str> = cluster.config.iter().map(|key| key.key.as_str()).collect();
    for process in &cluster.processes {
        for mapping in &process.map {
            if !declared_keys.contains(mapping.from.as_str()) {
                errors.push(ValidationError::UndeclaredClusterKey {
                    cluster_type: cluster.cluster_type.clone(),
                    name: process.name.clone(),
                    key: mapping.from.clone(),
                });
            }
        }
    }

    let mut check = |name: &str, context: &'static str| {
        if !names.contains(name) {
            errors.push(ValidationError::UnknownConstituent {
                cluster_type: cluster.cluster_type.clone(),
                name: name.to_string(),
                context,
            });
        }
    };

    for input in &cluster.inputs {
        check(&input.process, "input");
    }
    for output in &cluster.outputs {
        check(&output.process, "output");
    }
    for connection in &cluster.connections {
        check(&connection.from.process, "connection");
        check(&connection.to.process, "connection");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Cluster types form a graph through constituents whose type is another
/// cluster type in the same file; that graph must be acyclic. Loops through
/// types from other files are caught when the cluster is built.
fn validate_acyclic_nesting(file: &DefinitionFile) -> Result<(), Vec<ValidationError>> {
    let cluster_types: HashSet<&str> = file
        .clusters
        .iter()
        .map(|cluster| cluster.cluster_type.as_str())
        .collect();

    // BTreeMap so the reported cycle does not depend on hash order
    let graph: BTreeMap<&str, Vec<&str>> = file
        .clusters
        .iter()
        .map(|cluster| {
            let nested = cluster
                .processes
                .iter()
                .map(|process| process.process_type.as_str())
                .filter(|process_type| cluster_types.contains(process_type))
                .collect();
            (cluster.cluster_type.as_str(), nested)
        })
        .collect();

    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    for &cluster_type in graph.keys() {
        if !visited.contains(cluster_type) {
            if let Some(cycle) =
                dfs_cycle_detection(cluster_type, &graph, &mut visited, &mut rec_stack, &mut path)
            {
                return Err(vec![ValidationError::CyclicNesting { cycle }]);
            }
        }
    }

    Ok(())
}

/// DFS with a recursion stack; returns the cycle path, first node repeated at
/// the end, when a back edge is found.
fn dfs_cycle_detection<'a>(
    node: &'a str,
    graph: &BTreeMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    rec_stack: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    if let Some(neighbors) = graph.get(node) {
        for &neighbor in neighbors {
            if !visited.contains(neighbor) {
                if let Some(cycle) = dfs_cycle_detection(neighbor, graph, visited, rec_stack, path) {
                    return Some(cycle);
                }
            } else if rec_stack.contains(neighbor) {
                let start = path.iter().position(|&entry| entry == neighbor).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].iter().map(|entry| entry.to_string()).collect();
                cycle.push(neighbor.to_string());
                return Some(cycle);
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::{
        ClusterConfigKey, ConfigMappingDefinition, ConnectionDefinition, ConstituentDefinition,
        EndpointDefinition, PortMappingDefinition,
    };

    fn constituent(name: &str, process_type: &str) -> ConstituentDefinition {
        ConstituentDefinition {
            name: name.to_string(),
            process_type: process_type.to_string(),
            config: vec![],
            map: vec![],
        }
    }

    fn cluster(cluster_type: &str, processes: Vec<ConstituentDefinition>) -> ClusterDefinition {
        ClusterDefinition {
            cluster_type: cluster_type.to_string(),
            description: String::new(),
            config: vec![],
            processes,
            inputs: vec![],
            outputs: vec![],
            connections: vec![],
        }
    }

    fn file(clusters: Vec<ClusterDefinition>) -> DefinitionFile {
        DefinitionFile { clusters }
    }

    #[test]
    fn test_valid_empty_file() {
        assert!(validate_definitions(&DefinitionFile::default()).is_ok());
    }

    #[test]
    fn test_valid_nested_clusters() {
        let definitions = file(vec![
            cluster("outer", vec![constituent("inner", "inner"), constituent("tail", "sink")]),
            cluster("inner", vec![constituent("copy", "passthrough")]),
        ]);

        assert!(validate_definitions(&definitions).is_ok());
    }

    #[test]
    fn test_duplicate_cluster_type() {
        let definitions = file(vec![cluster("same", vec![]), cluster("same", vec![])]);

        let errors = validate_definitions(&definitions).unwrap_err();

        assert_eq!(
            errors,
            vec![ValidationError::DuplicateClusterType {
                cluster_type: "same".to_string()
            }]
        );
    }

    #[test]
    fn test_duplicate_constituent() {
        let definitions = file(vec![cluster(
            "c",
            vec![constituent("a", "source"), constituent("a", "sink")],
        )]);

        let errors = validate_definitions(&definitions).unwrap_err();

        assert!(matches!(
            &errors[0],
            ValidationError::DuplicateConstituent { name, .. } if name == "a"
        ));
    }

    #[test]
    fn test_undeclared_cluster_key() {
        let mut mapped = constituent("a", "passthrough");
        mapped.map.push(ConfigMappingDefinition {
            from: "declared".to_string(),
            to: "label".to_string(),
        });
        mapped.map.push(ConfigMappingDefinition {
            from: "missing".to_string(),
            to: "label".to_string(),
        });
        let mut definition = cluster("c", vec![mapped]);
        definition.config.push(ClusterConfigKey {
            key: "declared".to_string(),
            default: None,
            description: String::new(),
            tunable: false,
        });

        let errors = validate_definitions(&file(vec![definition])).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ValidationError::UndeclaredClusterKey { key, .. } if key == "missing"
        ));
    }

    #[test]
    fn test_unknown_constituents_everywhere() {
        let mut definition = cluster("c", vec![constituent("a", "passthrough")]);
        definition.inputs.push(PortMappingDefinition {
            port: "in".to_string(),
            process: "x".to_string(),
            process_port: "in".to_string(),
        });
        definition.outputs.push(PortMappingDefinition {
            port: "out".to_string(),
            process: "a".to_string(),
            process_port: "out".to_string(),
        });
        definition.connections.push(ConnectionDefinition {
            from: EndpointDefinition {
                process: "a".to_string(),
                port: "out".to_string(),
            },
            to: EndpointDefinition {
                process: "y".to_string(),
                port: "in".to_string(),
            },
        });

        let errors = validate_definitions(&file(vec![definition])).unwrap_err();

        let contexts: Vec<(&str, &str)> = errors
            .iter()
            .filter_map(|error| match error {
                ValidationError::UnknownConstituent { name, context, .. } => Some((name.as_str(), *context)),
                _ => None,
            })
            .collect();
        assert_eq!(contexts, vec![("x", "input"), ("y", "connection")]);
    }

    #[test]
    fn test_self_nesting() {
        let definitions = file(vec![cluster("again", vec![constituent("me", "again")])]);

        let errors = validate_definitions(&definitions).unwrap_err();

        assert_eq!(
            errors,
            vec![ValidationError::CyclicNesting {
                cycle: vec!["again".to_string(), "again".to_string()]
            }]
        );
    }

    #[test]
    fn test_indirect_nesting_cycle_path() {
        let definitions = file(vec![
            cluster("a", vec![constituent("to_b", "b")]),
            cluster("b", vec![constituent("to_c", "c")]),
            cluster("c", vec![constituent("to_b", "b"), constituent("leaf", "sink")]),
        ]);

        let errors = validate_definitions(&definitions).unwrap_err();

        match &errors[0] {
            ValidationError::CyclicNesting { cycle } => assert_eq!(cycle, &vec!["b", "c", "b"]),
            other => panic!("expected a cycle, got {}", other),
        }
    }

    #[test]
    fn test_cycle_check_skipped_when_references_fail() {
        let mut looping = cluster("loop", vec![constituent("me", "loop")]);
        looping.inputs.push(PortMappingDefinition {
            port: "in".to_string(),
            process: "ghost".to_string(),
            process_port: "in".to_string(),
        });

        let errors = validate_definitions(&file(vec![looping])).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ValidationError::UnknownConstituent { .. }));
    }
}
