// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::DefinitionError;
use crate::observability::messages::definition::{DefinitionLoaded, DefinitionValidationFailed};
use crate::observability::messages::StructuredLog;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// A file of cluster type definitions.
///
/// Definitions are loaded from YAML (or TOML, chosen by file extension) and
/// registered into a [`ProcessRegistry`](crate::pipeline::ProcessRegistry) so
/// clusters can be instantiated, and nested, by type name.
///
/// # Example
/// ```yaml
/// clusters:
///   - type: blur_chain
///     description: Blurs then tags frames
///     config:
///       - key: radius
///         default: 3
///         description: Kernel radius
///         tunable: true
///     processes:
///       - name: blur
///         type: passthrough
///         map:
///           - from: radius
///             to: label
///     inputs:
///       - port: frames
///         process: blur
///         process_port: in
///     outputs:
///       - port: result
///         process: blur
///         process_port: out
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DefinitionFile {
    #[serde(default)]
    pub clusters: Vec<ClusterDefinition>,
}

impl DefinitionFile {
    pub fn from_yaml_str(content: &str) -> Result<Self, DefinitionError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, DefinitionError> {
        Ok(toml::from_str(content)?)
    }

    pub fn cluster(&self, cluster_type: &str) -> Option<&ClusterDefinition> {
        self.clusters
            .iter()
            .find(|cluster| cluster.cluster_type == cluster_type)
    }
}

/// One cluster type: its keys, constituents and wiring.
///
/// # Fields
/// * `cluster_type` - Process type name the cluster is registered under
/// * `config` - Cluster-level keys that can be mapped into constituents
/// * `processes` - Constituents, added in order
/// * `inputs` / `outputs` - Cluster ports and the constituent ports behind them
/// * `connections` - Internal edges between constituents
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClusterDefinition {
    #[serde(rename = "type")]
    pub cluster_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub config: Vec<ClusterConfigKey>,
    pub processes: Vec<ConstituentDefinition>,
    #[serde(default)]
    pub inputs: Vec<PortMappingDefinition>,
    #[serde(default)]
    pub outputs: Vec<PortMappingDefinition>,
    #[serde(default)]
    pub connections: Vec<ConnectionDefinition>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClusterConfigKey {
    pub key: String,
    #[serde(default)]
    pub default: Option<ScalarValue>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tunable: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConstituentDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub process_type: String,
    #[serde(default)]
    pub config: Vec<ConfigSetting>,
    #[serde(default)]
    pub map: Vec<ConfigMappingDefinition>,
}

/// A value baked into a constituent's configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConfigSetting {
    pub key: String,
    pub value: ScalarValue,
    #[serde(default)]
    pub read_only: bool,
}

/// Cluster key `from` is copied into the constituent as `to`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConfigMappingDefinition {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PortMappingDefinition {
    /// Port on the cluster
    pub port: String,
    /// Local constituent name
    pub process: String,
    pub process_port: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConnectionDefinition {
    pub from: EndpointDefinition,
    pub to: EndpointDefinition,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EndpointDefinition {
    pub process: String,
    pub port: String,
}

/// A scalar as written in a definition file. Stored in configuration as text.
///
/// Booleans, integers and text keep their spelling. Floats are parsed, so
/// they are stored in Rust's shortest form: `1.50` becomes `1.5` and `1e3`
/// becomes `1000`. Quote a value to keep it verbatim.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Bool(value) => write!(f, "{}", value),
            ScalarValue::Int(value) => write!(f, "{}", value),
            ScalarValue::Float(value) => write!(f, "{}", value),
            ScalarValue::Text(value) => f.write_str(value),
        }
    }
}

/// Load a definition file. `.toml` files are read as TOML, anything else as YAML.
pub fn load_definitions<P: AsRef<Path>>(path: P) -> Result<DefinitionFile, DefinitionError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| DefinitionError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => DefinitionFile::from_toml_str(&content),
        _ => DefinitionFile::from_yaml_str(&content),
    }
}

/// Load a definition file and validate it.
///
/// Every validation issue is reported at once in [`DefinitionError::Invalid`].
pub fn load_and_validate_definitions<P: AsRef<Path>>(
    path: P,
) -> Result<DefinitionFile, DefinitionError> {
    let path = path.as_ref();
    let definitions = load_definitions(path)?;

    if let Err(issues) = crate::config::validate_definitions(&definitions) {
        DefinitionValidationFailed {
            path,
            issue_count: issues.len(),
        }
        .log();
        return Err(DefinitionError::Invalid { issues });
    }

    DefinitionLoaded {
        path,
        cluster_count: definitions.clusters.len(),
    }
    .log();
    Ok(definitions)
}
