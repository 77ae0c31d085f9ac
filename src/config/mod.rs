// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod runtime;
mod store;
mod validation;
mod value;

pub mod consts;

pub use consts::BLOCK_SEP;
pub use loader::{
    load_and_validate_definitions, load_definitions, ClusterConfigKey, ClusterDefinition,
    ConfigMappingDefinition, ConfigSetting, ConnectionDefinition, ConstituentDefinition,
    DefinitionFile, EndpointDefinition, PortMappingDefinition, ScalarValue,
};
pub use runtime::{build_cluster, register_cluster_definitions};
pub use store::{join_key, Config};
pub use validation::validate_definitions;
pub use value::ConfigValue;
