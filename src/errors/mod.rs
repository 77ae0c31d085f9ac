// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod cluster;
mod config;
mod definition;
mod process;
mod registry;
mod validation;

pub use cluster::ClusterError;
pub use config::{ConfigError, ReadOnlyOperation};
pub use definition::DefinitionError;
pub use process::ProcessError;
pub use registry::RegistryError;
pub use validation::ValidationError;
