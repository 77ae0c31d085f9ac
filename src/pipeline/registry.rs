// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Maps process type names to factories.
//!
//! A [`ProcessRegistry`] is an ordinary value owned by whoever assembles the
//! pipeline and passed by reference into cluster assembly. It also tracks which
//! registration modules have already populated it so each one runs once.
//!
//! ```
//! use the_sprocket::backends::local;
//! use the_sprocket::config::Config;
//! use the_sprocket::pipeline::ProcessRegistry;
//!
//! let mut registry = ProcessRegistry::new();
//! local::register_processes(&mut registry).unwrap();
//!
//! let process = registry
//!     .create_process("passthrough", "copy", Config::new())
//!     .unwrap();
//! assert!(process.has_input_port("in"));
//! ```

use crate::config::Config;
use crate::errors::{ProcessError, RegistryError};
use crate::observability::messages::registry::{
    ModuleAlreadyLoaded, ModuleLoaded, ProcessCreated, ProcessCreationFailed,
    ProcessTypeRegistered,
};
use crate::observability::messages::StructuredLog;
use crate::traits::Process;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Builds a process from its qualified name and configuration.
///
/// The registry is handed back in so composite processes can create their own
/// constituents.
pub type ProcessFactory = Arc<
    dyn Fn(&ProcessRegistry, &str, Config) -> Result<Arc<dyn Process>, ProcessError> + Send + Sync,
>;

struct RegisteredProcess {
    description: String,
    factory: ProcessFactory,
}

#[derive(Default)]
pub struct ProcessRegistry {
    types: BTreeMap<String, RegisteredProcess>,
    loaded_modules: HashSet<String>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_process<F>(
        &mut self,
        type_name: &str,
        description: &str,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&ProcessRegistry, &str, Config) -> Result<Arc<dyn Process>, ProcessError>
            + Send
            + Sync
            + 'static,
    {
        if self.types.contains_key(type_name) {
            return Err(RegistryError::TypeAlreadyExists {
                type_name: type_name.to_string(),
            });
        }

        self.types.insert(
            type_name.to_string(),
            RegisteredProcess {
                description: description.to_string(),
                factory: Arc::new(factory),
            },
        );

        ProcessTypeRegistered {
            type_name,
            description,
        }
        .log();
        Ok(())
    }

    /// Instantiate a process of `type_name` under the (qualified) `name`.
    pub fn create_process(
        &self,
        type_name: &str,
        name: &str,
        config: Config,
    ) -> Result<Arc<dyn Process>, RegistryError> {
        let registered = self
            .types
            .get(type_name)
            .ok_or_else(|| RegistryError::NoSuchType {
                type_name: type_name.to_string(),
            })?;

        match (registered.factory)(self, name, config) {
            Ok(process) => {
                ProcessCreated { type_name, name }.log();
                Ok(process)
            }
            Err(error) => {
                ProcessCreationFailed {
                    type_name,
                    name,
                    error: &error,
                }
                .log();
                Err(RegistryError::Construction {
                    type_name: type_name.to_string(),
                    name: name.to_string(),
                    source: error,
                })
            }
        }
    }

    pub fn has_type(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Registered type names, sorted.
    pub fn types(&self) -> Vec<String> {
        self.types.keys().cloned().collect()
    }

    pub fn description(&self, type_name: &str) -> Result<&str, RegistryError> {
        self.types
            .get(type_name)
            .map(|registered| registered.description.as_str())
            .ok_or_else(|| RegistryError::NoSuchType {
                type_name: type_name.to_string(),
            })
    }

    pub fn is_module_loaded(&self, module: &str) -> bool {
        self.loaded_modules.contains(module)
    }

    pub fn mark_module_as_loaded(&mut self, module: &str) {
        self.loaded_modules.insert(module.to_string());
    }

    /// Run `register` unless `module` already populated this registry.
    ///
    /// Returns whether the module ran. A module that fails is not marked, so a
    /// later attempt runs it again.
    pub fn load_module<F>(&mut self, module: &str, register: F) -> Result<bool, RegistryError>
    where
        F: FnOnce(&mut ProcessRegistry) -> Result<(), RegistryError>,
    {
        if self.is_module_loaded(module) {
            ModuleAlreadyLoaded { module }.log();
            return Ok(false);
        }

        let before = self.types.len();
        register(self)?;
        self.mark_module_as_loaded(module);

        ModuleLoaded {
            module,
            type_count: self.types.len() - before,
        }
        .log();
        Ok(true)
    }
}

impl std::fmt::Debug for ProcessRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessRegistry")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .field("loaded_modules", &self.loaded_modules)
            .finish()
    }
}
