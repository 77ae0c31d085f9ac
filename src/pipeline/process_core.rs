// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! State shared by every process: identity, declared ports, declared
//! configuration keys, properties and lifecycle.
//!
//! Concrete processes embed a [`ProcessCore`] and hand it out through
//! [`Process::core`](crate::traits::Process::core); the trait's provided
//! methods do the rest.
//!
//! # Reconfiguration rules
//!
//! * A key is *tunable* when it was declared tunable **and** is not read-only
//!   in the process's configuration.
//! * [`ProcessCore::reconfigure`] copies new values for tunable keys only.
//! * [`ProcessCore::reconfigure_with_provides`] writes every provided key,
//!   read-only or not, and leaves read-only marks in place. Only owning
//!   clusters use this path; the trait method behind it demands a
//!   [`ProvideAccess`] that cannot be built outside this crate.

use crate::config::{Config, ConfigValue};
use crate::errors::{ConfigError, ProcessError};
use crate::observability::messages::process::{
    ProcessLifecycleChanged, ProcessReconfigured, ProvidedConfigApplied,
};
use crate::observability::messages::StructuredLog;
use crate::pipeline::port::PortInfo;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Declaration of a configuration key a process understands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigKeyInfo {
    /// Used when the process's configuration has no value for the key.
    pub default: Option<String>,
    pub description: String,
    /// Whether the key may change after construction.
    pub tunable: bool,
}

impl ConfigKeyInfo {
    pub fn new(default: Option<&str>, description: impl Into<String>, tunable: bool) -> Self {
        Self {
            default: default.map(str::to_string),
            description: description.into(),
            tunable,
        }
    }
}

/// Permission to push provided values over a process's read-only keys.
///
/// Only an owning [`ProcessCluster`](crate::pipeline::ProcessCluster) can
/// create one, so code outside the crate has no way to call
/// [`Process::reconfigure_with_provides`](crate::traits::Process::reconfigure_with_provides):
///
/// ```compile_fail
/// use the_sprocket::backends::local;
/// use the_sprocket::config::Config;
/// use the_sprocket::pipeline::{ProcessRegistry, ProvideAccess};
///
/// let mut registry = ProcessRegistry::new();
/// local::register_processes(&mut registry).unwrap();
/// let copy = registry.create_process("passthrough", "copy", Config::new()).unwrap();
///
/// let provided = Config::new();
/// provided.set("label", "hacked").unwrap();
/// copy.reconfigure_with_provides(&provided, ProvideAccess::new()).unwrap();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ProvideAccess {
    _owner: (),
}

impl ProvideAccess {
    pub(crate) fn new() -> Self {
        Self { _owner: () }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Created,
    Configured,
    Initialized,
}

impl ProcessState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessState::Created => "created",
            ProcessState::Configured => "configured",
            ProcessState::Initialized => "initialized",
        }
    }
}

pub struct ProcessCore {
    name: String,
    process_type: String,
    config: Config,
    input_ports: BTreeMap<String, PortInfo>,
    output_ports: BTreeMap<String, PortInfo>,
    config_keys: BTreeMap<String, ConfigKeyInfo>,
    properties: BTreeSet<String>,
    state: RwLock<ProcessState>,
}

impl ProcessCore {
    pub fn new(name: impl Into<String>, process_type: impl Into<String>, config: Config) -> Self {
        Self {
            name: name.into(),
            process_type: process_type.into(),
            config,
            input_ports: BTreeMap::new(),
            output_ports: BTreeMap::new(),
            config_keys: BTreeMap::new(),
            properties: BTreeSet::new(),
            state: RwLock::new(ProcessState::Created),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn process_type(&self) -> &str {
        &self.process_type
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn declare_input_port(&mut self, port: impl Into<String>, info: PortInfo) {
        self.input_ports.insert(port.into(), info);
    }

    pub fn declare_output_port(&mut self, port: impl Into<String>, info: PortInfo) {
        self.output_ports.insert(port.into(), info);
    }

    pub fn has_input_port(&self, port: &str) -> bool {
        self.input_ports.contains_key(port)
    }

    pub fn has_output_port(&self, port: &str) -> bool {
        self.output_ports.contains_key(port)
    }

    pub fn input_port_info(&self, port: &str) -> Option<&PortInfo> {
        self.input_ports.get(port)
    }

    pub fn output_port_info(&self, port: &str) -> Option<&PortInfo> {
        self.output_ports.get(port)
    }

    pub fn input_ports(&self) -> Vec<String> {
        self.input_ports.keys().cloned().collect()
    }

    pub fn output_ports(&self) -> Vec<String> {
        self.output_ports.keys().cloned().collect()
    }

    pub fn declare_config_key(&mut self, key: impl Into<String>, info: ConfigKeyInfo) {
        self.config_keys.insert(key.into(), info);
    }

    pub fn config_key_info(&self, key: &str) -> Option<&ConfigKeyInfo> {
        self.config_keys.get(key)
    }

    /// Every declared configuration key, sorted.
    pub fn available_config(&self) -> Vec<String> {
        self.config_keys.keys().cloned().collect()
    }

    /// Declared-tunable keys that are not currently read-only.
    pub fn available_tunable_config(&self) -> Vec<String> {
        self.config_keys
            .iter()
            .filter(|(key, info)| info.tunable && !self.config.is_read_only(key))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// The configured value of `key`, else its declared default.
    pub fn config_value<T: ConfigValue>(&self, key: &str) -> Result<T, ConfigError> {
        if self.config.has_value(key) {
            return self.config.get_typed(key);
        }

        let default = self
            .config_keys
            .get(key)
            .and_then(|info| info.default.clone())
            .ok_or_else(|| ConfigError::MissingKey {
                key: key.to_string(),
            })?;

        T::from_config_str(&default).ok_or_else(|| ConfigError::BadCast {
            key: key.to_string(),
            value: default,
            target: T::TYPE_NAME,
        })
    }

    pub fn add_property(&mut self, property: impl Into<String>) {
        self.properties.insert(property.into());
    }

    pub fn properties(&self) -> BTreeSet<String> {
        self.properties.clone()
    }

    pub fn state(&self) -> ProcessState {
        *self.state.read()
    }

    pub fn configure(&self) -> Result<(), ProcessError> {
        self.transition(ProcessState::Created, ProcessState::Configured)
            .map_err(|_| ProcessError::AlreadyConfigured {
                name: self.name.clone(),
            })
    }

    pub fn init(&self) -> Result<(), ProcessError> {
        self.transition(ProcessState::Configured, ProcessState::Initialized)
            .map_err(|current| match current {
                ProcessState::Created => ProcessError::NotConfigured {
                    name: self.name.clone(),
                },
                _ => ProcessError::AlreadyInitialized {
                    name: self.name.clone(),
                },
            })
    }

    pub fn ensure_initialized(&self) -> Result<(), ProcessError> {
        match self.state() {
            ProcessState::Initialized => Ok(()),
            _ => Err(ProcessError::NotInitialized {
                name: self.name.clone(),
            }),
        }
    }

    /// Move from `from` to `to`, returning the actual state on mismatch.
    fn transition(&self, from: ProcessState, to: ProcessState) -> Result<(), ProcessState> {
        let mut state = self.state.write();
        if *state != from {
            return Err(*state);
        }
        *state = to;
        drop(state);

        ProcessLifecycleChanged {
            name: &self.name,
            state: to.as_str(),
        }
        .log();
        Ok(())
    }

    /// Adopt new values for every tunable key present in `conf`.
    pub fn reconfigure(&self, conf: &Config) -> Result<(), ProcessError> {
        let mut updated = Vec::new();
        for key in self.available_tunable_config() {
            if !conf.has_value(&key) {
                continue;
            }
            let value = conf.get(&key)?;
            self.config.set(&key, value)?;
            updated.push(key);
        }

        ProcessReconfigured {
            name: &self.name,
            updated_keys: &updated,
        }
        .log();
        Ok(())
    }

    /// Write every key of `provided`, even over read-only values.
    pub(crate) fn reconfigure_with_provides(&self, provided: &Config) -> Result<(), ProcessError> {
        let keys = provided.available_keys();
        for key in &keys {
            let value = provided.get(key)?;
            self.config.set_provided(key, value);
        }

        ProvidedConfigApplied {
            name: &self.name,
            provided_keys: &keys,
        }
        .log();
        Ok(())
    }
}

impl std::fmt::Debug for ProcessCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessCore")
            .field("name", &self.name)
            .field("process_type", &self.process_type)
            .field("input_ports", &self.input_ports.keys().collect::<Vec<_>>())
            .field("output_ports", &self.output_ports.keys().collect::<Vec<_>>())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core_with_keys() -> ProcessCore {
        let config = Config::new();
        config.set("speed", "3").unwrap();
        config.set("mode", "fast").unwrap();
        config.mark_read_only("mode");

        let mut core = ProcessCore::new("proc", "test", config);
        core.declare_config_key("speed", ConfigKeyInfo::new(Some("1"), "speed", true));
        core.declare_config_key("mode", ConfigKeyInfo::new(Some("slow"), "mode", true));
        core.declare_config_key("depth", ConfigKeyInfo::new(Some("8"), "depth", false));
        core.declare_config_key("name", ConfigKeyInfo::new(None, "name", true));
        core
    }

    #[test]
    fn test_tunable_excludes_read_only_and_fixed_keys() {
        let core = core_with_keys();
        assert_eq!(core.available_config(), vec!["depth", "mode", "name", "speed"]);
        assert_eq!(core.available_tunable_config(), vec!["name", "speed"]);
    }

    #[test]
    fn test_config_value_falls_back_to_default() {
        let core = core_with_keys();

        assert_eq!(core.config_value::<u32>("speed").unwrap(), 3);
        assert_eq!(core.config_value::<u32>("depth").unwrap(), 8);
        assert!(matches!(
            core.config_value::<String>("name"),
            Err(ConfigError::MissingKey { .. })
        ));
        assert!(matches!(
            core.config_value::<u32>("mode"),
            Err(ConfigError::BadCast { .. })
        ));
    }

    #[test]
    fn test_reconfigure_only_touches_tunable_keys() {
        let core = core_with_keys();
        let update = Config::new();
        update.set("speed", "9").unwrap();
        update.set("mode", "turbo").unwrap();
        update.set("depth", "16").unwrap();
        update.set("undeclared", "x").unwrap();

        core.reconfigure(&update).unwrap();

        assert_eq!(core.config().get("speed").unwrap(), "9");
        assert_eq!(core.config().get("mode").unwrap(), "fast");
        assert!(!core.config().has_value("depth"));
        assert!(!core.config().has_value("undeclared"));
    }

    #[test]
    fn test_provided_values_override_read_only() {
        let core = core_with_keys();
        let provided = Config::new();
        provided.set("mode", "turbo").unwrap();

        core.reconfigure_with_provides(&provided).unwrap();

        assert_eq!(core.config().get("mode").unwrap(), "turbo");
        assert!(core.config().is_read_only("mode"));
    }

    #[test]
    fn test_lifecycle_order() {
        let core = ProcessCore::new("proc", "test", Config::new());

        assert!(matches!(core.init(), Err(ProcessError::NotConfigured { .. })));
        assert!(matches!(core.ensure_initialized(), Err(ProcessError::NotInitialized { .. })));

        core.configure().unwrap();
        assert!(matches!(core.configure(), Err(ProcessError::AlreadyConfigured { .. })));

        core.init().unwrap();
        assert!(matches!(core.init(), Err(ProcessError::AlreadyInitialized { .. })));
        assert!(matches!(core.configure(), Err(ProcessError::AlreadyConfigured { .. })));
        core.ensure_initialized().unwrap();
        assert_eq!(core.state(), ProcessState::Initialized);
    }

    #[test]
    fn test_ports() {
        let mut core = ProcessCore::new("proc", "test", Config::new());
        core.declare_input_port("in", PortInfo::new("image", "frames"));
        core.declare_output_port("out", PortInfo::default());

        assert!(core.has_input_port("in"));
        assert!(!core.has_input_port("out"));
        assert!(core.has_output_port("out"));
        assert_eq!(core.input_port_info("in").unwrap().port_type, "image");
        assert_eq!(core.input_ports(), vec!["in"]);
    }
}
