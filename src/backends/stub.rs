// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::Config;
use crate::errors::ProcessError;
use crate::pipeline::{ConfigKeyInfo, PortInfo, ProcessCore, ProcessRegistry};
use crate::traits::Process;

/// A configurable process for exercising cluster assembly.
///
/// Declares a tunable `speed` key (default `1`), a tunable `mode` key
/// (default `normal`) and a fixed `depth` key (default `8`).
pub struct StubProcess {
    core: ProcessCore,
    steps: AtomicU64,
    reconfigure_calls: AtomicU64,
}

impl StubProcess {
    /// A stub with one input port `in` and one output port `out`.
    pub fn new(name: &str, config: Config) -> Self {
        Self::with_ports(name, "stub", config, &["in"], &["out"])
    }

    pub fn with_ports(
        name: &str,
        process_type: &str,
        config: Config,
        inputs: &[&str],
        outputs: &[&str],
    ) -> Self {
        let mut core = ProcessCore::new(name, process_type, config);
        for port in inputs {
            core.declare_input_port(*port, PortInfo::new("_any", "stub input"));
        }
        for port in outputs {
            core.declare_output_port(*port, PortInfo::new("_any", "stub output"));
        }
        core.declare_config_key("speed", ConfigKeyInfo::new(Some("1"), "steps per tick", true));
        core.declare_config_key("mode", ConfigKeyInfo::new(Some("normal"), "operating mode", true));
        core.declare_config_key("depth", ConfigKeyInfo::new(Some("8"), "fixed depth", false));

        Self {
            core,
            steps: AtomicU64::new(0),
            reconfigure_calls: AtomicU64::new(0),
        }
    }

    pub fn steps(&self) -> u64 {
        self.steps.load(Ordering::SeqCst)
    }

    pub fn reconfigure_calls(&self) -> u64 {
        self.reconfigure_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Process for StubProcess {
    fn core(&self) -> &ProcessCore {
        &self.core
    }

    async fn step(&self) -> Result<(), ProcessError> {
        self.steps.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_reconfigure(&self, _conf: &Config) -> Result<(), ProcessError> {
        self.reconfigure_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

const STUB_TYPES: [(&str, &[&str], &[&str]); 3] = [
    ("stub", &["in"], &["out"]),
    ("stub_source", &[], &["out"]),
    ("stub_sink", &["in"], &[]),
];

/// A registry with `stub` (in/out), `stub_source` (out) and `stub_sink` (in).
pub fn stub_registry() -> ProcessRegistry {
    let mut registry = ProcessRegistry::new();

    for (type_name, inputs, outputs) in STUB_TYPES {
        registry
            .register_process(type_name, "test stub", move |_, name, config| {
                Ok(Arc::new(StubProcess::with_ports(name, type_name, config, inputs, outputs))
                    as Arc<dyn Process>)
            })
            .expect("stub types are unique");
    }
    registry
}
