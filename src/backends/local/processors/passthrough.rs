// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::Config;
use crate::errors::ProcessError;
use crate::observability::messages::{process::ProcessStepped, StructuredLog};
use crate::pipeline::{ConfigKeyInfo, PortInfo, ProcessCore};
use crate::traits::Process;

pub const PASSTHROUGH_TYPE: &str = "passthrough";

/// Passthrough process - forwards whatever arrives on `in` to `out`
pub struct PassthroughProcess {
    core: ProcessCore,
    label: RwLock<String>,
    steps: AtomicU64,
}

impl PassthroughProcess {
    pub fn new(name: &str, config: Config) -> Result<Self, ProcessError> {
        let mut core = ProcessCore::new(name, PASSTHROUGH_TYPE, config);
        core.declare_input_port("in", PortInfo::new("_any", "Data to forward"));
        core.declare_output_port("out", PortInfo::new("_any", "Forwarded data"));
        core.declare_config_key(
            "label",
            ConfigKeyInfo::new(Some(PASSTHROUGH_TYPE), "Label attached to forwarded data", true),
        );

        let label = core.config_value("label")?;
        Ok(Self {
            core,
            label: RwLock::new(label),
            steps: AtomicU64::new(0),
        })
    }

    pub fn label(&self) -> String {
        self.label.read().clone()
    }

    pub fn steps(&self) -> u64 {
        self.steps.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Process for PassthroughProcess {
    fn core(&self) -> &ProcessCore {
        &self.core
    }

    async fn step(&self) -> Result<(), ProcessError> {
        self.core.ensure_initialized()?;
        let step = self.steps.fetch_add(1, Ordering::SeqCst) + 1;
        ProcessStepped {
            name: self.name(),
            step,
        }
        .log();
        Ok(())
    }

    fn on_reconfigure(&self, _conf: &Config) -> Result<(), ProcessError> {
        *self.label.write() = self.core.config_value("label")?;
        Ok(())
    }
}
