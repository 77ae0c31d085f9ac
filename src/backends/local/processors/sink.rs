// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::Config;
use crate::errors::ProcessError;
use crate::observability::messages::{process::ProcessStepped, StructuredLog};
use crate::pipeline::{ConfigKeyInfo, PortInfo, ProcessCore};
use crate::traits::Process;

pub const SINK_TYPE: &str = "sink";

/// Sink process - consumes `in`, produces nothing
pub struct SinkProcess {
    core: ProcessCore,
    steps: AtomicU64,
}

impl SinkProcess {
    pub fn new(name: &str, config: Config) -> Self {
        let mut core = ProcessCore::new(name, SINK_TYPE, config);
        core.declare_input_port("in", PortInfo::new("_any", "Consumed data"));
        core.declare_config_key(
            "label",
            ConfigKeyInfo::new(Some(SINK_TYPE), "Label reported for consumed data", true),
        );

        Self {
            core,
            steps: AtomicU64::new(0),
        }
    }

    pub fn steps(&self) -> u64 {
        self.steps.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Process for SinkProcess {
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
}
