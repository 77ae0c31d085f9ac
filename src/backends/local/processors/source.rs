// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::Config;
use crate::errors::ProcessError;
use crate::observability::messages::{process::ProcessStepped, StructuredLog};
use crate::pipeline::{ConfigKeyInfo, PortInfo, ProcessCore};
use crate::traits::Process;

pub const SOURCE_TYPE: &str = "source";

/// Source process - produces on `out`, consumes nothing
pub struct SourceProcess {
    core: ProcessCore,
    steps: AtomicU64,
}

impl SourceProcess {
    pub fn new(name: &str, config: Config) -> Result<Self, ProcessError> {
        let mut core = ProcessCore::new(name, SOURCE_TYPE, config);
        core.declare_output_port("out", PortInfo::new("_any", "Produced data"));
        core.declare_config_key(
            "label",
            ConfigKeyInfo::new(Some(SOURCE_TYPE), "Label attached to produced data", true),
        );
        core.declare_config_key(
            "interval_ms",
            ConfigKeyInfo::new(Some("0"), "Delay between productions", false),
        );

        // reject unparseable values at construction
        core.config_value::<u64>("interval_ms")?;

        Ok(Self {
            core,
            steps: AtomicU64::new(0),
        })
    }

    pub fn steps(&self) -> u64 {
        self.steps.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Process for SourceProcess {
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
