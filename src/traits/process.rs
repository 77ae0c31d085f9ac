// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::config::Config;
use crate::errors::ProcessError;
use crate::pipeline::{ProcessCluster, ProcessCore, ProvideAccess};

/// A named unit of computation with declared input and output ports.
///
/// Implementors only provide [`core`](Process::core) and [`step`](Process::step);
/// everything else is answered by the embedded [`ProcessCore`]. Override
/// [`on_reconfigure`](Process::on_reconfigure) to react to new configuration
/// values after they have been applied.
#[async_trait]
pub trait Process: Send + Sync {
    fn core(&self) -> &ProcessCore;

    /// Advance one computation step. Driven by an external scheduler.
    async fn step(&self) -> Result<(), ProcessError>;

    fn name(&self) -> &str {
        self.core().name()
    }

    fn process_type(&self) -> &str {
        self.core().process_type()
    }

    fn config(&self) -> &Config {
        self.core().config()
    }

    fn has_input_port(&self, port: &str) -> bool {
        self.core().has_input_port(port)
    }

    fn has_output_port(&self, port: &str) -> bool {
        self.core().has_output_port(port)
    }

    fn input_ports(&self) -> Vec<String> {
        self.core().input_ports()
    }

    fn output_ports(&self) -> Vec<String> {
        self.core().output_ports()
    }

    fn properties(&self) -> BTreeSet<String> {
        self.core().properties()
    }

    fn configure(&self) -> Result<(), ProcessError> {
        self.core().configure()
    }

    fn init(&self) -> Result<(), ProcessError> {
        self.core().init()
    }

    /// Adopt tunable values from `conf`.
    fn reconfigure(&self, conf: &Config) -> Result<(), ProcessError> {
        self.core().reconfigure(conf)?;
        self.on_reconfigure(conf)
    }

    /// Apply values pushed down by an owning cluster, read-only or not.
    fn reconfigure_with_provides(&self, conf: &Config, _access: ProvideAccess) -> Result<(), ProcessError> {
        self.core().reconfigure_with_provides(conf)?;
        self.on_reconfigure(conf)
    }

    fn on_reconfigure(&self, _conf: &Config) -> Result<(), ProcessError> {
        Ok(())
    }

    fn as_cluster(&self) -> Option<&ProcessCluster> {
        None
    }
}
