// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use super::processors::*;
use crate::errors::RegistryError;
use crate::pipeline::ProcessRegistry;
use crate::traits::Process;

/// Module identifier guarding the built-in registrations
pub const LOCAL_MODULE: &str = "the_sprocket.local";

/// Register the built-in structural processes:
/// - "passthrough" -> PassthroughProcess (in -> out)
/// - "source" -> SourceProcess (out)
/// - "sink" -> SinkProcess (in)
///
/// Runs at most once per registry; returns whether anything was registered.
pub fn register_processes(registry: &mut ProcessRegistry) -> Result<bool, RegistryError> {
    registry.load_module(LOCAL_MODULE, |registry| {
        registry.register_process(
            PASSTHROUGH_TYPE,
            "Forwards its input to its output",
            |_, name, config| Ok(Arc::new(PassthroughProcess::new(name, config)?) as Arc<dyn Process>),
        )?;
        registry.register_process(
            SOURCE_TYPE,
            "Produces data on a single output",
            |_, name, config| Ok(Arc::new(SourceProcess::new(name, config)?) as Arc<dyn Process>),
        )?;
        registry.register_process(
            SINK_TYPE,
            "Consumes data on a single input",
            |_, name, config| Ok(Arc::new(SinkProcess::new(name, config)) as Arc<dyn Process>),
        )?;
        Ok(())
    })
}

/// List all built-in process types
pub fn list_available_types() -> Vec<&'static str> {
    vec![PASSTHROUGH_TYPE, SINK_TYPE, SOURCE_TYPE]
}
