// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the process registry.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// A factory was registered under a process type name.
///
/// # Log Level
/// `debug!` - Diagnostic information
pub struct ProcessTypeRegistered<'a> {
    pub type_name: &'a str,
    pub description: &'a str,
}

impl Display for ProcessTypeRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered process type '{}': {}",
            self.type_name, self.description
        )
    }
}

impl StructuredLog for ProcessTypeRegistered<'_> {
    fn log(&self) {
        tracing::debug!(process_type = self.type_name, "{}", self);
    }
}

/// A process instance was created through the registry.
///
/// # Log Level
/// `debug!` - Diagnostic information
pub struct ProcessCreated<'a> {
    pub type_name: &'a str,
    pub name: &'a str,
}

impl Display for ProcessCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Created process '{}' of type '{}'", self.name, self.type_name)
    }
}

impl StructuredLog for ProcessCreated<'_> {
    fn log(&self) {
        tracing::debug!(process = self.name, process_type = self.type_name, "{}", self);
    }
}

/// A registered factory failed to build a process.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ProcessCreationFailed<'a> {
    pub type_name: &'a str,
    pub name: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ProcessCreationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to create process '{}' of type '{}': {}",
            self.name, self.type_name, self.error
        )
    }
}

impl StructuredLog for ProcessCreationFailed<'_> {
    fn log(&self) {
        tracing::error!(
            process = self.name,
            process_type = self.type_name,
            error = %self.error,
            "{}", self
        );
    }
}

/// A registration module ran its population logic.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ModuleLoaded<'a> {
    pub module: &'a str,
    pub type_count: usize,
}

impl Display for ModuleLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded module '{}' ({} process types registered)",
            self.module, self.type_count
        )
    }
}

impl StructuredLog for ModuleLoaded<'_> {
    fn log(&self) {
        tracing::info!(module = self.module, type_count = self.type_count, "{}", self);
    }
}

/// A registration module was requested again and skipped.
///
/// # Log Level
/// `debug!` - Diagnostic information
pub struct ModuleAlreadyLoaded<'a> {
    pub module: &'a str,
}

impl Display for ModuleAlreadyLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Module '{}' already loaded, skipping", self.module)
    }
}

impl StructuredLog for ModuleAlreadyLoaded<'_> {
    fn log(&self) {
        tracing::debug!(module = self.module, "{}", self);
    }
}
