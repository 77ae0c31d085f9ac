// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for loading and validating cluster definition files.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// A definition file was parsed and validated.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_sprocket::observability::messages::definition::DefinitionLoaded;
/// use std::path::Path;
///
/// let msg = DefinitionLoaded {
///     path: Path::new("configs/blur_chain.yaml"),
///     cluster_count: 2,
/// };
///
/// assert_eq!(msg.to_string(), "Loaded 2 cluster definitions from configs/blur_chain.yaml");
/// ```
pub struct DefinitionLoaded<'a> {
    pub path: &'a Path,
    pub cluster_count: usize,
}

impl Display for DefinitionLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded {} cluster definitions from {}",
            self.cluster_count,
            self.path.display()
        )
    }
}

impl StructuredLog for DefinitionLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            path = %self.path.display(),
            cluster_count = self.cluster_count,
            "{}", self
        );
    }
}

/// A definition file parsed but failed validation.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct DefinitionValidationFailed<'a> {
    pub path: &'a Path,
    pub issue_count: usize,
}

impl Display for DefinitionValidationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Definition file {} failed validation with {} issues",
            self.path.display(),
            self.issue_count
        )
    }
}

impl StructuredLog for DefinitionValidationFailed<'_> {
    fn log(&self) {
        tracing::error!(
            path = %self.path.display(),
            issue_count = self.issue_count,
            "{}", self
        );
    }
}

/// A cluster definition was registered as a process type.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ClusterTypeRegistered<'a> {
    pub cluster_type: &'a str,
    pub constituent_count: usize,
}

impl Display for ClusterTypeRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered cluster type '{}' ({} constituents)",
            self.cluster_type, self.constituent_count
        )
    }
}

impl StructuredLog for ClusterTypeRegistered<'_> {
    fn log(&self) {
        tracing::info!(
            cluster_type = self.cluster_type,
            constituent_count = self.constituent_count,
            "{}", self
        );
    }
}
