// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for loading cluster definition files.

use crate::errors::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("Failed to read definition file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML definition: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML definition: {0}")]
    Toml(#[from] toml::de::Error),

    /// The file parsed but failed validation; every issue found is listed.
    #[error("Definition validation failed:\n{}", join_issues(.issues))]
    Invalid { issues: Vec<ValidationError> },
}

pub(super) fn join_issues(issues: &[ValidationError]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
