// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for process lifecycle and configuration events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// Process moved to a new lifecycle state.
///
/// # Log Level
/// `debug!` - Diagnostic information
pub struct ProcessLifecycleChanged<'a> {
    pub name: &'a str,
    pub state: &'a str,
}

impl Display for ProcessLifecycleChanged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Process '{}' is now {}", self.name, self.state)
    }
}

impl StructuredLog for ProcessLifecycleChanged<'_> {
    fn log(&self) {
        tracing::debug!(process = self.name, state = self.state, "{}", self);
    }
}

/// Process adopted new values for its tunable keys.
///
/// # Log Level
/// `debug!` - Diagnostic information
///
/// # Example
/// ```
/// use the_sprocket::observability::messages::process::ProcessReconfigured;
///
/// let updated = vec!["label".to_string()];
/// let msg = ProcessReconfigured {
///     name: "chain/blur",
///     updated_keys: &updated,
/// };
///
/// assert_eq!(msg.to_string(), "Process 'chain/blur' reconfigured: 1 keys updated [label]");
/// ```
pub struct ProcessReconfigured<'a> {
    pub name: &'a str,
    pub updated_keys: &'a [String],
}

impl Display for ProcessReconfigured<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Process '{}' reconfigured: {} keys updated [{}]",
            self.name,
            self.updated_keys.len(),
            self.updated_keys.join(", ")
        )
    }
}

impl StructuredLog for ProcessReconfigured<'_> {
    fn log(&self) {
        tracing::debug!(
            process = self.name,
            updated_count = self.updated_keys.len(),
            "{}", self
        );
    }
}

/// Owning cluster pushed values into a process.
///
/// # Log Level
/// `debug!` - Diagnostic information
pub struct ProvidedConfigApplied<'a> {
    pub name: &'a str,
    pub provided_keys: &'a [String],
}

impl Display for ProvidedConfigApplied<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Process '{}' received {} provided values [{}]",
            self.name,
            self.provided_keys.len(),
            self.provided_keys.join(", ")
        )
    }
}

impl StructuredLog for ProvidedConfigApplied<'_> {
    fn log(&self) {
        tracing::debug!(
            process = self.name,
            provided_count = self.provided_keys.len(),
            "{}", self
        );
    }
}

/// Process completed one step.
///
/// # Log Level
/// `trace!` - Fires once per step
pub struct ProcessStepped<'a> {
    pub name: &'a str,
    pub step: u64,
}

impl Display for ProcessStepped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Process '{}' completed step {}", self.name, self.step)
    }
}

impl StructuredLog for ProcessStepped<'_> {
    fn log(&self) {
        tracing::trace!(process = self.name, step = self.step, "{}", self);
    }
}
