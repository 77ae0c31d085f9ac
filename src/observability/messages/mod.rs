// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! # Organization
//!
//! * `cluster` - cluster assembly and reconfiguration
//! * `definition` - loading and validating cluster definition files
//! * `process` - process lifecycle and configuration changes
//! * `registry` - process type registration and instantiation

use tracing::Span;

pub mod cluster;
pub mod definition;
pub mod process;
pub mod registry;

/// A message that knows how to emit itself as a structured `tracing` event.
pub trait StructuredLog {
    /// Emit the event at the message's level with its fields attached.
    fn log(&self);

    /// A span for work that follows the event.
    ///
    /// The default span only records `name`. Messages that open a unit of work
    /// override this to attach their own fields.
    fn span(&self, name: &str) -> Span {
        tracing::trace_span!("event", span_name = name)
    }
}
