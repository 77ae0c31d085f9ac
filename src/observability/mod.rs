// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Every diagnostic event the crate emits is a small struct with a `Display`
//! implementation and a [`StructuredLog`](messages::StructuredLog)
//! implementation that knows its own level and fields. Call sites build the
//! struct and call `.log()`; no message text lives at the call site.
//!
//! # Usage
//!
//! ```rust
//! use the_sprocket::observability::messages::cluster::ClusterStepRejected;
//! use the_sprocket::observability::messages::StructuredLog;
//!
//! ClusterStepRejected { cluster: "blur_chain" }.log();
//! ```

pub mod messages;
