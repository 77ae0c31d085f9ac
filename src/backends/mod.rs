// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Process implementations that can be registered into a
//! [`ProcessRegistry`](crate::pipeline::ProcessRegistry).
//!
//! # Available Backends
//!
//! ## Local Backend
//! Built-in structural processes with no computation of their own:
//! - **passthrough**: forwards `in` to `out`
//! - **source**: produces on `out`
//! - **sink**: consumes `in`
//!
//! Each declares a tunable `label` key, which makes them handy constituents for
//! exercising config mapping and reconfiguration in clusters.
//!
//! ## Stub Backend (Test-Only)
//! Configurable stub processes for cluster assembly tests (only available in
//! test builds):
//! - **StubProcess**: arbitrary ports plus `speed`, `mode` and `depth` keys
//! - **stub_registry**: a registry with `stub`, `stub_source` and `stub_sink`
//!
//! # Examples
//!
//! ```rust
//! use the_sprocket::backends::local;
//! use the_sprocket::pipeline::ProcessRegistry;
//!
//! let mut registry = ProcessRegistry::new();
//! local::register_processes(&mut registry).unwrap();
//!
//! assert_eq!(registry.types(), vec!["passthrough", "sink", "source"]);
//! ```

pub mod local;
#[cfg(test)]
pub mod stub;
