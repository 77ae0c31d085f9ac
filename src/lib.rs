// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // built-in and test processes
pub mod config;     // config store + cluster definitions
pub mod errors;     // error handling
pub mod observability;
pub mod pipeline;   // ports, registry, clusters
pub mod traits;     // process contract
