// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod passthrough;
pub mod sink;
pub mod source;

pub use passthrough::*;
pub use sink::*;
pub use source::*;
