// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed coercion of stored configuration text.

use std::path::PathBuf;

/// A type that can be read out of the textual value of a configuration key.
///
/// Coercion is strict: surrounding whitespace is not trimmed and anything the
/// type does not recognise is a failed cast.
pub trait ConfigValue: Sized {
    /// Human readable type name used in cast errors.
    const TYPE_NAME: &'static str;

    fn from_config_str(value: &str) -> Option<Self>;
}

impl ConfigValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_config_str(value: &str) -> Option<Self> {
        Some(value.to_string())
    }
}

impl ConfigValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_config_str(value: &str) -> Option<Self> {
        match value {
            "true" | "True" | "1" => Some(true),
            "false" | "False" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigValue for PathBuf {
    const TYPE_NAME: &'static str = "path";

    fn from_config_str(value: &str) -> Option<Self> {
        Some(PathBuf::from(value))
    }
}

macro_rules! parsed_config_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ConfigValue for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);

                fn from_config_str(value: &str) -> Option<Self> {
                    value.parse::<$ty>().ok()
                }
            }
        )*
    };
}

parsed_config_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, char);
