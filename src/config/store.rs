// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Hierarchical configuration store.
//!
//! A [`Config`] maps `:`-separated keys to string values. Every key can also be
//! marked read-only, after which ordinary `set`/`unset` calls fail.
//!
//! # Scoping
//!
//! Two projections exist over a key prefix:
//!
//! * [`Config::subblock`] copies every key under `prefix:` into a brand-new
//!   store with the prefix stripped. The copy is independent of its source.
//! * [`Config::subblock_view`] returns a handle onto the *same* backing table
//!   that only sees keys under `prefix:`. Writes through the view land in the
//!   parent and writes to the parent show up in the view.
//!
//! A key equal to the prefix itself (`block`) or one that merely starts with the
//! same characters (`blockkeya`) is never part of the `block` subblock.
//!
//! # Sharing
//!
//! The backing table lives behind an `Arc<RwLock<_>>`, so a `Config` handle is
//! cheap to clone and every clone aliases the same values. Use
//! [`Config::copy`] when an independent snapshot is wanted.
//!
//! # Examples
//!
//! ```
//! use the_sprocket::config::Config;
//!
//! let config = Config::new();
//! config.set("reader:path", "frames.txt").unwrap();
//!
//! let copy = config.subblock("reader");
//! let view = config.subblock_view("reader");
//!
//! config.set("reader:path", "other.txt").unwrap();
//!
//! assert_eq!(copy.get("path").unwrap(), "frames.txt");
//! assert_eq!(view.get("path").unwrap(), "other.txt");
//! ```

use crate::config::consts::BLOCK_SEP;
use crate::config::value::ConfigValue;
use crate::errors::{ConfigError, ReadOnlyOperation};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Storage shared by a store and every view over it. Keys are absolute.
#[derive(Debug, Default)]
struct ConfigTable {
    order: Vec<String>,
    values: HashMap<String, String>,
    read_only: HashSet<String>,
}

impl ConfigTable {
    fn insert(&mut self, key: String, value: String) {
        if !self.values.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.values.insert(key, value);
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.order.retain(|existing| existing != key);
        }
    }
}

/// A handle onto a configuration table, optionally scoped to a key prefix.
#[derive(Clone, Default)]
pub struct Config {
    table: Arc<RwLock<ConfigTable>>,
    /// Empty for a root store, otherwise `block:` including the separator.
    prefix: String,
}

/// Snapshot of one visible entry, used to move values between tables without
/// holding two locks at once.
struct Entry {
    key: String,
    value: String,
    read_only: bool,
}

impl Config {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn absolute(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn block_prefix(&self, block: &str) -> String {
        format!("{}{}{}", self.prefix, block, BLOCK_SEP)
    }

    /// Every visible entry below `prefix` (absolute), with that prefix stripped.
    fn entries_under(&self, prefix: &str) -> Vec<Entry> {
        let table = self.table.read();
        table
            .order
            .iter()
            .filter_map(|absolute| {
                let key = absolute.strip_prefix(prefix)?;
                if key.is_empty() {
                    return None;
                }
                Some(Entry {
                    key: key.to_string(),
                    value: table.values.get(absolute)?.clone(),
                    read_only: table.read_only.contains(absolute),
                })
            })
            .collect()
    }

    /// Fetch the raw value for `key`.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        self.table
            .read()
            .values
            .get(&self.absolute(key))
            .cloned()
            .ok_or_else(|| ConfigError::MissingKey {
                key: key.to_string(),
            })
    }

    /// Fetch the raw value for `key`, or `default` when it is absent.
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|_| default.to_string())
    }

    /// Fetch `key` coerced into `T`.
    pub fn get_typed<T: ConfigValue>(&self, key: &str) -> Result<T, ConfigError> {
        let value = self.get(key)?;
        T::from_config_str(&value).ok_or_else(|| ConfigError::BadCast {
            key: key.to_string(),
            value,
            target: T::TYPE_NAME,
        })
    }

    /// Fetch `key` coerced into `T`, falling back to `default` if the key is
    /// missing or its value does not parse.
    pub fn get_typed_or<T: ConfigValue>(&self, key: &str, default: T) -> T {
        // get_typed only fails with MissingKey or BadCast
        self.get_typed(key).unwrap_or(default)
    }

    pub fn has_value(&self, key: &str) -> bool {
        self.table.read().values.contains_key(&self.absolute(key))
    }

    pub fn is_read_only(&self, key: &str) -> bool {
        self.table.read().read_only.contains(&self.absolute(key))
    }

    /// Insert or overwrite `key`. Fails if the key is read-only.
    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<(), ConfigError> {
        let absolute = self.absolute(key);
        let mut table = self.table.write();
        if table.read_only.contains(&absolute) {
            return Err(ConfigError::ReadOnlyViolation {
                key: key.to_string(),
                operation: ReadOnlyOperation::Set,
            });
        }
        table.insert(absolute, value.into());
        Ok(())
    }

    /// Remove `key`. Removing an absent key is not an error; removing a
    /// read-only one is.
    pub fn unset(&self, key: &str) -> Result<(), ConfigError> {
        let absolute = self.absolute(key);
        let mut table = self.table.write();
        if table.read_only.contains(&absolute) {
            return Err(ConfigError::ReadOnlyViolation {
                key: key.to_string(),
                operation: ReadOnlyOperation::Unset,
            });
        }
        table.remove(&absolute);
        Ok(())
    }

    /// Lock `key` against further `set`/`unset`. Idempotent.
    pub fn mark_read_only(&self, key: &str) {
        let absolute = self.absolute(key);
        self.table.write().read_only.insert(absolute);
    }

    /// Write a value pushed down by an owning cluster. The read-only lock is
    /// bypassed and the key keeps whatever mark it had before.
    pub(crate) fn set_provided(&self, key: &str, value: impl Into<String>) {
        let absolute = self.absolute(key);
        self.table.write().insert(absolute, value.into());
    }

    /// Keys visible through this handle, in insertion order.
    pub fn available_keys(&self) -> Vec<String> {
        self.entries_under(&self.prefix)
            .into_iter()
            .map(|entry| entry.key)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.available_keys().is_empty()
    }

    /// Copy every key under `block:` into a new, independent store.
    pub fn subblock(&self, block: &str) -> Config {
        let copy = Config::new();
        copy.absorb(self.entries_under(&self.block_prefix(block)));
        copy
    }

    /// A live view onto the keys under `block:` sharing this store's table.
    pub fn subblock_view(&self, block: &str) -> Config {
        Config {
            table: Arc::clone(&self.table),
            prefix: self.block_prefix(block),
        }
    }

    /// An independent copy of everything visible through this handle.
    pub fn copy(&self) -> Config {
        let copy = Config::new();
        copy.absorb(self.entries_under(&self.prefix));
        copy
    }

    /// Overlay every key of `other` onto this store. Conflicting keys take
    /// `other`'s value and `other`'s read-only mark.
    pub fn merge(&self, other: &Config) {
        let incoming = other.entries_under(&other.prefix);
        self.absorb(incoming);
    }

    fn absorb(&self, entries: Vec<Entry>) {
        let mut table = self.table.write();
        for entry in entries {
            let absolute = self.absolute(&entry.key);
            if entry.read_only {
                table.read_only.insert(absolute.clone());
            } else {
                table.read_only.remove(&absolute);
            }
            table.insert(absolute, entry.value);
        }
    }

    /// True when both handles alias the same backing table.
    #[cfg(test)]
    pub(crate) fn shares_storage_with(&self, other: &Config) -> bool {
        Arc::ptr_eq(&self.table, &other.table)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for entry in self.entries_under(&self.prefix) {
            if entry.read_only {
                map.entry(&entry.key, &format_args!("{:?} (read-only)", entry.value));
            } else {
                map.entry(&entry.key, &entry.value);
            }
        }
        map.finish()
    }
}

/// Join key segments with the block separator.
///
/// ```
/// use the_sprocket::config::join_key;
///
/// assert_eq!(join_key(&["block", "sub", "key"]), "block:sub:key");
/// ```
pub fn join_key(segments: &[&str]) -> String {
    segments.join(&BLOCK_SEP.to_string())
}
