// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Pool configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! capacity = "4K"
//! free_policy = "coalesce"
//! strict_free = true
//! ```
//!
//! `capacity` is required. `free_policy` defaults to `"remove"` and
//! `strict_free` to `false`.

use crate::{AllocError, FreePolicy, Pool, PoolCapacity, PoolOptions};
use std::path::Path;

/// Configuration for a [`Pool`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PoolConfig {
    /// Pool capacity (human-readable, e.g. `"100"`, `"4K"`).
    pub capacity: String,
    /// Free policy: `"remove"`, `"mark-free"`, or `"coalesce"`.
    #[serde(default)]
    pub free_policy: FreePolicy,
    /// Whether unknown handles passed to `free` are errors.
    #[serde(default)]
    pub strict_free: bool,
}

impl PoolConfig {
    /// Creates a config with the given capacity and default options.
    pub fn new(capacity: impl Into<String>) -> Self {
        Self {
            capacity: capacity.into(),
            free_policy: FreePolicy::default(),
            strict_free: false,
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, AllocError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AllocError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, AllocError> {
        toml::from_str(toml_str)
            .map_err(|e| AllocError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, AllocError> {
        toml::to_string_pretty(self)
            .map_err(|e| AllocError::Config(format!("TOML serialise error: {e}")))
    }

    /// Parses the capacity string into a [`PoolCapacity`].
    pub fn parse_capacity(&self) -> Result<PoolCapacity, AllocError> {
        PoolCapacity::parse(&self.capacity)
    }

    pub fn options(&self) -> PoolOptions {
        PoolOptions {
            free_policy: self.free_policy,
            strict_free: self.strict_free,
        }
    }

    /// Creates the pool this config describes.
    pub fn build(&self) -> Result<Pool, AllocError> {
        Pool::with_capacity(self.parse_capacity()?, self.options())
    }
}
