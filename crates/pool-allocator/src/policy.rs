// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! What `free` does with a released block.

use std::fmt;

/// How [`Pool::free`](crate::Pool::free) treats the block it releases.
///
/// | Policy     | Block after free          | Coverage of the buffer |
/// |------------|---------------------------|------------------------|
/// | `Remove`   | dropped from the list     | leaves a hole          |
/// | `MarkFree` | re-tagged Free in place   | gap-free               |
/// | `Coalesce` | Free, merged w/ neighbours| gap-free               |
///
/// `Remove` is the legacy behavior and the default. Bytes under a hole are
/// never handed out again for the lifetime of the pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FreePolicy {
    #[default]
    Remove,
    MarkFree,
    Coalesce,
}

impl FreePolicy {
    pub fn name(&self) -> &'static str {
        match self {
            FreePolicy::Remove => "remove",
            FreePolicy::MarkFree => "mark-free",
            FreePolicy::Coalesce => "coalesce",
        }
    }

    /// Whether blocks always cover the whole buffer under this policy.
    pub fn preserves_coverage(&self) -> bool {
        !matches!(self, FreePolicy::Remove)
    }

    /// Parses a policy name, accepting a few aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "remove" | "legacy" => Some(FreePolicy::Remove),
            "mark-free" | "mark" => Some(FreePolicy::MarkFree),
            "coalesce" | "merge" => Some(FreePolicy::Coalesce),
            _ => None,
        }
    }
}

impl fmt::Display for FreePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
