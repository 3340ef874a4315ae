// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Pool capacity and human-readable size parsing.
//!
//! A [`PoolCapacity`] is the fixed size of a pool's backing buffer. It is
//! always positive; there is no default.

use crate::AllocError;
use std::fmt;

/// The size of a pool's backing buffer, in bytes.
///
/// # Parsing
/// Accepts a byte count with an optional binary suffix:
/// - `"100"` or `"100B"` → 100 bytes
/// - `"4K"` or `"4KB"` → 4 × 1024 bytes
/// - `"1M"` or `"1MB"` → 1 × 1024² bytes
///
/// # Examples
/// ```
/// use pool_allocator::PoolCapacity;
///
/// let c = PoolCapacity::parse("4K").unwrap();
/// assert_eq!(c.as_bytes(), 4096);
///
/// assert!(PoolCapacity::parse("0").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct PoolCapacity {
    bytes: usize,
}

impl PoolCapacity {
    /// Creates a capacity from a byte count. Zero is rejected.
    pub fn from_bytes(bytes: usize) -> Result<Self, AllocError> {
        if bytes == 0 {
            return Err(AllocError::ZeroCapacity);
        }
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> usize {
        self.bytes
    }

    /// Parses a human-readable capacity string. Case-insensitive.
    pub fn parse(s: &str) -> Result<Self, AllocError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AllocError::InvalidCapacity("empty string".to_string()));
        }

        let upper = s.to_uppercase();
        let (num_str, multiplier) = if upper.ends_with("MB") {
            (&s[..s.len() - 2], 1024 * 1024)
        } else if upper.ends_with('M') {
            (&s[..s.len() - 1], 1024 * 1024)
        } else if upper.ends_with("KB") {
            (&s[..s.len() - 2], 1024)
        } else if upper.ends_with('K') {
            (&s[..s.len() - 1], 1024)
        } else if upper.ends_with('B') {
            (&s[..s.len() - 1], 1)
        } else {
            (s, 1)
        };

        let value: usize = num_str.trim().parse().map_err(|_| {
            AllocError::InvalidCapacity(format!(
                "'{s}': expected a number followed by an optional suffix (B, K, M)"
            ))
        })?;

        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| AllocError::InvalidCapacity(format!("'{s}' overflows usize")))?;

        Self::from_bytes(bytes)
    }
}

impl TryFrom<usize> for PoolCapacity {
    type Error = AllocError;

    fn try_from(bytes: usize) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

impl From<PoolCapacity> for usize {
    fn from(c: PoolCapacity) -> Self {
        c.bytes
    }
}

impl std::str::FromStr for PoolCapacity {
    type Err = AllocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PoolCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bytes >= 1024 * 1024 && self.bytes % (1024 * 1024) == 0 {
            write!(f, "{} MB", self.bytes / (1024 * 1024))
        } else if self.bytes >= 1024 && self.bytes % 1024 == 0 {
            write!(f, "{} KB", self.bytes / 1024)
        } else {
            write!(f, "{} B", self.bytes)
        }
    }
}
