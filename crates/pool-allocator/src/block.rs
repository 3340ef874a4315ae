// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Block descriptors and allocation handles.
//!
//! A [`Block`] designates a sub-range of the pool's backing buffer by
//! offset and length. It never owns the bytes it describes.

use std::fmt;
use std::ops::Range;

/// Whether a block is available for allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockState {
    Free,
    Used,
}

impl BlockState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockState::Free => "free",
            BlockState::Used => "used",
        }
    }
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contiguous region of the pool tagged Free or Used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Block {
    /// Start position within the backing buffer, in bytes.
    pub offset: usize,
    /// Size of the region in bytes.
    pub length: usize,
    pub state: BlockState,
}

impl Block {
    pub(crate) fn free(offset: usize, length: usize) -> Self {
        Self {
            offset,
            length,
            state: BlockState::Free,
        }
    }

    /// One past the last byte covered by this block.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// The byte range of the backing buffer this block designates.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    pub fn is_free(&self) -> bool {
        self.state == BlockState::Free
    }

    pub fn is_used(&self) -> bool {
        self.state == BlockState::Used
    }
}

/// Opaque identifier for a live allocation.
///
/// Returned by [`Pool::alloc`](crate::Pool::alloc) and presented unchanged
/// to [`Pool::free`](crate::Pool::free). Internally it is the offset of the
/// allocated block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Handle(usize);

impl Handle {
    /// Builds a handle from a raw offset.
    ///
    /// Useful for drivers that read offsets back from text; a handle built
    /// this way is only meaningful if a used block starts at `offset`.
    pub fn from_offset(offset: usize) -> Self {
        Self(offset)
    }

    pub fn offset(&self) -> usize {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_range() {
        let b = Block::free(20, 30);
        assert_eq!(b.end(), 50);
        assert_eq!(b.range(), 20..50);
        assert!(b.is_free());
        assert!(!b.is_used());
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(Handle::from_offset(42).to_string(), "@42");
        assert_eq!(Handle::from_offset(42).offset(), 42);
    }

    #[test]
    fn test_state_serde() {
        let json = serde_json::to_string(&BlockState::Used).unwrap();
        assert_eq!(json, "\"used\"");
        let h: Handle = serde_json::from_str("17").unwrap();
        assert_eq!(h, Handle::from_offset(17));
    }
}
