// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the pool allocator.

/// Errors that can occur while creating or operating on a [`Pool`](crate::Pool).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocError {
    /// No free block is large enough for the request, or the backing
    /// buffer / block list could not be reserved.
    #[error("out of memory: requested {requested_bytes} bytes, largest free block is {largest_free_bytes} (capacity: {capacity_bytes})")]
    OutOfMemory {
        requested_bytes: usize,
        largest_free_bytes: usize,
        capacity_bytes: usize,
    },

    /// Attempted to allocate a zero-sized block.
    #[error("cannot allocate zero-sized block")]
    ZeroSizedAllocation,

    /// Attempted to create a pool with zero capacity.
    #[error("pool capacity must be greater than zero")]
    ZeroCapacity,

    /// The handle does not name a live allocation (strict mode only).
    #[error("invalid handle: no used block at offset {offset}")]
    InvalidHandle { offset: usize },

    /// A capacity string could not be parsed.
    #[error("invalid capacity: {0}")]
    InvalidCapacity(String),

    /// The block list no longer satisfies its layout invariants.
    #[error("pool integrity error: {0}")]
    PoolCorruption(String),

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}
