// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! First-fit pool allocator over a fixed backing buffer.
//!
//! The [`Pool`] owns one contiguous `Vec<u8>` and an address-ordered list
//! of [`Block`] descriptors. It:
//!
//! 1. Services `alloc` by scanning the list for the first Free block that
//!    is large enough, splitting off the remainder when it is larger than
//!    requested.
//! 2. Services `free` according to its [`FreePolicy`]: the legacy policy
//!    drops the block from the list and leaves a hole.
//! 3. Tracks cumulative [`AllocationCounters`] for diagnostics.
//!
//! # Ownership
//! All mutation goes through `&mut self`; the pool is not shared and holds
//! no locks. [`Pool::cleanup`] consumes the pool, so the borrow checker
//! rejects any use after it.

use crate::{
    AllocError, AllocationCounters, Block, BlockState, FreePolicy, Handle, PoolCapacity,
    PoolStats,
};
use std::collections::TryReserveError;

/// Behavior knobs fixed at pool creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PoolOptions {
    /// What `free` does with a released block.
    pub free_policy: FreePolicy,
    /// Report unknown handles and double frees as [`AllocError::InvalidHandle`]
    /// instead of ignoring them.
    pub strict_free: bool,
}

/// A fixed-capacity memory pool with a first-fit block list.
///
/// # Example
/// ```
/// use pool_allocator::{BlockState, Pool};
///
/// let mut pool = Pool::init(100).unwrap();
/// let a = pool.alloc(20).unwrap();
/// let b = pool.alloc(30).unwrap();
/// assert_eq!(pool.stats().total_used, 50);
///
/// pool.free(a).unwrap();
/// pool.free(b).unwrap();
///
/// // Legacy free removes blocks; only the split-off remainder is left.
/// let blocks = pool.display();
/// assert_eq!(blocks.len(), 1);
/// assert_eq!((blocks[0].offset, blocks[0].length), (50, 50));
/// assert_eq!(blocks[0].state, BlockState::Free);
/// ```
pub struct Pool {
    buffer: Vec<u8>,
    blocks: Vec<Block>,
    options: PoolOptions,
    used_bytes: usize,
    counters: AllocationCounters,
}

impl Pool {
    /// Creates a pool of `capacity` bytes with default options.
    pub fn init(capacity: usize) -> Result<Self, AllocError> {
        Self::init_with(capacity, PoolOptions::default())
    }

    /// Creates a pool from an already-validated capacity.
    pub fn with_capacity(capacity: PoolCapacity, options: PoolOptions) -> Result<Self, AllocError> {
        Self::init_with(capacity.as_bytes(), options)
    }

    /// Creates a pool of `capacity` bytes.
    ///
    /// The backing buffer and the block list are reserved fallibly; if
    /// either reservation fails the call returns `OutOfMemory` and anything
    /// already reserved is dropped.
    pub fn init_with(capacity: usize, options: PoolOptions) -> Result<Self, AllocError> {
        if capacity == 0 {
            return Err(AllocError::ZeroCapacity);
        }

        let reserve_failed = |_: TryReserveError| AllocError::OutOfMemory {
            requested_bytes: capacity,
            largest_free_bytes: 0,
            capacity_bytes: capacity,
        };

        let mut buffer = Vec::new();
        buffer.try_reserve_exact(capacity).map_err(reserve_failed)?;
        buffer.resize(capacity, 0);

        let mut blocks = Vec::new();
        blocks.try_reserve(1).map_err(reserve_failed)?;
        blocks.push(Block::free(0, capacity));

        tracing::info!(
            "pool created: {capacity} bytes, free policy '{}', strict free {}",
            options.free_policy,
            options.strict_free,
        );

        Ok(Self {
            buffer,
            blocks,
            options,
            used_bytes: 0,
            counters: AllocationCounters::default(),
        })
    }

    /// Allocates `requested` bytes using first-fit.
    ///
    /// Returns `Err(ZeroSizedAllocation)` for a zero-byte request and
    /// `Err(OutOfMemory)` when no Free block is large enough. In both cases
    /// the block list is left unchanged.
    pub fn alloc(&mut self, requested: usize) -> Result<Handle, AllocError> {
        if requested == 0 {
            self.counters.record_zero_sized();
            tracing::debug!("zero-sized allocation rejected");
            return Err(AllocError::ZeroSizedAllocation);
        }

        let Some(index) = self.find_first_fit(requested) else {
            return Err(self.out_of_memory(requested));
        };

        let split = self.blocks[index].length > requested;
        if split {
            // The remainder descriptor needs one more slot in the list.
            if self.blocks.try_reserve(1).is_err() {
                return Err(self.out_of_memory(requested));
            }
            let block = &mut self.blocks[index];
            let remainder = Block::free(block.offset + requested, block.length - requested);
            block.length = requested;
            self.blocks.insert(index + 1, remainder);
        }

        let block = &mut self.blocks[index];
        block.state = BlockState::Used;
        let handle = Handle::from_offset(block.offset);

        self.used_bytes += requested;
        self.counters.record_allocation(requested, split);
        self.counters.update_peak(self.used_bytes);

        tracing::debug!(
            offset = handle.offset(),
            length = requested,
            split,
            "allocated block"
        );
        Ok(handle)
    }

    /// Releases the allocation named by `handle`.
    ///
    /// A handle that matches no Used block (double free, foreign or stale
    /// handle) is ignored unless the pool was created with `strict_free`,
    /// in which case `Err(InvalidHandle)` is returned. The block list is
    /// unchanged either way.
    pub fn free(&mut self, handle: Handle) -> Result<(), AllocError> {
        let offset = handle.offset();
        let Some(index) = self
            .blocks
            .iter()
            .position(|b| b.is_used() && b.offset == offset)
        else {
            self.counters.record_ignored_free();
            if self.options.strict_free {
                tracing::warn!(offset, "free rejected: no used block at offset");
                return Err(AllocError::InvalidHandle { offset });
            }
            tracing::debug!(offset, "free ignored: no used block at offset");
            return Ok(());
        };

        let length = self.blocks[index].length;
        self.used_bytes -= length;

        let merges = match self.options.free_policy {
            FreePolicy::Remove => {
                self.blocks.remove(index);
                0
            }
            FreePolicy::MarkFree => {
                self.blocks[index].state = BlockState::Free;
                0
            }
            FreePolicy::Coalesce => {
                self.blocks[index].state = BlockState::Free;
                self.coalesce_at(index)
            }
        };
        self.counters.record_free(merges);

        tracing::debug!(
            offset,
            length,
            policy = %self.options.free_policy,
            merges,
            "freed block"
        );
        Ok(())
    }

    /// Returns every block currently in the list, in ascending offset order.
    pub fn display(&self) -> &[Block] {
        &self.blocks
    }

    /// Computes a statistics snapshot from the current block list.
    pub fn stats(&self) -> PoolStats {
        PoolStats::from_blocks(&self.blocks, self.capacity())
    }

    /// Releases the block list and the backing buffer.
    ///
    /// Consumes the pool; the final counters are returned for reporting.
    pub fn cleanup(self) -> AllocationCounters {
        tracing::info!(
            "pool released: {} bytes, {} blocks, {}",
            self.buffer.len(),
            self.blocks.len(),
            self.counters.summary(),
        );
        self.counters
    }

    /// Returns the bytes of a live allocation.
    pub fn bytes(&self, handle: Handle) -> Option<&[u8]> {
        let range = self.used_block(handle)?.range();
        self.buffer.get(range)
    }

    /// Returns the bytes of a live allocation for writing.
    pub fn bytes_mut(&mut self, handle: Handle) -> Option<&mut [u8]> {
        let range = self.used_block(handle)?.range();
        self.buffer.get_mut(range)
    }

    /// Size of the backing buffer in bytes.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes currently held in Used blocks.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn options(&self) -> PoolOptions {
        self.options
    }

    /// Cumulative counters since the pool was created.
    pub fn counters(&self) -> &AllocationCounters {
        &self.counters
    }

    /// Checks the block list against its layout invariants.
    ///
    /// Blocks must be non-empty, in ascending offset order, non-overlapping
    /// and inside the buffer. Under a coverage-preserving [`FreePolicy`]
    /// they must also cover the buffer without gaps.
    pub fn verify(&self) -> Result<(), AllocError> {
        let capacity = self.capacity();
        let gap_free = self.options.free_policy.preserves_coverage();
        let mut cursor = 0usize;
        let mut used = 0usize;

        for (i, block) in self.blocks.iter().enumerate() {
            if block.length == 0 {
                return Err(corruption(format!("block {i} at offset {} is empty", block.offset)));
            }
            if block.offset < cursor {
                return Err(corruption(format!(
                    "block {i} at offset {} overlaps or precedes offset {cursor}",
                    block.offset
                )));
            }
            if gap_free && block.offset != cursor {
                return Err(corruption(format!(
                    "gap of {} bytes before block {i} at offset {}",
                    block.offset - cursor,
                    block.offset
                )));
            }
            let end = block
                .offset
                .checked_add(block.length)
                .filter(|&end| end <= capacity)
                .ok_or_else(|| {
                    corruption(format!("block {i} at offset {} exceeds capacity {capacity}", block.offset))
                })?;
            if block.is_used() {
                used += block.length;
            }
            cursor = end;
        }

        if gap_free && cursor != capacity {
            return Err(corruption(format!(
                "blocks end at offset {cursor}, capacity is {capacity}"
            )));
        }
        if used != self.used_bytes {
            return Err(corruption(format!(
                "used blocks sum to {used} bytes, accounting says {}",
                self.used_bytes
            )));
        }
        Ok(())
    }

    fn find_first_fit(&self, requested: usize) -> Option<usize> {
        self.blocks
            .iter()
            .position(|b| b.is_free() && b.length >= requested)
    }

    fn used_block(&self, handle: Handle) -> Option<&Block> {
        self.blocks
            .iter()
            .find(|b| b.is_used() && b.offset == handle.offset())
    }

    fn largest_free(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| b.is_free())
            .map(|b| b.length)
            .max()
            .unwrap_or(0)
    }

    fn out_of_memory(&mut self, requested: usize) -> AllocError {
        self.counters.record_oom();
        let largest_free_bytes = self.largest_free();
        tracing::warn!(
            "allocation of {requested} bytes failed: largest free block is {largest_free_bytes} bytes"
        );
        AllocError::OutOfMemory {
            requested_bytes: requested,
            largest_free_bytes,
            capacity_bytes: self.capacity(),
        }
    }

    /// Merges the Free block at `index` with Free neighbours that touch it.
    /// Returns the number of merges.
    fn coalesce_at(&mut self, index: usize) -> u64 {
        let mut merges = 0;

        if let Some(next) = self.blocks.get(index + 1).copied() {
            if next.is_free() && self.blocks[index].end() == next.offset {
                self.blocks[index].length += next.length;
                self.blocks.remove(index + 1);
                merges += 1;
            }
        }

        if index > 0 {
            let current = self.blocks[index];
            let prev = &mut self.blocks[index - 1];
            if prev.is_free() && prev.end() == current.offset {
                prev.length += current.length;
                self.blocks.remove(index);
                merges += 1;
            }
        }

        merges
    }
}

fn corruption(detail: String) -> AllocError {
    AllocError::PoolCorruption(detail)
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("capacity", &self.capacity())
            .field("used_bytes", &self.used_bytes)
            .field("blocks", &self.blocks.len())
            .field("free_policy", &self.options.free_policy)
            .finish()
    }
}
