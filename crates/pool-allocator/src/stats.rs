// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Pool statistics.
//!
//! Two views are provided:
//!
//! - [`PoolStats`] — a point-in-time snapshot computed from the block list
//!   (used bytes, largest free block, free fragment count).
//! - [`AllocationCounters`] — cumulative event counts since the pool was
//!   created (requests, OOMs, splits, frees, peak usage).

use crate::Block;

/// Snapshot of the block list at one moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PoolStats {
    /// Sum of lengths of Used blocks.
    pub total_used: usize,
    /// Length of the largest Free block, 0 if there is none.
    pub largest_free: usize,
    /// Number of Free blocks.
    pub free_fragment_count: usize,
    /// Sum of lengths of Free blocks.
    pub total_free: usize,
    /// Bytes of the buffer not covered by any block (removed on free).
    pub hole_bytes: usize,
    /// Size of the backing buffer.
    pub capacity: usize,
}

impl PoolStats {
    /// Computes a snapshot from an ordered block list.
    pub(crate) fn from_blocks(blocks: &[Block], capacity: usize) -> Self {
        let mut stats = Self {
            capacity,
            ..Self::default()
        };

        for block in blocks {
            if block.is_used() {
                stats.total_used += block.length;
            } else {
                stats.free_fragment_count += 1;
                stats.total_free += block.length;
                stats.largest_free = stats.largest_free.max(block.length);
            }
        }

        let covered = stats.total_used + stats.total_free;
        stats.hole_bytes = capacity.saturating_sub(covered);
        stats
    }

    /// External fragmentation in `[0.0, 1.0]`: `1 - largest_free / total_free`.
    ///
    /// Returns `0.0` when there are no free bytes.
    pub fn fragmentation(&self) -> f64 {
        if self.total_free == 0 {
            return 0.0;
        }
        let largest = self.largest_free.min(self.total_free) as f64;
        (1.0 - largest / self.total_free as f64).clamp(0.0, 1.0)
    }

    /// Fraction of the capacity currently in Used blocks.
    pub fn utilisation(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.total_used as f64 / self.capacity as f64
    }

    /// The three-line report: allocated bytes, largest free block, fragments.
    pub fn summary(&self) -> String {
        format!(
            "Total allocated: {} bytes\nLargest free block: {} bytes\nFree fragments: {}",
            self.total_used, self.largest_free, self.free_fragment_count,
        )
    }
}

/// Cumulative statistics about pool usage since creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AllocationCounters {
    /// Total number of allocation requests, including failed ones.
    pub total_requests: u64,
    /// Number of requests rejected for asking for zero bytes.
    pub zero_sized_requests: u64,
    /// Number of requests that returned a handle.
    pub successful_allocations: u64,
    /// Number of requests that failed for lack of a fitting free block.
    pub oom_count: u64,
    /// Number of allocations that split a larger free block.
    pub splits: u64,
    /// Number of frees that released a used block.
    pub frees: u64,
    /// Number of frees whose handle matched no used block.
    pub ignored_frees: u64,
    /// Number of merges performed by coalescing frees.
    pub merges: u64,
    /// Peak bytes held in Used blocks.
    pub peak_used_bytes: usize,
    /// Total bytes ever handed out.
    pub cumulative_allocated_bytes: u64,
}

impl AllocationCounters {
    pub(crate) fn record_allocation(&mut self, size: usize, split: bool) {
        self.total_requests += 1;
        self.successful_allocations += 1;
        self.cumulative_allocated_bytes += size as u64;
        if split {
            self.splits += 1;
        }
    }

    pub(crate) fn record_zero_sized(&mut self) {
        self.total_requests += 1;
        self.zero_sized_requests += 1;
    }

    pub(crate) fn record_oom(&mut self) {
        self.total_requests += 1;
        self.oom_count += 1;
    }

    pub(crate) fn record_free(&mut self, merges: u64) {
        self.frees += 1;
        self.merges += merges;
    }

    pub(crate) fn record_ignored_free(&mut self) {
        self.ignored_frees += 1;
    }

    pub(crate) fn update_peak(&mut self, used_bytes: usize) {
        if used_bytes > self.peak_used_bytes {
            self.peak_used_bytes = used_bytes;
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Requests: {} ({} ok, {} OOM, {} zero-sized, {} splits), {} frees ({} ignored, {} merges), peak {} bytes",
            self.total_requests,
            self.successful_allocations,
            self.oom_count,
            self.zero_sized_requests,
            self.splits,
            self.frees,
            self.ignored_frees,
            self.merges,
            self.peak_used_bytes,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BlockState;

    fn block(offset: usize, length: usize, state: BlockState) -> Block {
        Block {
            offset,
            length,
            state,
        }
    }

    #[test]
    fn test_empty_list() {
        let s = PoolStats::from_blocks(&[], 100);
        assert_eq!(s.total_used, 0);
        assert_eq!(s.largest_free, 0);
        assert_eq!(s.free_fragment_count, 0);
        assert_eq!(s.hole_bytes, 100);
        assert_eq!(s.fragmentation(), 0.0);
    }

    #[test]
    fn test_mixed_blocks() {
        let blocks = [
            block(0, 20, BlockState::Used),
            block(20, 10, BlockState::Free),
            block(30, 30, BlockState::Used),
            block(60, 40, BlockState::Free),
        ];
        let s = PoolStats::from_blocks(&blocks, 100);
        assert_eq!(s.total_used, 50);
        assert_eq!(s.total_free, 50);
        assert_eq!(s.largest_free, 40);
        assert_eq!(s.free_fragment_count, 2);
        assert_eq!(s.hole_bytes, 0);
        assert!((s.fragmentation() - 0.2).abs() < 1e-9);
        assert!((s.utilisation() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_single_free_block_is_unfragmented() {
        let s = PoolStats::from_blocks(&[block(0, 100, BlockState::Free)], 100);
        assert_eq!(s.fragmentation(), 0.0);
    }

    #[test]
    fn test_summary() {
        let s = PoolStats::from_blocks(&[block(0, 20, BlockState::Used)], 20);
        assert_eq!(
            s.summary(),
            "Total allocated: 20 bytes\nLargest free block: 0 bytes\nFree fragments: 0"
        );
    }

    #[test]
    fn test_counters() {
        let mut c = AllocationCounters::default();
        c.record_allocation(20, true);
        c.record_allocation(30, false);
        c.record_oom();
        c.record_zero_sized();
        c.record_free(1);
        c.record_ignored_free();
        c.update_peak(50);
        c.update_peak(20);

        assert_eq!(c.total_requests, 4);
        assert_eq!(c.zero_sized_requests, 1);
        assert_eq!(c.successful_allocations, 2);
        assert_eq!(c.oom_count, 1);
        assert_eq!(c.splits, 1);
        assert_eq!(c.frees, 1);
        assert_eq!(c.merges, 1);
        assert_eq!(c.ignored_frees, 1);
        assert_eq!(c.peak_used_bytes, 50);
        assert_eq!(c.cumulative_allocated_bytes, 50);
        assert!(c.summary().contains("4 (2 ok, 1 OOM, 1 zero-sized, 1 splits)"));
    }
}
