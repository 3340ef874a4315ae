// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Property tests: block list invariants under arbitrary alloc/free sequences.

use pool_allocator::{AllocError, FreePolicy, Handle, Pool, PoolOptions};
use proptest::prelude::*;
use proptest::sample::Index;

// ── Operations ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Alloc(usize),
    /// Frees one of the live handles, picked by index.
    Free(Index),
}

fn op_strategy(max_size: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => (1..=max_size).prop_map(Op::Alloc),
        1 => any::<Index>().prop_map(Op::Free),
    ]
}

fn policy_strategy() -> impl Strategy<Value = FreePolicy> {
    prop_oneof![
        Just(FreePolicy::Remove),
        Just(FreePolicy::MarkFree),
        Just(FreePolicy::Coalesce),
    ]
}

fn pool_with(capacity: usize, free_policy: FreePolicy) -> Pool {
    let options = PoolOptions {
        free_policy,
        strict_free: false,
    };
    Pool::init_with(capacity, options).unwrap()
}

fn covered_bytes(pool: &Pool) -> usize {
    pool.display().iter().map(|b| b.length).sum()
}

// ── Properties ─────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Allocation alone never breaks the partition: blocks always sum to
    /// the capacity, and a failed request leaves the list untouched.
    #[test]
    fn alloc_sequence_keeps_partition(
        capacity in 1usize..2048,
        sizes in proptest::collection::vec(1usize..96, 1..80),
    ) {
        let mut pool = Pool::init(capacity).unwrap();

        for size in sizes {
            let before = pool.display().to_vec();
            match pool.alloc(size) {
                Ok(_) => {}
                Err(AllocError::OutOfMemory { .. }) => {
                    prop_assert_eq!(pool.display(), before.as_slice());
                }
                Err(e) => prop_assert!(false, "unexpected error: {}", e),
            }
            prop_assert_eq!(covered_bytes(&pool), capacity);
            prop_assert!(pool.verify().is_ok(), "{:?}", pool.verify());
        }
    }

    /// Mixed alloc/free sequences keep the layout valid under every policy,
    /// and used + free + holes always accounts for the whole buffer.
    #[test]
    fn churn_keeps_invariants(
        policy in policy_strategy(),
        ops in proptest::collection::vec(op_strategy(64), 1..300),
    ) {
        let capacity = 4096;
        let mut pool = pool_with(capacity, policy);
        let mut live: Vec<Handle> = Vec::new();

        for op in ops {
            match op {
                Op::Alloc(size) => {
                    if let Ok(h) = pool.alloc(size) {
                        live.push(h);
                    }
                }
                Op::Free(idx) if !live.is_empty() => {
                    let h = live.swap_remove(idx.index(live.len()));
                    prop_assert!(pool.free(h).is_ok());
                }
                Op::Free(_) => {}
            }
            prop_assert!(pool.verify().is_ok(), "{:?}", pool.verify());

            let stats = pool.stats();
            prop_assert_eq!(stats.total_used, pool.used_bytes());
            prop_assert_eq!(stats.total_used + stats.total_free + stats.hole_bytes, capacity);
            if policy.preserves_coverage() {
                prop_assert_eq!(stats.hole_bytes, 0);
            }
        }
    }

    /// Freeing every live allocation, in any order, under coalescing
    /// restores one free block spanning the whole pool.
    #[test]
    fn coalesce_recovers_full_capacity(
        sizes in proptest::collection::vec(1usize..48, 1..64),
        order in proptest::collection::vec(any::<Index>(), 1..16),
    ) {
        let capacity = 512;
        let mut pool = pool_with(capacity, FreePolicy::Coalesce);
        let mut live: Vec<Handle> = sizes
            .into_iter()
            .filter_map(|size| pool.alloc(size).ok())
            .collect();

        let mut step = 0;
        while !live.is_empty() {
            let idx = &order[step % order.len()];
            let h = live.swap_remove(idx.index(live.len()));
            prop_assert!(pool.free(h).is_ok());
            step += 1;
        }

        prop_assert_eq!(pool.display().len(), 1);
        prop_assert_eq!(pool.stats().largest_free, capacity);
        prop_assert!(pool.alloc(capacity).is_ok());
    }
}
