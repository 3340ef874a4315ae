// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `pool-sim demo` command: the reference allocate/free walkthrough.

use super::{print_blocks, print_stats};
use anyhow::Context;
use pool_allocator::PoolConfig;

/// Capacity in bytes used by the walkthrough when none is given.
pub const DEMO_CAPACITY_BYTES: usize = 100;

pub fn execute(config: PoolConfig) -> anyhow::Result<()> {
    let mut pool = config
        .build()
        .with_context(|| format!("failed to initialise pool of '{}'", config.capacity))?;

    println!("Initial pool state ({} bytes, free policy '{}'):", pool.capacity(), config.free_policy);
    print_blocks(&pool);

    let first = match pool.alloc(20) {
        Ok(h) => {
            println!("\nAllocated block of 20 bytes at {h}.");
            print_blocks(&pool);
            Some(h)
        }
        Err(e) => {
            println!("\nFailed to allocate block of 20 bytes: {e}");
            None
        }
    };

    let second = match pool.alloc(30) {
        Ok(h) => {
            println!("\nAllocated block of 30 bytes at {h}.");
            print_blocks(&pool);
            Some(h)
        }
        Err(e) => {
            println!("\nFailed to allocate block of 30 bytes: {e}");
            None
        }
    };

    for (handle, size) in [(first, 20), (second, 30)] {
        if let Some(h) = handle {
            pool.free(h)?;
            println!("\nFreed block of {size} bytes at {h}.");
            print_blocks(&pool);
        }
    }

    println!();
    print_stats(&pool);

    let counters = pool.cleanup();
    println!("\n{}", counters.summary());
    Ok(())
}
