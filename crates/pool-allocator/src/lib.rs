// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # pool-allocator
//!
//! A user-space simulator of a first-fit dynamic memory allocator. It
//! manages one fixed-size backing buffer and services allocation and free
//! requests against an address-ordered block list.
//!
//! # Key Components
//!
//! - [`Pool`] — the allocator: first-fit search, split on allocation,
//!   policy-driven release, introspection.
//! - [`Block`] / [`Handle`] — region descriptors and the offsets handed to
//!   callers.
//! - [`FreePolicy`] — whether `free` leaves a hole (legacy), re-tags the
//!   block, or coalesces it with its neighbours.
//! - [`PoolStats`] / [`AllocationCounters`] — snapshot and cumulative
//!   statistics.
//! - [`PoolCapacity`] / [`PoolConfig`] — capacity parsing (`"4K"`) and
//!   TOML configuration.
//!
//! # Block List
//!
//! ```text
//! init(100)   [ Free 0..100                          ]
//! alloc(20)   [ Used 0..20 | Free 20..100            ]
//! alloc(30)   [ Used 0..20 | Used 20..50 | Free 50..100 ]
//! free(@0)    [    hole    | Used 20..50 | Free 50..100 ]
//! free(@20)   [    hole    |    hole     | Free 50..100 ]
//! ```
//!
//! # Example
//! ```
//! use pool_allocator::{FreePolicy, Pool, PoolOptions};
//!
//! let options = PoolOptions { free_policy: FreePolicy::Coalesce, strict_free: true };
//! let mut pool = Pool::init_with(100, options).unwrap();
//!
//! let a = pool.alloc(20).unwrap();
//! pool.bytes_mut(a).unwrap().fill(0xAB);
//! pool.free(a).unwrap();
//!
//! // Coalescing restores a single free block, and a second free is an error.
//! assert_eq!(pool.display().len(), 1);
//! assert!(pool.free(a).is_err());
//! ```

mod block;
mod capacity;
mod config;
mod error;
mod policy;
pub mod pool;
mod stats;

pub use block::{Block, BlockState, Handle};
pub use capacity::PoolCapacity;
pub use config::PoolConfig;
pub use error::AllocError;
pub use policy::FreePolicy;
pub use pool::{Pool, PoolOptions};
pub use stats::{AllocationCounters, PoolStats};
