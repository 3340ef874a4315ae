// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared output helpers.

pub mod demo;
pub mod run;

use anyhow::Context;
use pool_allocator::{Block, FreePolicy, Pool, PoolCapacity, PoolConfig};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level follows the `-v` count.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Merges the optional config file with command-line overrides.
///
/// A capacity must come from one of the two; there is no default pool size.
pub fn resolve_config(
    path: Option<&Path>,
    capacity: Option<PoolCapacity>,
    policy: Option<String>,
) -> anyhow::Result<PoolConfig> {
    let mut config = match path {
        Some(path) => Some(PoolConfig::from_file(path)?),
        None => None,
    };

    if let Some(capacity) = capacity.map(|c| c.as_bytes().to_string()) {
        match config.as_mut() {
            Some(c) => c.capacity = capacity,
            None => config = Some(PoolConfig::new(capacity)),
        }
    }

    let mut config = config
        .context("no pool capacity given: pass --capacity or a --config file")?;

    if let Some(name) = policy {
        config.free_policy = FreePolicy::from_name(&name).with_context(|| {
            format!("unknown free policy '{name}'; expected 'remove', 'mark-free', or 'coalesce'")
        })?;
    }

    tracing::debug!(?config, "resolved pool configuration");
    Ok(config)
}

/// Formats one block as `Start: <offset>, Size: <n>`.
pub fn format_block(block: &Block) -> String {
    format!("Start: {}, Size: {}", block.offset, block.length)
}

pub fn print_blocks(pool: &Pool) {
    for block in pool.display() {
        println!("{}", format_block(block));
    }
}

pub fn print_stats(pool: &Pool) {
    let stats = pool.stats();
    println!("{}", stats.summary());
    println!(
        "Utilisation: {:.1}%  Fragmentation: {:.1}%  Holes: {} bytes",
        stats.utilisation() * 100.0,
        stats.fragmentation() * 100.0,
        stats.hole_bytes,
    );
}
