// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # pool-sim
//!
//! Command-line driver for the first-fit pool allocator simulator.
//!
//! ## Usage
//! ```bash
//! # Reference walkthrough: init 100, alloc 20, alloc 30, free both
//! pool-sim demo
//!
//! # Execute an allocation script against a 4 KB pool
//! pool-sim run --script ops.txt --capacity 4K --json
//!
//! # Take capacity and free policy from a TOML file
//! pool-sim --config pool.toml run --script ops.txt
//! ```

mod commands;

use clap::{Parser, Subcommand};
use pool_allocator::PoolCapacity;

#[derive(Parser)]
#[command(
    name = "pool-sim",
    about = "First-fit pool allocator simulator",
    version,
    author
)]
struct Cli {
    /// Path to a TOML pool configuration file.
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reference walkthrough and print the block list after each step.
    Demo {
        /// Pool capacity (e.g., "100", "4K"). Overrides the config file.
        #[arg(short = 'n', long)]
        capacity: Option<PoolCapacity>,

        /// Free policy: remove, mark-free, coalesce. Overrides the config file.
        #[arg(short, long)]
        policy: Option<String>,
    },

    /// Execute an allocation script against a pool.
    Run {
        /// Script file: one `alloc`, `free`, `display`, `stats`,
        /// `counters` or `verify` command per line.
        #[arg(short, long)]
        script: std::path::PathBuf,

        /// Pool capacity (e.g., "100", "4K"). Overrides the config file.
        #[arg(short = 'n', long)]
        capacity: Option<PoolCapacity>,

        /// Free policy: remove, mark-free, coalesce. Overrides the config file.
        #[arg(short, long)]
        policy: Option<String>,

        /// Print the final pool state as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Demo { capacity, policy } => {
            // The walkthrough falls back to its own capacity only when
            // neither the command line nor a config file names one.
            let capacity = match capacity {
                Some(c) => Some(c),
                None if cli.config.is_none() => {
                    Some(PoolCapacity::from_bytes(commands::demo::DEMO_CAPACITY_BYTES)?)
                }
                None => None,
            };
            let config = commands::resolve_config(cli.config.as_deref(), capacity, policy)?;
            commands::demo::execute(config)
        }
        Commands::Run {
            script,
            capacity,
            policy,
            json,
        } => {
            let config = commands::resolve_config(cli.config.as_deref(), capacity, policy)?;
            commands::run::execute(config, script, json)
        }
    }
}
