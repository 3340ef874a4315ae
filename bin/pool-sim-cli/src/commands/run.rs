// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `pool-sim run` command: execute an allocation script.
//!
//! # Script Format
//! ```text
//! # comments and blank lines are skipped
//! alloc 20 as a      # named handle
//! alloc 30           # unnamed; free it by offset
//! display
//! free a
//! free 20
//! stats
//! counters
//! verify
//! ```
//!
//! A failed `alloc` is reported and the script continues, mirroring how a
//! caller of the allocator would observe `OutOfMemory`.

use super::{print_blocks, print_stats};
use anyhow::{bail, Context};
use pool_allocator::{AllocationCounters, Block, Handle, Pool, PoolConfig, PoolStats};
use std::collections::HashMap;
use std::path::PathBuf;

/// One script instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Alloc { size: usize, name: Option<String> },
    Free(Target),
    Display,
    Stats,
    Counters,
    Verify,
}

/// What a `free` line refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Offset(usize),
    Name(String),
}

/// Final pool state emitted with `--json`.
#[derive(Debug, serde::Serialize)]
struct Snapshot<'a> {
    capacity: usize,
    blocks: &'a [Block],
    stats: PoolStats,
    counters: &'a AllocationCounters,
}

pub fn execute(config: PoolConfig, script: PathBuf, json: bool) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(&script)
        .with_context(|| format!("cannot read script '{}'", script.display()))?;
    let ops = parse_script(&source)
        .with_context(|| format!("invalid script '{}'", script.display()))?;

    let mut pool = config
        .build()
        .with_context(|| format!("failed to initialise pool of '{}'", config.capacity))?;
    tracing::info!("running {} operations from '{}'", ops.len(), script.display());

    let mut names: HashMap<String, Handle> = HashMap::new();
    for op in &ops {
        apply(&mut pool, &mut names, op, !json)?;
    }

    if json {
        let snapshot = Snapshot {
            capacity: pool.capacity(),
            blocks: pool.display(),
            stats: pool.stats(),
            counters: pool.counters(),
        };
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    pool.cleanup();
    Ok(())
}

/// Parses a whole script, reporting the first bad line.
pub fn parse_script(source: &str) -> anyhow::Result<Vec<Op>> {
    let mut ops = Vec::new();
    for (i, raw) in source.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let op = parse_line(line).with_context(|| format!("line {}: '{line}'", i + 1))?;
        ops.push(op);
    }
    Ok(ops)
}

fn parse_line(line: &str) -> anyhow::Result<Op> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let op = match words.as_slice() {
        ["alloc", size] => Op::Alloc {
            size: parse_size(size)?,
            name: None,
        },
        ["alloc", size, "as", name] => Op::Alloc {
            size: parse_size(size)?,
            name: Some((*name).to_string()),
        },
        ["free", target] => match target.parse::<usize>() {
            Ok(offset) => Op::Free(Target::Offset(offset)),
            Err(_) => Op::Free(Target::Name((*target).to_string())),
        },
        ["display"] => Op::Display,
        ["stats"] => Op::Stats,
        ["counters"] => Op::Counters,
        ["verify"] => Op::Verify,
        _ => bail!("expected alloc <n> [as <name>], free <offset|name>, display, stats, counters or verify"),
    };
    Ok(op)
}

fn parse_size(word: &str) -> anyhow::Result<usize> {
    word.parse()
        .with_context(|| format!("'{word}' is not a byte count"))
}

fn apply(
    pool: &mut Pool,
    names: &mut HashMap<String, Handle>,
    op: &Op,
    echo: bool,
) -> anyhow::Result<()> {
    match op {
        Op::Alloc { size, name } => match pool.alloc(*size) {
            Ok(h) => {
                if let Some(name) = name {
                    names.insert(name.clone(), h);
                }
                if echo {
                    println!("alloc {size} -> {h}");
                }
            }
            Err(e) if echo => println!("alloc {size} -> failed: {e}"),
            Err(_) => {}
        },
        Op::Free(target) => {
            let handle = match target {
                Target::Offset(offset) => Handle::from_offset(*offset),
                Target::Name(name) => *names
                    .get(name)
                    .with_context(|| format!("unknown handle name '{name}'"))?,
            };
            pool.free(handle)?;
            if echo {
                println!("free {handle}");
            }
        }
        Op::Display if echo => print_blocks(pool),
        Op::Stats if echo => print_stats(pool),
        Op::Counters if echo => println!("{}", pool.counters().summary()),
        Op::Display | Op::Stats | Op::Counters => {}
        Op::Verify => {
            pool.verify()?;
            if echo {
                println!("verify: ok");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pool_allocator::{AllocError, FreePolicy, PoolOptions};

    #[test]
    fn test_parse_script() {
        let ops = parse_script(
            "# header\n\
             alloc 20 as a\n\
             alloc 30   # trailing comment\n\
             \n\
             free a\n\
             free 20\n\
             display\nstats\ncounters\nverify\n",
        )
        .unwrap();
        assert_eq!(
            ops,
            vec![
                Op::Alloc {
                    size: 20,
                    name: Some("a".into())
                },
                Op::Alloc {
                    size: 30,
                    name: None
                },
                Op::Free(Target::Name("a".into())),
                Op::Free(Target::Offset(20)),
                Op::Display,
                Op::Stats,
                Op::Counters,
                Op::Verify,
            ]
        );
    }

    #[test]
    fn test_parse_errors_name_the_line() {
        let err = parse_script("alloc 10\nallocate 5\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
        assert!(parse_script("alloc ten").is_err());
        assert!(parse_script("free").is_err());
    }

    #[test]
    fn test_apply_walkthrough() {
        let mut pool = Pool::init(100).unwrap();
        let mut names = HashMap::new();
        let ops = parse_script("alloc 20 as p1\nalloc 30 as p2\nfree p1\nfree p2\nverify").unwrap();
        for op in &ops {
            apply(&mut pool, &mut names, op, false).unwrap();
        }
        let blocks = pool.display();
        assert_eq!(blocks.len(), 1);
        assert_eq!((blocks[0].offset, blocks[0].length), (50, 50));
    }

    #[test]
    fn test_apply_failed_alloc_continues() {
        let mut pool = Pool::init(10).unwrap();
        let mut names = HashMap::new();
        apply(&mut pool, &mut names, &Op::Alloc { size: 11, name: None }, false).unwrap();
        assert_eq!(pool.counters().oom_count, 1);
    }

    #[test]
    fn test_apply_unknown_name() {
        let mut pool = Pool::init(10).unwrap();
        let mut names = HashMap::new();
        let op = Op::Free(Target::Name("ghost".into()));
        assert!(apply(&mut pool, &mut names, &op, false).is_err());
    }

    #[test]
    fn test_apply_strict_double_free() {
        let options = PoolOptions {
            free_policy: FreePolicy::Remove,
            strict_free: true,
        };
        let mut pool = Pool::init_with(10, options).unwrap();
        let mut names = HashMap::new();
        apply(&mut pool, &mut names, &Op::Alloc { size: 4, name: None }, false).unwrap();
        apply(&mut pool, &mut names, &Op::Free(Target::Offset(0)), false).unwrap();
        let err = apply(&mut pool, &mut names, &Op::Free(Target::Offset(0)), false).unwrap_err();
        assert_eq!(
            err.downcast_ref::<AllocError>(),
            Some(&AllocError::InvalidHandle { offset: 0 })
        );
    }
}
