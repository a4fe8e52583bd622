//! `ringcached`, the ringcache demo daemon.
//!
//! Runs a cache orchestrator over in-memory nodes and drives it through
//! membership changes.
//!
//! # Usage
//!
//! ```text
//! ringcached demo                      # replay the client walk-through
//! ringcached -c ringcache.toml demo    # with a config file
//! ringcached bench -n 10000 -s 256     # measure key movement on churn
//! ```

mod config;
mod telemetry;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail, ensure};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use ringcache_engine::{CacheOrchestrator, NodeEventHandler, RemoteCache, SweepReport};
use ringcache_store::CategoryFactory;
use ringcache_types::Node;
use tracing::info;

use config::CliConfig;

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "ringcached",
    version,
    about = "Consistent-hashing distributed cache demo daemon"
)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true, env = "RINGCACHE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay the reference client scenario against in-memory nodes.
    Demo,

    /// Write keys, then join and shut down nodes and report key movement.
    Bench {
        /// Number of keys to write.
        #[arg(short = 'n', long, default_value = "1000")]
        count: usize,

        /// Size of each value in bytes.
        #[arg(short, long, default_value = "64")]
        size: usize,
    },
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;

    telemetry::init(&config.log.level);

    match cli.command {
        Commands::Demo => cmd_demo(&config).await,
        Commands::Bench { count, size } => cmd_bench(&config, count, size).await,
    }
}

fn build_cache(config: &CliConfig) -> Result<CacheOrchestrator> {
    info!(
        replicas = config.ring.replicas,
        hash = ?config.ring.hash,
        "building orchestrator"
    );
    CacheOrchestrator::from_config(&config.ring, Arc::new(CategoryFactory::in_memory()))
        .context("invalid ring configuration")
}

// -----------------------------------------------------------------------
// ringcached demo
// -----------------------------------------------------------------------

async fn cmd_demo(config: &CliConfig) -> Result<()> {
    let nodes = config.nodes();
    let [node1, node2, node3, ..] = nodes.as_slice() else {
        bail!("the demo needs at least 3 nodes, {} configured", nodes.len());
    };
    let cache = build_cache(config)?;

    println!("ringcache demo");
    println!("  replicas: {}", config.ring.replicas);
    println!("  hash:     {:?}", config.ring.hash);
    println!();

    expect_value(&cache, "A", None).await?;
    cache.put("A", Bytes::from_static(b"AValue")).await?;
    expect_value(&cache, "A", None).await?;

    step("join", node1);
    cache.join(node1.clone()).await;
    cache.put("A", Bytes::from_static(b"AValue")).await?;
    expect_value(&cache, "A", Some("AValue")).await?;
    cache.invalidate("A").await?;
    expect_value(&cache, "A", None).await?;

    step("join", node2);
    cache.join(node2.clone()).await;
    step("join", node3);
    cache.join(node3.clone()).await;

    let entries = [("B", "BValue"), ("C", "CValue"), ("D", "DValue"), ("E", "EValue")];
    for (key, value) in entries {
        cache.put(key, Bytes::from(value)).await?;
    }
    for (key, value) in entries {
        expect_value(&cache, key, Some(value)).await?;
    }

    step("shutdown", node2);
    cache.shutdown(node2.clone()).await;
    for (key, value) in entries {
        expect_value(&cache, key, Some(value)).await?;
    }

    step("shutdown", node3);
    cache.shutdown(node3.clone()).await;
    for (key, value) in entries {
        expect_value(&cache, key, Some(value)).await?;
    }

    step("leave", node1);
    cache.leave(node1.clone()).await;
    for (key, _) in entries {
        expect_value(&cache, key, None).await?;
    }

    println!();
    println!("demo complete");
    Ok(())
}

fn step(action: &str, node: &Node) {
    println!("{action} {} ({}, category {})", node.id, node.address(), node.category);
}

/// Read `key`, print it, and fail if it is not `expected`.
async fn expect_value(cache: &CacheOrchestrator, key: &str, expected: Option<&str>) -> Result<()> {
    let got = cache.get(key).await?;
    let shown = got.as_ref().map(|v| String::from_utf8_lossy(v).into_owned());
    println!("  get({key}) = {shown:?}");
    ensure!(
        shown.as_deref() == expected,
        "get({key}) returned {shown:?}, expected {expected:?}"
    );
    Ok(())
}

// -----------------------------------------------------------------------
// ringcached bench
// -----------------------------------------------------------------------

async fn cmd_bench(config: &CliConfig, count: usize, size: usize) -> Result<()> {
    let nodes = config.nodes();
    let Some((first, rest)) = nodes.split_first() else {
        bail!("no nodes configured");
    };
    let cache = build_cache(config)?;

    println!("ringcache bench");
    println!("  keys:     {count}");
    println!("  size:     {size} bytes each");
    println!("  nodes:    {}", nodes.len());
    println!("  replicas: {}", config.ring.replicas);
    println!();

    cache
        .try_join(first.clone())
        .await
        .with_context(|| format!("failed to join {}", first.address()))?;

    let value = Bytes::from(generate_bench_data(size));
    let start = Instant::now();
    for i in 0..count {
        cache.put(&format!("key-{i}"), value.clone()).await?;
    }
    println!(
        "Wrote {count} keys in {:.3}s",
        start.elapsed().as_secs_f64()
    );

    for node in rest {
        let start = Instant::now();
        let report = cache
            .try_join(node.clone())
            .await
            .with_context(|| format!("failed to join {}", node.address()))?;
        print_report("join", node, &report, start, count);
    }

    for node in rest.iter().rev() {
        let start = Instant::now();
        let report = cache.drain_node(node).await;
        print_report("shutdown", node, &report, start, count);
    }

    let mut missing = 0;
    for i in 0..count {
        if cache.get(&format!("key-{i}")).await?.is_none() {
            missing += 1;
        }
    }

    println!();
    println!("Summary:");
    println!("  Keys readable: {}/{count}", count - missing);
    ensure!(missing == 0, "{missing} keys lost during churn");
    Ok(())
}

fn print_report(action: &str, node: &Node, report: &SweepReport, start: Instant, count: usize) {
    let share = if count == 0 {
        0.0
    } else {
        report.moved as f64 * 100.0 / count as f64
    };
    println!(
        "{action:<8} {:<21} moved {:>7} keys ({share:>5.1}%), failed {}, {:.3}s",
        node.address(),
        report.moved,
        report.failed,
        start.elapsed().as_secs_f64()
    );
}

/// Deterministic value payload.
fn generate_bench_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}
