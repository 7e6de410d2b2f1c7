//! zonecache - look up time zones through the shared location cache

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zonecache::{CacheConfig, LocationCache, Resolver, TzdbResolver};

#[derive(Parser)]
#[command(name = "zonecache")]
#[command(about = "Cached IANA time-zone lookups")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Cache configuration as a JSON document
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve one or more time-zone names
    Lookup {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// List every known time-zone name
    List,
    /// Compare cached and uncached lookups, then load the cache from many threads
    Bench {
        /// Number of iterations per scenario
        #[arg(long, default_value = "1000")]
        iterations: usize,

        /// Threads used for the concurrent run
        #[arg(long, default_value = "8")]
        threads: usize,

        /// Passes over every known name per thread
        #[arg(long, default_value = "10")]
        rounds: usize,
    },
}

#[derive(Serialize)]
struct LookupOutput<'a> {
    name: &'a str,
    offset_seconds: i32,
    abbreviation: String,
    dst: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(tracing_subscriber::EnvFilter::new(&cli.log_level))
        .init();

    if let Some(raw) = &cli.config {
        let config = CacheConfig::from_json(raw)?;
        zonecache::initialize_default_cache_with_config(config)?;
    }

    match cli.command {
        Command::Lookup { names } => lookup(&names),
        Command::List => {
            for name in TzdbResolver::available_names() {
                println!("{name}");
            }
            Ok(())
        }
        Command::Bench {
            iterations,
            threads,
            rounds,
        } => bench(iterations, threads, rounds),
    }
}

fn lookup(names: &[String]) -> Result<()> {
    let now = Utc::now();
    let mut failed = 0;

    for name in names {
        match zonecache::load_location(name) {
            Ok(location) => {
                let output = LookupOutput {
                    name: location.name(),
                    offset_seconds: location.offset_at(now).local_minus_utc(),
                    abbreviation: location.abbreviation_at(now),
                    dst: location.is_dst_at(now),
                };
                println!("{}", serde_json::to_string(&output)?);
            }
            Err(e) => {
                error!("Lookup failed for {:?}: {}", name, e);
                println!("error: {e}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn bench(iterations: usize, threads: usize, rounds: usize) -> Result<()> {
    println!("zonecache benchmark v{}", zonecache::VERSION);

    for lookups in [10, 100, 1000] {
        let raw = time_lookups(iterations, lookups, || TzdbResolver);
        let cached = time_lookups(iterations, lookups, || LocationCache::new(TzdbResolver));
        println!(
            "{lookups:>5} repeated lookups: raw {:>10.2?}/iter, cached {:>10.2?}/iter",
            raw, cached
        );
    }

    let cache = LocationCache::new(TzdbResolver);
    let names: Vec<&str> = TzdbResolver::available_names().collect();
    info!(
        "Loading {} names x {} rounds from {} threads",
        names.len(),
        rounds,
        threads
    );

    let started = Instant::now();
    std::thread::scope(|scope| {
        for _ in 0..threads {
            scope.spawn(|| {
                for _ in 0..rounds {
                    for name in &names {
                        if let Err(e) = cache.load_location(name) {
                            error!("Concurrent lookup failed for {:?}: {}", name, e);
                        }
                    }
                }
            });
        }
    });

    println!("concurrent run finished in {:.2?}", started.elapsed());
    println!("{}", serde_json::to_string_pretty(&cache.stats())?);
    Ok(())
}

/// Average time of `lookups` repeated "Europe/Kyiv" lookups against a fresh resolver
fn time_lookups<S, F>(iterations: usize, lookups: usize, make: F) -> Duration
where
    S: LookupTarget,
    F: Fn() -> S,
{
    let mut total = Duration::ZERO;

    for _ in 0..iterations {
        let target = make();
        let started = Instant::now();
        for _ in 0..lookups {
            if target.lookup("Europe/Kyiv").is_err() {
                error!("Europe/Kyiv failed to resolve");
            }
        }
        total += started.elapsed();
    }

    average(total, iterations)
}

fn average(total: Duration, iterations: usize) -> Duration {
    total.div_f64(iterations.max(1) as f64)
}

trait LookupTarget {
    fn lookup(&self, name: &str) -> Result<(), zonecache::ResolveError>;
}

impl LookupTarget for TzdbResolver {
    fn lookup(&self, name: &str) -> Result<(), zonecache::ResolveError> {
        self.resolve(name).map(drop)
    }
}

impl LookupTarget for LocationCache<TzdbResolver> {
    fn lookup(&self, name: &str) -> Result<(), zonecache::ResolveError> {
        self.load_location(name).map(drop)
    }
}
