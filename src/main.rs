use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber;

use turnstile::config::TurnstileConfig;
use turnstile::ratelimit::{PermitRequest, RateLimiter, Window};
use turnstile::store::{RedisStore, SlotStore};

/// Demonstration driver: hammers one slot pool and logs every admission.
#[derive(Debug, Parser)]
#[command(name = "turnstile", version, about = "Distributed slot-based rate limiter demo")]
struct Args {
    /// Path to a YAML configuration file
    #[arg(long, short)]
    config: Option<String>,

    /// Store connection URL (overrides configuration)
    #[arg(long)]
    store_url: Option<String>,

    /// Operations allowed per window (overrides configuration)
    #[arg(long)]
    limit_ops: Option<u32>,

    /// Window length in seconds (overrides configuration)
    #[arg(long)]
    limit_period: Option<u64>,

    /// How long to run, in seconds
    #[arg(long, default_value_t = 60)]
    run_for: u64,

    /// What to do when every slot is occupied
    #[arg(long, value_enum, default_value = "wait")]
    mode: Mode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Block until a slot frees, up to the wait horizon
    Wait,
    /// Deny immediately and count the skipped requests
    Drop,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let args = Args::parse();

    info!("Starting Turnstile admission demo");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => TurnstileConfig::from_file(path)?,
        None => TurnstileConfig::default(),
    };
    if let Some(url) = args.store_url {
        config.store.url = url;
    }
    if let Some(ops) = args.limit_ops {
        config.limiter.limit_ops = ops;
    }
    if let Some(period) = args.limit_period {
        config.limiter.limit_period_secs = period;
    }
    info!(store_url = %config.store.url, "Configuration loaded");

    let window = Window::new(
        config.limiter.limit_ops,
        Duration::from_secs(config.limiter.limit_period_secs),
    )?;

    let store = Arc::new(RedisStore::connect(&config.store).await?);

    // Start from an empty pool so the demo's counts are predictable.
    store.flush().await?;
    info!("Slot store flushed");

    let limiter = RateLimiter::new(store, config.store.key_prefix.clone());
    let request = match args.mode {
        Mode::Wait => PermitRequest::waiting(window),
        Mode::Drop => PermitRequest::immediate(window),
    };

    info!(
        ops = window.ops(),
        period_secs = config.limiter.limit_period_secs,
        mode = ?args.mode,
        run_for_secs = args.run_for,
        "Rate limiter initialized"
    );

    let deadline = Instant::now() + Duration::from_secs(args.run_for);
    let mut admitted = 0u64;
    let mut skipped = 0u64;

    while Instant::now() < deadline {
        if limiter.acquire(&request).await?.is_admitted() {
            if skipped > 0 {
                info!(skipped, "Requests skipped while saturated");
                skipped = 0;
            }
            admitted += 1;
            info!(admitted, "Operation admitted");
        } else {
            skipped += 1;
        }
    }

    info!(admitted, "Turnstile admission demo finished");
    Ok(())
}
