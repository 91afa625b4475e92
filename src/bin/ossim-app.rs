//! Simulated application: replays CPU bursts and I/O waits against a
//! running `ossim` server.

use anyhow::Context;
use clap::Parser;
use ossim::client::{random_steps, Client, Step};
use ossim::config::DEFAULT_SOCKET_PATH;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ossim-app", about = "Submit CPU bursts and I/O waits to ossim", long_about = None)]
struct Args {
    /// Process id reported to the server
    #[arg(long)]
    pid: i32,

    /// Path of the server socket
    #[arg(long, default_value = DEFAULT_SOCKET_PATH)]
    socket: PathBuf,

    /// Generate this many random steps instead of using STEPS
    #[arg(long, conflicts_with = "steps")]
    random: Option<usize>,

    /// Seed for --random
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Steps such as run:300 or block:200, executed in order
    steps: Vec<Step>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let steps = match args.random {
        Some(n) => random_steps(&mut StdRng::seed_from_u64(args.seed), n),
        None => args.steps,
    };
    anyhow::ensure!(!steps.is_empty(), "nothing to do, pass steps or --random N");

    let mut client = Client::connect(&args.socket)
        .await
        .with_context(|| format!("failed to connect to {}", args.socket.display()))?;

    let start = Instant::now();
    for step in steps {
        let exchange = client
            .execute(args.pid, step)
            .await
            .with_context(|| format!("step {} failed", step))?;
        info!(
            pid = args.pid,
            %step,
            acked_at_ms = exchange.acked_at_ms,
            done_at_ms = exchange.done_at_ms,
            latency_ms = exchange.done_at_ms.saturating_sub(exchange.acked_at_ms),
            "step done"
        );
    }
    info!(pid = args.pid, wall_ms = start.elapsed().as_millis() as u64, "all steps done");
    Ok(())
}
