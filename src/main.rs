use anyhow::Context;
use clap::Parser;
use ossim::config::{
    DEFAULT_MLFQ_LEVELS, DEFAULT_QUANTUM_MS, DEFAULT_SJF_WARMUP_MS, DEFAULT_SOCKET_PATH,
    DEFAULT_TICK_MS,
};
use ossim::server::{stop_on_ctrl_c, Server};
use ossim::{PolicyKind, SimConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// CPU scheduling simulator serving client processes over a Unix socket
#[derive(Parser, Debug)]
#[command(name = "ossim", long_about = None)]
struct Args {
    /// Scheduling policy for the whole run
    #[arg(value_enum)]
    policy: PolicyKind,

    /// Path of the listening socket
    #[arg(long, default_value = DEFAULT_SOCKET_PATH)]
    socket: PathBuf,

    /// Length of one simulation tick in milliseconds
    #[arg(long, default_value_t = DEFAULT_TICK_MS)]
    tick_ms: u32,

    /// RR and MLFQ time slice in milliseconds
    #[arg(long, default_value_t = DEFAULT_QUANTUM_MS)]
    quantum_ms: u32,

    /// Simulated time SJF waits before its first dispatch
    #[arg(long, default_value_t = DEFAULT_SJF_WARMUP_MS)]
    sjf_warmup_ms: u32,

    /// Number of MLFQ priority levels
    #[arg(long, default_value_t = DEFAULT_MLFQ_LEVELS)]
    mlfq_levels: usize,
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = SimConfig {
        tick_ms: args.tick_ms,
        quantum_ms: args.quantum_ms,
        sjf_warmup_ms: args.sjf_warmup_ms,
        mlfq_levels: args.mlfq_levels,
    };
    config.validate().context("invalid configuration")?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    rt.block_on(async {
        let server = Server::bind(&args.socket, args.policy, config)
            .with_context(|| format!("failed to listen on {}", args.socket.display()))?;
        let _ctrl_c = stop_on_ctrl_c(server.stop_handle());
        let stats = server.run().await;
        println!("\nPer-process summary ({}):\n{}", args.policy, stats.table());
        Ok::<_, anyhow::Error>(())
    })
}
