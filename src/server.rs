//! Unix socket front end driving a [`Simulator`] in real time.

use crate::config::SimConfig;
use crate::scheduler::PolicyKind;
use crate::sim::Simulator;
use crate::stats::Stats;
use futures::FutureExt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{UnixListener, UnixStream};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct Server {
    listener: UnixListener,
    path: PathBuf,
    sim: Simulator<UnixStream>,
    stop: Arc<AtomicBool>,
}

impl Server {
    /// Binds the listening socket, replacing a stale socket file if present.
    /// Must be called from within a tokio runtime.
    pub fn bind(path: impl AsRef<Path>, kind: PolicyKind, config: SimConfig) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        match std::fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "removed stale socket"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        let listener = UnixListener::bind(&path)?;
        Ok(Self {
            listener,
            path,
            sim: Simulator::new(kind, config),
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Setting the returned flag stops the loop at the top of the next tick.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Runs ticks until stopped, then shuts down and returns the run's stats.
    /// Real time and simulated time advance together, one tick per iteration.
    pub async fn run(mut self) -> Stats {
        let tick = Duration::from_millis(self.sim.config().tick_ms as u64);
        info!(
            socket = %self.path.display(),
            policy = self.sim.policy(),
            tick_ms = self.sim.config().tick_ms,
            "scheduler server listening"
        );
        while !self.stop.load(Ordering::Acquire) {
            self.accept_pending();
            self.sim.tick();
            tokio::time::sleep(tick).await;
        }
        self.shutdown()
    }

    fn accept_pending(&mut self) {
        // accept() only registers interest when pending, so polling it once
        // per tick never blocks the loop
        while let Some(accepted) = self.listener.accept().now_or_never() {
            match accepted {
                Ok((stream, _)) => {
                    self.sim.attach(stream);
                }
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    break;
                }
            }
        }
    }

    fn shutdown(self) -> Stats {
        let Server {
            listener,
            path,
            mut sim,
            ..
        } = self;
        drop(listener);
        if let Err(e) = std::fs::remove_file(&path) {
            warn!(path = %path.display(), error = %e, "failed to remove socket");
        }
        sim.shutdown();
        let stats = sim.into_stats();
        info!(
            bursts = stats.completed_bursts(),
            waits = stats.completed_waits(),
            dispatches = stats.dispatches,
            preemptions = stats.preemptions,
            demotions = stats.demotions,
            "final statistics"
        );
        stats
    }
}

/// Sets `stop` on the first Ctrl-C.
pub fn stop_on_ctrl_c(stop: Arc<AtomicBool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for ctrl-c");
            return;
        }
        info!("interrupt received, stopping after the current tick");
        stop.store(true, Ordering::Release);
    })
}
