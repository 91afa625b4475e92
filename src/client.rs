//! Client side of the protocol, as used by simulated applications.

use crate::wire::{Message, Pid, Request, RECORD_LEN};
use rand::Rng;
use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

/// One scripted request: a CPU burst or an I/O wait of `time_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub request: Request,
    pub time_ms: u32,
}

impl Step {
    pub fn run(time_ms: u32) -> Self {
        Self {
            request: Request::Run,
            time_ms,
        }
    }

    pub fn block(time_ms: u32) -> Self {
        Self {
            request: Request::Block,
            time_ms,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.request {
            Request::Block => write!(f, "block:{}", self.time_ms),
            _ => write!(f, "run:{}", self.time_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStepError(String);

impl fmt::Display for ParseStepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid step '{}', expected run:<ms> or block:<ms>", self.0)
    }
}

impl std::error::Error for ParseStepError {}

impl FromStr for Step {
    type Err = ParseStepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseStepError(s.to_string());
        let (kind, ms) = s.split_once(':').ok_or_else(err)?;
        let time_ms = ms.trim().parse::<u32>().map_err(|_| err())?;
        match kind.trim().to_ascii_lowercase().as_str() {
            "run" => Ok(Step::run(time_ms)),
            "block" => Ok(Step::block(time_ms)),
            _ => Err(err()),
        }
    }
}

/// `n` steps with durations in 10 ms units between 50 and 500 ms; roughly
/// two thirds of them are CPU bursts.
pub fn random_steps(rng: &mut impl Rng, n: usize) -> Vec<Step> {
    (0..n)
        .map(|_| {
            let time_ms = rng.gen_range(5..=50) * 10;
            if rng.gen_bool(0.66) {
                Step::run(time_ms)
            } else {
                Step::block(time_ms)
            }
        })
        .collect()
}

/// Server clock readings for one finished step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exchange {
    pub acked_at_ms: u32,
    pub done_at_ms: u32,
}

pub struct Client {
    stream: UnixStream,
}

impl Client {
    pub async fn connect(path: impl AsRef<Path>) -> io::Result<Self> {
        let stream = UnixStream::connect(path).await?;
        Ok(Self { stream })
    }

    /// Submits `step` for `pid` and waits for both the ACK and the DONE.
    pub async fn execute(&mut self, pid: Pid, step: Step) -> io::Result<Exchange> {
        let msg = Message::new(pid, step.request, step.time_ms);
        self.stream.write_all(&msg.encode()).await?;
        let ack = self.expect(pid, Request::Ack).await?;
        let done = self.expect(pid, Request::Done).await?;
        Ok(Exchange {
            acked_at_ms: ack.time_ms,
            done_at_ms: done.time_ms,
        })
    }

    async fn expect(&mut self, pid: Pid, request: Request) -> io::Result<Message> {
        let mut buf = [0u8; RECORD_LEN];
        self.stream.read_exact(&mut buf).await?;
        let msg =
            Message::decode(&buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if msg.request != request || msg.pid != pid {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "expected {} for pid {}, got {} for pid {}",
                    request, pid, msg.request, msg.pid
                ),
            ));
        }
        Ok(msg)
    }
}
