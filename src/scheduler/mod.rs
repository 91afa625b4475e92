mod fifo;
mod mlfq;
mod rr;
mod sjf;
pub use fifo::Fifo;
pub use mlfq::Mlfq;
pub use rr::RoundRobin;
pub use sjf::Sjf;

use crate::config::SimConfig;
use crate::pcb::{ChannelId, Pcb, Status};
use std::fmt;
use tracing::trace;

/// Scheduling policy: owns the ready structure and decides, once per tick,
/// which PCB occupies the single CPU slot.
pub trait Scheduler {
    fn name(&self) -> &'static str;

    /// Admits a freshly requested CPU burst.
    fn push(&mut self, pcb: Pcb);

    /// Advances one tick: ages the running PCB, completes or preempts it,
    /// and fills an empty slot from the ready structure.
    fn tick(&mut self, tick: &mut Tick, cpu: &mut Option<Pcb>);

    /// Number of PCBs waiting for the CPU.
    fn len(&self) -> usize;

    fn is_runnable(&self) -> bool {
        self.len() > 0
    }

    /// Drops every waiting PCB owned by `channel`.
    fn discard_channel(&mut self, channel: ChannelId) -> usize;

    /// Hands back every waiting PCB, leaving the ready structure empty.
    fn drain(&mut self) -> Vec<Pcb>;
}

/// Which policy drives the CPU slot. Fixed for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PolicyKind {
    #[value(name = "FIFO")]
    Fifo,
    #[value(name = "SJF")]
    Sjf,
    #[value(name = "RR")]
    Rr,
    #[value(name = "MLFQ")]
    Mlfq,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 4] = [
        PolicyKind::Fifo,
        PolicyKind::Sjf,
        PolicyKind::Rr,
        PolicyKind::Mlfq,
    ];

    pub fn build(self, config: &SimConfig) -> Box<dyn Scheduler> {
        match self {
            PolicyKind::Fifo => Box::new(Fifo::new()),
            PolicyKind::Sjf => Box::new(Sjf::new(config.sjf_warmup_ms)),
            PolicyKind::Rr => Box::new(RoundRobin::new(config.quantum_ms)),
            PolicyKind::Mlfq => Box::new(Mlfq::new(config.mlfq_levels, config.quantum_ms)),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Fifo => write!(f, "FIFO"),
            PolicyKind::Sjf => write!(f, "SJF"),
            PolicyKind::Rr => write!(f, "RR"),
            PolicyKind::Mlfq => write!(f, "MLFQ"),
        }
    }
}

/// Per-tick context handed to a [`Scheduler`]. Collects the PCBs that
/// finished during the tick so the caller can notify their clients.
#[derive(Debug)]
pub struct Tick {
    now_ms: u32,
    len_ms: u32,
    completed: Vec<Pcb>,
    pub(crate) dispatches: u32,
    pub(crate) preemptions: u32,
    pub(crate) demotions: u32,
}

impl Tick {
    pub fn new(now_ms: u32, len_ms: u32) -> Self {
        Self {
            now_ms,
            len_ms,
            completed: Vec::new(),
            dispatches: 0,
            preemptions: 0,
            demotions: 0,
        }
    }

    pub fn now_ms(&self) -> u32 {
        self.now_ms
    }

    pub fn completed(&self) -> &[Pcb] {
        &self.completed
    }

    pub fn take_completed(&mut self) -> Vec<Pcb> {
        std::mem::take(&mut self.completed)
    }

    pub fn dispatches(&self) -> u32 {
        self.dispatches
    }

    pub fn preemptions(&self) -> u32 {
        self.preemptions
    }

    pub fn demotions(&self) -> u32 {
        self.demotions
    }

    /// Credits the running PCB with one tick. A PCB that reaches its request
    /// leaves the slot for the completed list.
    /// Returns true if the slot is still occupied afterwards.
    pub(crate) fn run_current(&mut self, cpu: &mut Option<Pcb>) -> bool {
        let finished = match cpu.as_mut() {
            Some(pcb) => pcb.advance(self.len_ms, self.now_ms),
            None => return false,
        };
        if finished {
            if let Some(pcb) = cpu.take() {
                trace!(pid = pcb.pid, now_ms = self.now_ms, "burst done");
                self.completed.push(pcb);
            }
            return false;
        }
        true
    }

    /// Installs `pcb` on the CPU. The slot must be empty.
    pub(crate) fn dispatch<'a>(&mut self, cpu: &'a mut Option<Pcb>, mut pcb: Pcb) -> &'a mut Pcb {
        debug_assert!(cpu.is_none(), "CPU slot already occupied");
        trace!(pid = pcb.pid, level = pcb.level, now_ms = self.now_ms, "dispatch");
        pcb.status = Status::Running;
        self.dispatches += 1;
        cpu.insert(pcb)
    }

    /// Takes the running PCB off the CPU and marks it ready again.
    pub(crate) fn preempt(&mut self, cpu: &mut Option<Pcb>) -> Option<Pcb> {
        let mut pcb = cpu.take()?;
        trace!(pid = pcb.pid, now_ms = self.now_ms, "preempt");
        pcb.status = Status::Ready;
        self.preemptions += 1;
        Some(pcb)
    }

    /// True once the running PCB has held the CPU for a whole quantum.
    pub(crate) fn slice_expired(&self, pcb: &Pcb, quantum_ms: u32) -> bool {
        self.now_ms.wrapping_sub(pcb.slice_start_ms) >= quantum_ms
    }
}
