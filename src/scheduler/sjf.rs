use crate::pcb::{ChannelId, Pcb};
use crate::queue::Queue;
use crate::scheduler::{Scheduler, Tick};

/// Non-preemptive shortest job first.
///
/// Picks the ready PCB with the smallest requested burst; ties go to the one
/// that arrived first. The very first dispatch of a run is held back until
/// the clock reaches `warmup_ms`, so that jobs submitted together at startup
/// are all visible to the comparison.
pub struct Sjf {
    ready: Queue,
    warmup_ms: u32,
    first_dispatch_done: bool,
}

impl Sjf {
    pub fn new(warmup_ms: u32) -> Self {
        Self {
            ready: Queue::new(),
            warmup_ms,
            first_dispatch_done: false,
        }
    }
}

impl Scheduler for Sjf {
    fn name(&self) -> &'static str {
        "SJF"
    }

    fn push(&mut self, pcb: Pcb) {
        self.ready.push_back(pcb);
    }

    fn tick(&mut self, tick: &mut Tick, cpu: &mut Option<Pcb>) {
        if tick.run_current(cpu) {
            return;
        }
        if !self.first_dispatch_done && tick.now_ms() < self.warmup_ms {
            return;
        }
        let shortest = self.ready.position_min_by_key(|pcb| pcb.requested_ms);
        if let Some(pcb) = shortest.and_then(|idx| self.ready.remove(idx)) {
            tick.dispatch(cpu, pcb);
            self.first_dispatch_done = true;
        }
    }

    fn len(&self) -> usize {
        self.ready.len()
    }

    fn discard_channel(&mut self, channel: ChannelId) -> usize {
        self.ready.discard_channel(channel)
    }

    fn drain(&mut self) -> Vec<Pcb> {
        self.ready.drain().collect()
    }
}
