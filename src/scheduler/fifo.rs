use crate::pcb::{ChannelId, Pcb};
use crate::queue::Queue;
use crate::scheduler::{Scheduler, Tick};

/// Non-preemptive first-come first-served. A dispatched PCB keeps the CPU
/// until its burst completes.
pub struct Fifo {
    ready: Queue,
}

impl Fifo {
    pub fn new() -> Self {
        Self {
            ready: Queue::new(),
        }
    }
}

impl Default for Fifo {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for Fifo {
    fn name(&self) -> &'static str {
        "FIFO"
    }

    fn push(&mut self, pcb: Pcb) {
        self.ready.push_back(pcb);
    }

    fn tick(&mut self, tick: &mut Tick, cpu: &mut Option<Pcb>) {
        if tick.run_current(cpu) {
            return;
        }
        if let Some(pcb) = self.ready.pop_front() {
            tick.dispatch(cpu, pcb);
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
