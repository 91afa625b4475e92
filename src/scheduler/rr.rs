use crate::pcb::{ChannelId, Pcb};
use crate::queue::Queue;
use crate::scheduler::{Scheduler, Tick};

/// Preemptive round robin with a fixed quantum.
///
/// When the quantum expires and nobody else is ready, the running PCB keeps
/// the CPU and starts a new slice instead of preempting itself.
pub struct RoundRobin {
    ready: Queue,
    quantum_ms: u32,
}

impl RoundRobin {
    pub fn new(quantum_ms: u32) -> Self {
        Self {
            ready: Queue::new(),
            quantum_ms,
        }
    }
}

impl Scheduler for RoundRobin {
    fn name(&self) -> &'static str {
        "RR"
    }

    fn push(&mut self, pcb: Pcb) {
        self.ready.push_back(pcb);
    }

    fn tick(&mut self, tick: &mut Tick, cpu: &mut Option<Pcb>) {
        if tick.run_current(cpu) {
            let expired = cpu
                .as_ref()
                .is_some_and(|pcb| tick.slice_expired(pcb, self.quantum_ms));
            if expired {
                if self.ready.is_empty() {
                    if let Some(pcb) = cpu.as_mut() {
                        pcb.slice_start_ms = tick.now_ms();
                    }
                } else if let Some(pcb) = tick.preempt(cpu) {
                    self.ready.push_back(pcb);
                }
            }
        }
        if cpu.is_none() {
            if let Some(pcb) = self.ready.pop_front() {
                let now_ms = tick.now_ms();
                tick.dispatch(cpu, pcb).slice_start_ms = now_ms;
            }
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
