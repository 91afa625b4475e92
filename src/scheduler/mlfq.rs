use crate::pcb::{ChannelId, Pcb};
use crate::queue::Queue;
use crate::scheduler::{Scheduler, Tick};
use tracing::trace;

/// Multi-level feedback queue.
///
/// `levels[0]` has the highest priority. Fresh bursts always enter level 0;
/// a PCB that uses up a whole quantum drops one level (never below the
/// last one) and goes to the tail of that level. There is no aging: a PCB
/// only climbs back to level 0 by arriving as a new burst.
pub struct Mlfq {
    levels: Vec<Queue>,
    quantum_ms: u32,
}

impl Mlfq {
    pub fn new(num_levels: usize, quantum_ms: u32) -> Self {
        let levels = (0..num_levels.max(1)).map(|_| Queue::new()).collect();
        Self { levels, quantum_ms }
    }

    /// PCBs waiting at `level`, or 0 for a level that does not exist.
    pub fn level_len(&self, level: usize) -> usize {
        self.levels.get(level).map_or(0, |q| q.len())
    }

    fn lowest(&self) -> usize {
        self.levels.len() - 1
    }
}

impl Scheduler for Mlfq {
    fn name(&self) -> &'static str {
        "MLFQ"
    }

    fn push(&mut self, mut pcb: Pcb) {
        pcb.level = 0;
        pcb.elapsed_ms = 0;
        pcb.slice_start_ms = 0;
        self.levels[0].push_back(pcb);
    }

    fn tick(&mut self, tick: &mut Tick, cpu: &mut Option<Pcb>) {
        if tick.run_current(cpu) {
            let expired = cpu
                .as_ref()
                .is_some_and(|pcb| tick.slice_expired(pcb, self.quantum_ms));
            if expired {
                if let Some(mut pcb) = tick.preempt(cpu) {
                    if pcb.level < self.lowest() {
                        pcb.level += 1;
                        tick.demotions += 1;
                        trace!(pid = pcb.pid, level = pcb.level, "demote");
                    }
                    self.levels[pcb.level].push_back(pcb);
                }
            }
        }
        if cpu.is_none() {
            let next = self.levels.iter_mut().find_map(|q| q.pop_front());
            if let Some(pcb) = next {
                let now_ms = tick.now_ms();
                tick.dispatch(cpu, pcb).slice_start_ms = now_ms;
            }
        }
    }

    fn len(&self) -> usize {
        self.levels.iter().map(|q| q.len()).sum()
    }

    fn discard_channel(&mut self, channel: ChannelId) -> usize {
        self.levels
            .iter_mut()
            .map(|q| q.discard_channel(channel))
            .sum()
    }

    fn drain(&mut self) -> Vec<Pcb> {
        self.levels.iter_mut().flat_map(|q| q.drain()).collect()
    }
}
