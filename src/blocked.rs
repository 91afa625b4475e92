use crate::pcb::{ChannelId, Pcb};
use crate::queue::Queue;
use tracing::trace;

/// PCBs sitting out an I/O wait. Waits progress one tick at a time no matter
/// which scheduling policy is active.
#[derive(Debug, Default)]
pub struct BlockedSet {
    q: Queue,
}

impl BlockedSet {
    pub fn new() -> Self {
        Self { q: Queue::new() }
    }

    pub fn push(&mut self, pcb: Pcb) {
        self.q.push_back(pcb);
    }

    pub fn len(&self) -> usize {
        self.q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pcb> {
        self.q.iter()
    }

    /// Ages every waiting PCB by one tick and hands back, in insertion
    /// order, the ones whose wait is over.
    pub fn advance(&mut self, tick_ms: u32, now_ms: u32) -> Vec<Pcb> {
        let released = self.q.advance_retain(|pcb| !pcb.advance(tick_ms, now_ms));
        for pcb in &released {
            trace!(pid = pcb.pid, now_ms, "wait done");
        }
        released
    }

    pub fn discard_channel(&mut self, channel: ChannelId) -> usize {
        self.q.discard_channel(channel)
    }

    pub fn drain(&mut self) -> Vec<Pcb> {
        self.q.drain().collect()
    }
}
