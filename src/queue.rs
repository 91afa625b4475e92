use crate::pcb::{ChannelId, Pcb};
use std::collections::VecDeque;

/// Ordered container of PCBs. Insertion order is arrival order.
#[derive(Debug, Default)]
pub struct Queue {
    q: VecDeque<Pcb>,
}

impl Queue {
    pub fn new() -> Self {
        Self { q: VecDeque::new() }
    }

    #[inline]
    pub fn push_back(&mut self, pcb: Pcb) {
        self.q.push_back(pcb);
    }

    #[inline]
    pub fn pop_front(&mut self) -> Option<Pcb> {
        self.q.pop_front()
    }

    /// Removes the element at `idx`, keeping the order of the rest.
    pub fn remove(&mut self, idx: usize) -> Option<Pcb> {
        self.q.remove(idx)
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

    /// Position of the smallest key; the earliest element wins ties.
    pub fn position_min_by_key<K: Ord>(&self, mut key: impl FnMut(&Pcb) -> K) -> Option<usize> {
        self.q
            .iter()
            .enumerate()
            .min_by_key(|(_, pcb)| key(pcb))
            .map(|(idx, _)| idx)
    }

    /// Visits every element exactly once, in order, letting `keep` mutate it.
    /// Elements for which `keep` returns false are removed and returned in
    /// the order they were visited.
    pub fn advance_retain(&mut self, mut keep: impl FnMut(&mut Pcb) -> bool) -> Vec<Pcb> {
        let mut removed = Vec::new();
        let mut kept = VecDeque::with_capacity(self.q.len());
        for mut pcb in self.q.drain(..) {
            if keep(&mut pcb) {
                kept.push_back(pcb);
            } else {
                removed.push(pcb);
            }
        }
        self.q = kept;
        removed
    }

    /// Drops every PCB owned by `channel`. Returns how many were dropped.
    pub fn discard_channel(&mut self, channel: ChannelId) -> usize {
        self.advance_retain(|pcb| pcb.channel != channel).len()
    }

    /// Empties the queue, handing back ownership of everything in it.
    pub fn drain(&mut self) -> impl Iterator<Item = Pcb> + '_ {
        self.q.drain(..)
    }
}
