use crate::wire::Pid;

/// Opaque handle back to the connection that owns a PCB.
/// Handles are handed out in accept order and never reused.
pub type ChannelId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ready,
    Running,
    Blocked,
}

/// Process control block: one CPU burst or one I/O wait.
///
/// Deliberately not `Clone`: a PCB is moved between the ready structures,
/// the blocked queue and the CPU slot, so it always has exactly one owner.
#[derive(Debug, PartialEq, Eq)]
pub struct Pcb {
    pub(crate) pid: Pid,
    pub(crate) channel: ChannelId,
    pub(crate) requested_ms: u32,
    pub(crate) elapsed_ms: u32,
    pub(crate) status: Status,
    // MLFQ only, 0 is the highest priority
    pub(crate) level: usize,
    // RR and MLFQ only
    pub(crate) slice_start_ms: u32,
    pub(crate) last_update_ms: u32,
    pub(crate) arrival_ms: u32,
}

impl Pcb {
    /// A CPU burst waiting for dispatch.
    pub fn cpu(pid: Pid, channel: ChannelId, requested_ms: u32, now_ms: u32) -> Self {
        Self {
            pid,
            channel,
            requested_ms,
            elapsed_ms: 0,
            status: Status::Ready,
            level: 0,
            slice_start_ms: 0,
            last_update_ms: now_ms,
            arrival_ms: now_ms,
        }
    }

    /// An I/O wait that starts counting immediately.
    pub fn io(pid: Pid, channel: ChannelId, requested_ms: u32, now_ms: u32) -> Self {
        Self {
            status: Status::Blocked,
            ..Self::cpu(pid, channel, requested_ms, now_ms)
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }
    pub fn channel(&self) -> ChannelId {
        self.channel
    }
    pub fn requested_ms(&self) -> u32 {
        self.requested_ms
    }
    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }
    pub fn status(&self) -> Status {
        self.status
    }
    pub fn level(&self) -> usize {
        self.level
    }
    pub fn slice_start_ms(&self) -> u32 {
        self.slice_start_ms
    }
    pub fn arrival_ms(&self) -> u32 {
        self.arrival_ms
    }
    pub fn last_update_ms(&self) -> u32 {
        self.last_update_ms
    }

    /// Credits one tick of service. Returns true once the request is satisfied.
    #[inline]
    pub fn advance(&mut self, tick_ms: u32, now_ms: u32) -> bool {
        self.elapsed_ms = self.elapsed_ms.saturating_add(tick_ms);
        self.last_update_ms = now_ms;
        self.is_done()
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.elapsed_ms >= self.requested_ms
    }
}
