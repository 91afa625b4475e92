use crate::blocked::BlockedSet;
use crate::channel::Channel;
use crate::config::SimConfig;
use crate::pcb::{ChannelId, Pcb};
use crate::registry::Registry;
use crate::scheduler::{PolicyKind, Scheduler, Tick};
use crate::stats::Stats;
use crate::wire::Message;
use tracing::{debug, info};

/// The whole simulated machine: client channels, the blocked set, the active
/// policy with its ready structure, and the single CPU slot.
///
/// `tick` is the only mutator. Each call runs one fixed-length step:
/// poll channels, age the blocked set, run the policy, advance the clock.
pub struct Simulator<C: Channel> {
    config: SimConfig,
    now_ms: u32,
    registry: Registry<C>,
    blocked: BlockedSet,
    scheduler: Box<dyn Scheduler>,
    cpu: Option<Pcb>,
    stats: Stats,
    last_status_s: u32,
}

impl<C: Channel> Simulator<C> {
    pub fn new(kind: PolicyKind, config: SimConfig) -> Self {
        let scheduler = kind.build(&config);
        Self::with_scheduler(scheduler, config)
    }

    pub fn with_scheduler(scheduler: Box<dyn Scheduler>, config: SimConfig) -> Self {
        Self {
            config,
            now_ms: 0,
            registry: Registry::new(),
            blocked: BlockedSet::new(),
            scheduler,
            cpu: None,
            stats: Stats::new(),
            last_status_s: 0,
        }
    }

    pub fn attach(&mut self, channel: C) -> ChannelId {
        self.registry.attach(channel)
    }

    pub fn now_ms(&self) -> u32 {
        self.now_ms
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn policy(&self) -> &'static str {
        self.scheduler.name()
    }

    pub fn running(&self) -> Option<&Pcb> {
        self.cpu.as_ref()
    }

    pub fn ready_len(&self) -> usize {
        self.scheduler.len()
    }

    pub fn blocked_len(&self) -> usize {
        self.blocked.len()
    }

    pub fn connections(&self) -> usize {
        self.registry.len()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn into_stats(self) -> Stats {
        self.stats
    }

    /// True when no PCB is waiting, blocked or running.
    pub fn is_idle(&self) -> bool {
        self.cpu.is_none() && !self.scheduler.is_runnable() && self.blocked.is_empty()
    }

    pub fn tick(&mut self) {
        let now_ms = self.now_ms;
        let tick_ms = self.config.tick_ms;

        let closed = self
            .registry
            .poll(now_ms, self.scheduler.as_mut(), &mut self.blocked);
        for id in closed {
            self.discard_channel(id);
        }

        for pcb in self.blocked.advance(tick_ms, now_ms) {
            self.complete(pcb, now_ms);
        }

        let mut tick = Tick::new(now_ms, tick_ms);
        self.scheduler.tick(&mut tick, &mut self.cpu);
        self.stats.observe_tick(&tick);
        for pcb in tick.take_completed() {
            self.complete(pcb, now_ms);
        }

        self.report_status();
        self.now_ms = now_ms.wrapping_add(tick_ms);
    }

    /// Drops the listening side of every client and frees every PCB.
    /// Returns how many PCBs were released; calling it again returns 0.
    pub fn shutdown(&mut self) -> usize {
        let mut freed = self.scheduler.drain().len();
        freed += self.blocked.drain().len();
        freed += self.cpu.take().map_or(0, |_| 1);
        let closed = self.registry.close_all();
        if freed > 0 || closed > 0 {
            info!(
                now_ms = self.now_ms,
                freed, closed, "simulator shut down"
            );
        }
        freed
    }

    fn complete(&mut self, pcb: Pcb, now_ms: u32) {
        self.registry.send(pcb.channel(), Message::done(pcb.pid(), now_ms));
        self.stats.observe_completion(&pcb, now_ms);
    }

    fn discard_channel(&mut self, id: ChannelId) {
        let mut dropped = self.scheduler.discard_channel(id) + self.blocked.discard_channel(id);
        if self.cpu.as_ref().is_some_and(|pcb| pcb.channel() == id) {
            self.cpu = None;
            dropped += 1;
        }
        if dropped > 0 {
            debug!(channel = id, dropped, "discarded work of closed channel");
        }
    }

    fn report_status(&mut self) {
        let now_s = self.now_ms / 1000;
        if now_s == self.last_status_s {
            return;
        }
        self.last_status_s = now_s;
        info!(
            time_s = now_s,
            running = ?self.cpu.as_ref().map(|pcb| pcb.pid()),
            ready = self.scheduler.len(),
            blocked = self.blocked.len(),
            clients = self.registry.len(),
            "status"
        );
    }
}
