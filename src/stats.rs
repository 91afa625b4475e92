use crate::pcb::{Pcb, Status};
use crate::scheduler::Tick;
use crate::wire::Pid;
use nohash_hasher::IntMap;
use tabled::{Table, Tabled};

/// Accounting for one client pid across all of its bursts and waits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PidStats {
    pub bursts: u32,
    pub cpu_ms: u64,
    pub waits: u32,
    pub io_ms: u64,
    // completion - arrival, summed over CPU bursts
    pub turnaround_ms: u64,
    // turnaround - requested, summed over CPU bursts
    pub waiting_ms: u64,
}

impl PidStats {
    pub fn mean_turnaround_ms(&self) -> f64 {
        if self.bursts == 0 {
            return 0.0;
        }
        self.turnaround_ms as f64 / self.bursts as f64
    }

    pub fn mean_waiting_ms(&self) -> f64 {
        if self.bursts == 0 {
            return 0.0;
        }
        self.waiting_ms as f64 / self.bursts as f64
    }
}

#[derive(Debug, Default)]
pub struct Stats {
    per_pid: IntMap<Pid, PidStats>,
    pub dispatches: u64,
    pub preemptions: u64,
    pub demotions: u64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe_tick(&mut self, tick: &Tick) {
        self.dispatches += tick.dispatches() as u64;
        self.preemptions += tick.preemptions() as u64;
        self.demotions += tick.demotions() as u64;
    }

    /// Records a finished burst or wait. Call before the PCB is dropped.
    pub fn observe_completion(&mut self, pcb: &Pcb, now_ms: u32) {
        let entry = self.per_pid.entry(pcb.pid()).or_default();
        match pcb.status() {
            Status::Blocked => {
                entry.waits += 1;
                entry.io_ms += pcb.requested_ms() as u64;
            }
            Status::Ready | Status::Running => {
                let turnaround = now_ms.wrapping_sub(pcb.arrival_ms()) as u64;
                entry.bursts += 1;
                entry.cpu_ms += pcb.requested_ms() as u64;
                entry.turnaround_ms += turnaround;
                entry.waiting_ms += turnaround.saturating_sub(pcb.requested_ms() as u64);
            }
        }
    }

    pub fn pid(&self, pid: Pid) -> Option<&PidStats> {
        self.per_pid.get(&pid)
    }

    pub fn completed_bursts(&self) -> u64 {
        self.per_pid.values().map(|s| s.bursts as u64).sum()
    }

    pub fn completed_waits(&self) -> u64 {
        self.per_pid.values().map(|s| s.waits as u64).sum()
    }

    /// Per-pid summary, one row per pid in ascending order.
    pub fn table(&self) -> String {
        #[derive(Tabled)]
        struct Row {
            pid: Pid,
            bursts: u32,
            cpu_ms: u64,
            waits: u32,
            io_ms: u64,
            mean_turnaround_ms: String,
            mean_waiting_ms: String,
        }

        let mut pids: Vec<_> = self.per_pid.keys().copied().collect();
        pids.sort_unstable();
        let rows = pids.into_iter().filter_map(|pid| {
            self.per_pid.get(&pid).map(|s| Row {
                pid,
                bursts: s.bursts,
                cpu_ms: s.cpu_ms,
                waits: s.waits,
                io_ms: s.io_ms,
                mean_turnaround_ms: format!("{:.1}", s.mean_turnaround_ms()),
                mean_waiting_ms: format!("{:.1}", s.mean_waiting_ms()),
            })
        });
        Table::new(rows).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_accounting() {
        let mut stats = Stats::new();
        let mut burst = Pcb::cpu(1, 0, 100, 50);
        burst.status = Status::Running;
        stats.observe_completion(&burst, 250);
        stats.observe_completion(&Pcb::io(1, 0, 200, 0), 190);
        stats.observe_completion(&Pcb::cpu(2, 0, 30, 0), 30);

        let one = stats.pid(1).unwrap();
        assert_eq!((one.bursts, one.cpu_ms, one.waits, one.io_ms), (1, 100, 1, 200));
        assert_eq!((one.turnaround_ms, one.waiting_ms), (200, 100));
        assert_eq!(stats.pid(2).unwrap().waiting_ms, 0);
        assert_eq!(stats.completed_bursts(), 2);
        assert_eq!(stats.completed_waits(), 1);
        assert!(stats.pid(3).is_none());
    }

    #[test]
    fn test_tick_counters_accumulate() {
        let mut stats = Stats::new();
        let mut tick = Tick::new(0, 10);
        tick.dispatches = 1;
        tick.preemptions = 2;
        tick.demotions = 1;
        stats.observe_tick(&tick);
        stats.observe_tick(&tick);
        assert_eq!((stats.dispatches, stats.preemptions, stats.demotions), (2, 4, 2));
    }

    #[test]
    fn test_table_lists_pids_in_order() {
        let mut stats = Stats::new();
        stats.observe_completion(&Pcb::cpu(7, 0, 10, 0), 10);
        stats.observe_completion(&Pcb::cpu(3, 0, 10, 0), 10);
        let table = stats.table();
        let three = table.find("| 3 ").unwrap();
        let seven = table.find("| 7 ").unwrap();
        assert!(three < seven);
        assert!(table.contains("mean_turnaround_ms"));
    }
}
