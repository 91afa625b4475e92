//! Scheduling Policy Comparison Benchmark
//!
//! Run with: cargo bench --bench policy_comparison
//!
//! Replays one deterministic workload through every policy, driving the
//! schedulers directly tick by tick (no sockets, no sleeping), and reports
//! per-class turnaround and waiting time plus the cost of a tick.
//!
//! Setup:
//! - Bimodal bursts: mostly short, some long
//! - Poisson arrivals in simulated time
//!
//! What to look for:
//! - SJF and MLFQ should cut short-job waiting time compared to FIFO
//! - RR and MLFQ pay for it with preemptions

use ossim::{Pcb, PolicyKind, SimConfig, Tick};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};
use tabled::{Table, Tabled};

// ============================================================================
// Configuration
// ============================================================================

const TOTAL_JOBS: usize = 500;
const SHORT_JOB_FRACTION: f64 = 0.8;

const SHORT_JOB_MS: (u32, u32) = (10, 100);
const LONG_JOB_MS: (u32, u32) = (500, 2000);

const MEAN_ARRIVAL_INTERVAL_MS: f64 = 250.0;
const SEED: u64 = 42;

const BENCH_ITERS: usize = 5;

// ============================================================================
// Workload
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum JobType {
    Short,
    Long,
}

#[derive(Debug, Clone, Copy)]
struct Job {
    pid: i32,
    kind: JobType,
    arrival_ms: u32,
    burst_ms: u32,
}

/// Exponential inter-arrival gap, rounded to whole ticks.
fn exponential_gap(rng: &mut impl Rng, mean_ms: f64, tick_ms: u32) -> u32 {
    let u: f64 = rng.gen();
    let gap = -(1.0 - u).ln() * mean_ms;
    (gap / tick_ms as f64).round() as u32 * tick_ms
}

fn generate_jobs(n: usize, tick_ms: u32) -> Vec<Job> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut arrival_ms = 0;
    (0..n)
        .map(|i| {
            arrival_ms += exponential_gap(&mut rng, MEAN_ARRIVAL_INTERVAL_MS, tick_ms);
            let (kind, (lo, hi)) = if rng.gen_bool(SHORT_JOB_FRACTION) {
                (JobType::Short, SHORT_JOB_MS)
            } else {
                (JobType::Long, LONG_JOB_MS)
            };
            Job {
                pid: i as i32,
                kind,
                arrival_ms,
                burst_ms: rng.gen_range(lo..=hi),
            }
        })
        .collect()
}

// ============================================================================
// Simulation
// ============================================================================

#[derive(Debug, Default)]
struct RunResult {
    short_turnaround: Vec<u32>,
    short_wait: Vec<u32>,
    long_turnaround: Vec<u32>,
    long_wait: Vec<u32>,
    dispatches: u64,
    preemptions: u64,
    ticks: u64,
    elapsed: Duration,
}

fn run_policy(kind: PolicyKind, config: &SimConfig, jobs: &[Job]) -> RunResult {
    let mut scheduler = kind.build(config);
    let mut cpu: Option<Pcb> = None;
    let mut result = RunResult::default();
    let mut next = 0;
    let mut finished = 0;
    let mut now_ms = 0;

    let start = Instant::now();
    while finished < jobs.len() {
        while next < jobs.len() && jobs[next].arrival_ms <= now_ms {
            let job = jobs[next];
            scheduler.push(Pcb::cpu(job.pid, 0, job.burst_ms, now_ms));
            next += 1;
        }
        let mut tick = Tick::new(now_ms, config.tick_ms);
        scheduler.tick(&mut tick, &mut cpu);
        result.dispatches += tick.dispatches() as u64;
        result.preemptions += tick.preemptions() as u64;
        for pcb in tick.take_completed() {
            let job = jobs[pcb.pid() as usize];
            let turnaround = now_ms - pcb.arrival_ms();
            let wait = turnaround.saturating_sub(job.burst_ms);
            match job.kind {
                JobType::Short => {
                    result.short_turnaround.push(turnaround);
                    result.short_wait.push(wait);
                }
                JobType::Long => {
                    result.long_turnaround.push(turnaround);
                    result.long_wait.push(wait);
                }
            }
            finished += 1;
        }
        result.ticks += 1;
        now_ms += config.tick_ms;
    }
    result.elapsed = start.elapsed();
    result
}

fn mean(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| *v as f64).sum::<f64>() / values.len() as f64
}

fn percentile(values: &[u32], p: f64) -> u32 {
    if values.is_empty() {
        return 0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let idx = ((p / 100.0) * (sorted.len() - 1) as f64).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let config = SimConfig::default();
    let jobs = generate_jobs(TOTAL_JOBS, config.tick_ms);
    let short_count = jobs.iter().filter(|j| j.kind == JobType::Short).count();

    println!("Policy comparison");
    println!(
        "  Jobs: {} ({} short, {} long)",
        jobs.len(),
        short_count,
        jobs.len() - short_count
    );
    println!("  Mean arrival interval: {}ms", MEAN_ARRIVAL_INTERVAL_MS);
    println!(
        "  Tick: {}ms, quantum: {}ms, MLFQ levels: {}",
        config.tick_ms, config.quantum_ms, config.mlfq_levels
    );
    println!("  Iterations: {}", BENCH_ITERS);
    println!();

    #[derive(Tabled)]
    struct Row {
        policy: String,
        mean_short_turnaround_ms: String,
        p99_short_wait_ms: u32,
        mean_long_turnaround_ms: String,
        p99_long_wait_ms: u32,
        dispatches: u64,
        preemptions: u64,
        ns_per_tick: String,
    }

    let mut rows = Vec::new();
    for kind in PolicyKind::ALL {
        let mut best: Option<RunResult> = None;
        for _ in 0..BENCH_ITERS {
            let result = run_policy(kind, &config, &jobs);
            if best.as_ref().map_or(true, |b| result.elapsed < b.elapsed) {
                best = Some(result);
            }
        }
        let Some(result) = best else { continue };
        rows.push(Row {
            policy: kind.to_string(),
            mean_short_turnaround_ms: format!("{:.1}", mean(&result.short_turnaround)),
            p99_short_wait_ms: percentile(&result.short_wait, 99.0),
            mean_long_turnaround_ms: format!("{:.1}", mean(&result.long_turnaround)),
            p99_long_wait_ms: percentile(&result.long_wait, 99.0),
            dispatches: result.dispatches,
            preemptions: result.preemptions,
            ns_per_tick: format!(
                "{:.1}",
                result.elapsed.as_nanos() as f64 / result.ticks.max(1) as f64
            ),
        });
    }
    println!("{}", Table::new(rows));
}
