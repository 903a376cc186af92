use serde::{Deserialize, Serialize};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Raw counters from one stats read: current and previous CPU totals, memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSample {
    pub cpu_total: u64,
    pub precpu_total: u64,
    pub system_cpu: u64,
    pub presystem_cpu: u64,
    pub memory_usage: u64,
    pub memory_limit: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerStats {
    pub cpu_percent: f64,
    pub memory_usage_mb: f64,
    pub memory_percent: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Derive usage percentages from a raw sample, rounded to two decimals.
///
/// CPU is the container's share of the system CPU delta between the two
/// readings; a non-positive system delta yields 0. A non-positive memory
/// limit yields a memory percentage of 0.
pub fn compute_stats(sample: &StatsSample) -> ContainerStats {
    let cpu_delta = sample.cpu_total as f64 - sample.precpu_total as f64;
    let system_delta = sample.system_cpu as f64 - sample.presystem_cpu as f64;
    let cpu_percent = if system_delta > 0.0 {
        cpu_delta / system_delta * 100.0
    } else {
        0.0
    };

    let usage = sample.memory_usage as f64;
    let limit = sample.memory_limit as f64;
    let memory_percent = if limit > 0.0 { usage / limit * 100.0 } else { 0.0 };

    ContainerStats {
        cpu_percent: round2(cpu_percent),
        memory_usage_mb: round2(usage / BYTES_PER_MB),
        memory_percent: round2(memory_percent),
    }
}
