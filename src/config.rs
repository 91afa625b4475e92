use std::fmt;

pub const DEFAULT_SOCKET_PATH: &str = "/tmp/ossim.sock";
pub const DEFAULT_TICK_MS: u32 = 10;
pub const DEFAULT_QUANTUM_MS: u32 = 500;
pub const DEFAULT_SJF_WARMUP_MS: u32 = 200;
pub const DEFAULT_MLFQ_LEVELS: usize = 3;

/// Tunables of one simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Length of one tick, both simulated and wall-clock.
    pub tick_ms: u32,
    /// Slice length for RR and MLFQ.
    pub quantum_ms: u32,
    /// SJF holds its first dispatch until the clock reaches this value.
    pub sjf_warmup_ms: u32,
    pub mlfq_levels: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            quantum_ms: DEFAULT_QUANTUM_MS,
            sjf_warmup_ms: DEFAULT_SJF_WARMUP_MS,
            mlfq_levels: DEFAULT_MLFQ_LEVELS,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }
        if self.quantum_ms == 0 {
            return Err(ConfigError::ZeroQuantum);
        }
        if self.mlfq_levels == 0 {
            return Err(ConfigError::NoLevels);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroTick,
    ZeroQuantum,
    NoLevels,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroTick => write!(f, "tick length must be at least 1 ms"),
            ConfigError::ZeroQuantum => write!(f, "quantum must be at least 1 ms"),
            ConfigError::NoLevels => write!(f, "MLFQ needs at least one level"),
        }
    }
}

impl std::error::Error for ConfigError {}
