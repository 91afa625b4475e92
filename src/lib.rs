mod blocked;
mod channel;
mod pcb;
mod queue;
mod registry;
mod scheduler;
mod sim;
mod stats;

pub mod client;
pub mod config;
pub mod server;
pub mod wire;

pub use blocked::BlockedSet;
pub use channel::{write_record, Channel};
pub use config::{ConfigError, SimConfig};
pub use pcb::{ChannelId, Pcb, Status};
pub use queue::Queue;
pub use registry::Registry;
pub use scheduler::{Fifo, Mlfq, PolicyKind, RoundRobin, Scheduler, Sjf, Tick};
pub use server::Server;
pub use sim::Simulator;
pub use stats::{PidStats, Stats};
pub use wire::{Message, Pid, Request, WireError};
