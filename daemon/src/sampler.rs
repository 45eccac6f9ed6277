//! Network traffic sampler (reads /proc/net/dev on Linux)

mod linux;

pub use linux::{InterfaceBytes, ProcNetDevSource};

use serde::{Deserialize, Serialize};
use std::io;
use std::time::Instant;
use tracing::{debug, warn};

/// One reading of the host's cumulative traffic counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub timestamp: Instant,
    pub cumulative_bytes: u64,
}

impl Sample {
    pub fn new(timestamp: Instant, cumulative_bytes: u64) -> Self {
        Self { timestamp, cumulative_bytes }
    }
}

/// Which direction of traffic counts towards the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
    Sent,
    Received,
    Total,
}

pub trait TrafficSource: Send {
    fn read_total_bytes(&mut self) -> io::Result<Sample>;
}

/// Wraps a traffic source and turns read failures into skipped ticks.
pub struct Sampler<S> {
    source: S,
    failures: u64,
}

impl<S: TrafficSource> Sampler<S> {
    pub fn new(source: S) -> Self {
        Self { source, failures: 0 }
    }

    pub fn sample(&mut self) -> Option<Sample> {
        match self.source.read_total_bytes() {
            Ok(sample) => {
                debug!("Sampled {} cumulative bytes", sample.cumulative_bytes);
                Some(sample)
            }
            Err(e) => {
                self.failures += 1;
                warn!("Failed to read traffic counters, skipping tick: {}", e);
                None
            }
        }
    }

    /// Number of ticks skipped because the source failed.
    pub fn failures(&self) -> u64 {
        self.failures
    }
}
