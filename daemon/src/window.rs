//! Rolling-window traffic accounting

use crate::error::{GovernorError, Result};
use crate::sampler::Sample;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Bytes transferred inside the window, as of `timestamp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageReading {
    pub timestamp: Instant,
    pub bytes: u64,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    sample: Sample,
    // Bytes between the previous sample and this one; 0 after a counter reset.
    delta: u64,
}

/// Keeps the samples of the trailing window and derives usage from them.
///
/// Usage is the sum of the gaps between consecutive samples still in the
/// window. With a monotonic counter that equals newest minus oldest; a
/// counter that goes backwards contributes nothing for that one gap and
/// accounting continues from the new value.
pub struct RollingWindow {
    duration: Duration,
    entries: VecDeque<Entry>,
}

impl RollingWindow {
    pub fn new(duration: Duration) -> Result<Self> {
        if duration.is_zero() {
            return Err(GovernorError::config("window duration must be positive"));
        }
        Ok(Self {
            duration,
            entries: VecDeque::new(),
        })
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn ingest(&mut self, sample: Sample) -> UsageReading {
        let delta = match self.entries.back() {
            Some(last) if sample.timestamp < last.sample.timestamp => {
                warn!("Dropping sample older than the newest one in the window");
                return self.current(last.sample.timestamp);
            }
            Some(last) if sample.cumulative_bytes < last.sample.cumulative_bytes => {
                warn!(
                    "Traffic counter went backwards ({} -> {}), treating gap as zero",
                    last.sample.cumulative_bytes, sample.cumulative_bytes
                );
                0
            }
            Some(last) => sample.cumulative_bytes - last.sample.cumulative_bytes,
            None => 0,
        };
        self.entries.push_back(Entry { sample, delta });
        self.evict(sample.timestamp);
        self.current(sample.timestamp)
    }

    fn evict(&mut self, latest: Instant) {
        let before = self.entries.len();
        while self.entries.len() > 1 {
            let oldest = self.entries[0].sample.timestamp;
            if latest.saturating_duration_since(oldest) <= self.duration {
                break;
            }
            self.entries.pop_front();
        }
        let evicted = before - self.entries.len();
        if evicted > 0 {
            debug!("Evicted {} samples from the window", evicted);
        }
    }

    fn current(&self, timestamp: Instant) -> UsageReading {
        // The oldest entry's delta belongs to a gap before the window starts.
        let bytes = self
            .entries
            .iter()
            .skip(1)
            .map(|e| e.delta)
            .fold(0u64, u64::saturating_add);
        UsageReading { timestamp, bytes }
    }

    /// Usage as of the newest sample, if any sample has been ingested.
    pub fn reading(&self) -> Option<UsageReading> {
        self.entries
            .back()
            .map(|last| self.current(last.sample.timestamp))
    }

    pub fn samples(&self) -> impl Iterator<Item = &Sample> + '_ {
        self.entries.iter().map(|e| &e.sample)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
