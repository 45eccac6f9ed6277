//! Threshold policy: maps windowed usage to a decision state

use crate::error::{GovernorError, Result};
use crate::window::UsageReading;
use std::fmt;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecisionState {
    #[default]
    Normal,
    Approaching,
    Exceeded,
}

impl fmt::Display for DecisionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DecisionState::Normal => "normal",
            DecisionState::Approaching => "approaching",
            DecisionState::Exceeded => "exceeded",
        };
        f.write_str(s)
    }
}

/// A transition between two decision states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: DecisionState,
    pub to: DecisionState,
    pub usage: u64,
    pub timestamp: Instant,
}

#[derive(Debug, Clone, Copy)]
pub struct ThresholdPolicy {
    limit: u64,
    approach_threshold: u64,
}

impl ThresholdPolicy {
    pub fn new(limit: u64, approach_ratio: f64) -> Result<Self> {
        if limit == 0 {
            return Err(GovernorError::config("limit must be positive"));
        }
        if !(approach_ratio > 0.0 && approach_ratio < 1.0) {
            return Err(GovernorError::config(format!(
                "approach_ratio must be between 0 and 1 (exclusive), got {}",
                approach_ratio
            )));
        }
        // Usage is whole bytes, so `usage >= limit * ratio` is `usage >= ceil(limit * ratio)`.
        let approach_threshold = (limit as f64 * approach_ratio).ceil() as u64;
        Ok(Self {
            limit,
            approach_threshold,
        })
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn approach_threshold(&self) -> u64 {
        self.approach_threshold
    }

    pub fn evaluate(&self, usage: u64) -> DecisionState {
        if usage >= self.limit {
            DecisionState::Exceeded
        } else if usage >= self.approach_threshold {
            DecisionState::Approaching
        } else {
            DecisionState::Normal
        }
    }

    /// Returns an edge only when the state actually changed.
    pub fn transition(
        &self,
        prev: DecisionState,
        new: DecisionState,
        reading: &UsageReading,
    ) -> Option<Edge> {
        (prev != new).then(|| Edge {
            from: prev,
            to: new,
            usage: reading.bytes,
            timestamp: reading.timestamp,
        })
    }
}
