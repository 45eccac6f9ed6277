//! Desktop notifications and the edge-driven alert dispatcher

use crate::controller::ActionReport;
use crate::error::NotifyError;
use crate::policy::{DecisionState, Edge};
use crate::units::format_size;
use notify_rust::Notification;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub trait Notifier: Send + Sync {
    fn notify(&self, summary: &str, body: &str) -> Result<(), NotifyError>;
}

/// Sends freedesktop / platform notifications through notify-rust.
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, summary: &str, body: &str) -> Result<(), NotifyError> {
        Notification::new()
            .summary(summary)
            .body(body)
            .appname("traffic-governor")
            .show()
            .map_err(|e| NotifyError(e.to_string()))?;
        Ok(())
    }
}

/// Writes alerts to the log only.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, summary: &str, body: &str) -> Result<(), NotifyError> {
        info!("{}: {}", summary, body);
        Ok(())
    }
}

pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _summary: &str, _body: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationMethod {
    Desktop,
    Log,
    None,
}

impl NotificationMethod {
    pub fn notifier(self) -> Box<dyn Notifier> {
        match self {
            NotificationMethod::Desktop => Box::new(DesktopNotifier),
            NotificationMethod::Log => Box::new(LogNotifier),
            NotificationMethod::None => Box::new(NullNotifier),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    Approaching,
    Suspended,
    Resumed,
}

/// Turns edges into alerts. Each kind of alert is sent at most once per
/// cooldown period; delivery errors are logged and dropped.
pub struct NotificationDispatcher {
    notifier: Box<dyn Notifier>,
    cooldown: Duration,
    notify_on_resume: bool,
    last_sent: HashMap<AlertKind, Instant>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Box<dyn Notifier>, cooldown: Duration, notify_on_resume: bool) -> Self {
        Self {
            notifier,
            cooldown,
            notify_on_resume,
            last_sent: HashMap::new(),
        }
    }

    pub fn dispatch(&mut self, edge: &Edge, report: &ActionReport, limit: u64) -> Option<AlertKind> {
        let usage = format_size(edge.usage);
        let limit = format_size(limit);
        let (kind, summary, body) = match edge.to {
            DecisionState::Approaching => (
                AlertKind::Approaching,
                "Approaching traffic limit",
                format!("{} of {} used in the current window", usage, limit),
            ),
            DecisionState::Exceeded => {
                let body = if report.suspended.is_empty() {
                    format!("{} of {} used; no watched processes were running", usage, limit)
                } else {
                    format!("{} of {} used; suspended {}", usage, limit, report.suspended.join(", "))
                };
                (AlertKind::Suspended, "Traffic limit exceeded", body)
            }
            DecisionState::Normal => {
                if !self.notify_on_resume {
                    return None;
                }
                let body = if report.resumed.is_empty() {
                    format!("{} of {} used", usage, limit)
                } else {
                    format!("{} of {} used; resumed {}", usage, limit, report.resumed.join(", "))
                };
                (AlertKind::Resumed, "Traffic back under limit", body)
            }
        };

        if let Some(last) = self.last_sent.get(&kind) {
            let elapsed = edge.timestamp.saturating_duration_since(*last);
            if elapsed < self.cooldown {
                debug!("Suppressing {:?} alert, last one sent {:?} ago", kind, elapsed);
                return None;
            }
        }
        self.last_sent.insert(kind, edge.timestamp);

        if let Err(e) = self.notifier.notify(summary, &body) {
            warn!("{}", e);
        }
        Some(kind)
    }
}
