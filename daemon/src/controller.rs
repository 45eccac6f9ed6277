//! Suspends and resumes watched processes on decision-state edges

use crate::collector::{ProcessCollector, ProcessHandle};
use crate::error::ActionError;
use crate::executor::ProcessExecutor;
use crate::policy::{DecisionState, Edge};
use tracing::{debug, error, info, warn};

/// A configured process name and the instances of it this governor stopped.
#[derive(Debug, Clone)]
pub struct WatchedProcess {
    name: String,
    suspended: Vec<ProcessHandle>,
}

impl WatchedProcess {
    fn new(name: String) -> Self {
        Self {
            name,
            suspended: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn suspended_by_us(&self) -> bool {
        !self.suspended.is_empty()
    }

    pub fn suspended_handles(&self) -> &[ProcessHandle] {
        &self.suspended
    }
}

/// What one batch of actions did.
#[derive(Debug, Default)]
pub struct ActionReport {
    pub suspended: Vec<String>,
    pub resumed: Vec<String>,
    pub failures: Vec<(String, ActionError)>,
}

impl ActionReport {
    pub fn is_empty(&self) -> bool {
        self.suspended.is_empty() && self.resumed.is_empty() && self.failures.is_empty()
    }
}

pub struct ProcessController<P> {
    host: P,
    watched: Vec<WatchedProcess>,
}

impl<P: ProcessCollector + ProcessExecutor> ProcessController<P> {
    /// Duplicate names (ignoring case) are dropped, first one wins.
    pub fn new<I, S>(host: P, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut watched: Vec<WatchedProcess> = Vec::new();
        for name in names {
            let name = name.into();
            let lowered = name.to_lowercase();
            if !watched.iter().any(|w| w.name.to_lowercase() == lowered) {
                watched.push(WatchedProcess::new(name));
            }
        }
        Self { host, watched }
    }

    pub fn watched(&self) -> &[WatchedProcess] {
        &self.watched
    }

    pub fn host(&self) -> &P {
        &self.host
    }

    pub fn any_suspended(&self) -> bool {
        self.watched.iter().any(WatchedProcess::suspended_by_us)
    }

    /// Act on an edge. Only entering `Exceeded` suspends and only entering
    /// `Normal` resumes; every other edge is a no-op.
    pub fn apply(&mut self, edge: &Edge) -> ActionReport {
        match edge.to {
            DecisionState::Exceeded => self.suspend_all(),
            DecisionState::Normal => self.resume_all(),
            DecisionState::Approaching => ActionReport::default(),
        }
    }

    pub fn suspend_all(&mut self) -> ActionReport {
        let mut report = ActionReport::default();
        for watched in &mut self.watched {
            if watched.suspended_by_us() {
                debug!("{} is already suspended, skipping", watched.name);
                continue;
            }
            let handles = self.host.find_running(&watched.name);
            if handles.is_empty() {
                debug!("{} is not running", watched.name);
                continue;
            }
            for handle in handles {
                match self.host.suspend(&handle) {
                    Ok(()) => {
                        info!("Suspended {} (pid {})", watched.name, handle.pid);
                        watched.suspended.push(handle);
                    }
                    Err(e) => {
                        warn!("Failed to suspend {}: {}", watched.name, e);
                        report.failures.push((watched.name.clone(), e));
                    }
                }
            }
            if watched.suspended_by_us() {
                report.suspended.push(watched.name.clone());
            }
        }
        report
    }

    /// Resume every instance this governor suspended. An instance is
    /// forgotten once it is resumed or has vanished; a later instance of the
    /// same name was never ours. Any other failure keeps the instance so the
    /// next resume (or shutdown) retries it.
    pub fn resume_all(&mut self) -> ActionReport {
        let mut report = ActionReport::default();
        for watched in &mut self.watched {
            let mut resumed_any = false;
            let mut still_suspended = Vec::new();
            for handle in watched.suspended.drain(..) {
                if !self.host.is_alive(&handle) {
                    info!("{} (pid {}) exited while suspended", watched.name, handle.pid);
                    continue;
                }
                match self.host.resume(&handle) {
                    Ok(()) => {
                        info!("Resumed {} (pid {})", watched.name, handle.pid);
                        resumed_any = true;
                    }
                    Err(e) if e.is_vanished() => {
                        info!("{} (pid {}) exited while suspended", watched.name, handle.pid);
                    }
                    Err(e) => {
                        error!("Failed to resume {}: {}", watched.name, e);
                        report.failures.push((watched.name.clone(), e));
                        still_suspended.push(handle);
                    }
                }
            }
            watched.suspended = still_suspended;
            if resumed_any {
                report.resumed.push(watched.name.clone());
            }
        }
        report
    }

    /// Forget suspended instances that no longer exist.
    pub fn reconcile(&mut self) {
        for watched in &mut self.watched {
            let host = &self.host;
            let name = &watched.name;
            watched.suspended.retain(|handle| {
                let alive = host.is_alive(handle);
                if !alive {
                    info!("Suspended {} (pid {}) is gone", name, handle.pid);
                }
                alive
            });
        }
    }
}
