#![allow(dead_code)]

use governor_daemon::collector::{ProcessCollector, ProcessHandle};
use governor_daemon::config::Settings;
use governor_daemon::error::{ActionError, NotifyError};
use governor_daemon::executor::ProcessExecutor;
use governor_daemon::notifier::{NotificationMethod, Notifier};
use governor_daemon::sampler::{Counter, Sample, TrafficSource};
use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Default)]
struct HostState {
    running: HashMap<String, Vec<ProcessHandle>>,
    suspend_calls: Vec<u32>,
    resume_calls: Vec<u32>,
    deny: HashSet<u32>,
    vanish_on_signal: HashSet<u32>,
}

/// In-memory process table that records every signal sent.
pub struct FakeHost {
    state: Mutex<HostState>,
    next_pid: Mutex<u32>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HostState::default()),
            next_pid: Mutex::new(100),
        }
    }

    pub fn spawn(&self, name: &str) -> ProcessHandle {
        let mut next = self.next_pid.lock().unwrap();
        *next += 1;
        let handle = ProcessHandle { pid: *next, start_time: *next as u64 * 10 };
        self.state
            .lock()
            .unwrap()
            .running
            .entry(name.to_string())
            .or_default()
            .push(handle);
        handle
    }

    pub fn kill(&self, handle: &ProcessHandle) {
        let mut state = self.state.lock().unwrap();
        for handles in state.running.values_mut() {
            handles.retain(|h| h != handle);
        }
    }

    pub fn deny(&self, handle: &ProcessHandle) {
        self.state.lock().unwrap().deny.insert(handle.pid);
    }

    pub fn allow(&self, handle: &ProcessHandle) {
        self.state.lock().unwrap().deny.remove(&handle.pid);
    }

    /// The process exits right between lookup and signal.
    pub fn vanish_on_signal(&self, handle: &ProcessHandle) {
        self.state.lock().unwrap().vanish_on_signal.insert(handle.pid);
    }

    pub fn suspend_calls(&self) -> Vec<u32> {
        self.state.lock().unwrap().suspend_calls.clone()
    }

    pub fn resume_calls(&self) -> Vec<u32> {
        self.state.lock().unwrap().resume_calls.clone()
    }

    fn signal(&self, handle: &ProcessHandle, resume: bool) -> Result<(), ActionError> {
        let mut state = self.state.lock().unwrap();
        if resume {
            state.resume_calls.push(handle.pid);
        } else {
            state.suspend_calls.push(handle.pid);
        }
        if state.vanish_on_signal.contains(&handle.pid) {
            for handles in state.running.values_mut() {
                handles.retain(|h| h != handle);
            }
            return Err(ActionError::Vanished(handle.pid));
        }
        if state.deny.contains(&handle.pid) {
            return Err(ActionError::PermissionDenied(handle.pid));
        }
        Ok(())
    }
}

impl ProcessCollector for FakeHost {
    fn find_running(&self, name: &str) -> Vec<ProcessHandle> {
        let state = self.state.lock().unwrap();
        let suspended: HashSet<u32> = state
            .suspend_calls
            .iter()
            .filter(|pid| !state.resume_calls.contains(pid))
            .copied()
            .collect();
        state
            .running
            .get(name)
            .map(|hs| hs.iter().filter(|h| !suspended.contains(&h.pid)).copied().collect())
            .unwrap_or_default()
    }

    fn is_alive(&self, handle: &ProcessHandle) -> bool {
        self.state
            .lock()
            .unwrap()
            .running
            .values()
            .any(|hs| hs.contains(handle))
    }
}

impl ProcessExecutor for FakeHost {
    fn suspend(&self, handle: &ProcessHandle) -> Result<(), ActionError> {
        self.signal(handle, false)
    }

    fn resume(&self, handle: &ProcessHandle) -> Result<(), ActionError> {
        self.signal(handle, true)
    }
}

/// Replays a fixed list of readings; `None` entries fail with an I/O error.
pub struct ScriptedSource {
    readings: VecDeque<Option<Sample>>,
    pub reads: Arc<Mutex<u32>>,
}

impl ScriptedSource {
    pub fn new(readings: Vec<Option<Sample>>) -> Self {
        Self {
            readings: readings.into(),
            reads: Arc::new(Mutex::new(0)),
        }
    }

    /// Samples `interval_secs` apart starting at `base`.
    pub fn every(base: Instant, interval_secs: u64, totals: &[u64]) -> Self {
        Self::new(
            totals
                .iter()
                .enumerate()
                .map(|(i, total)| Some(Sample::new(at(base, i as u64 * interval_secs), *total)))
                .collect(),
        )
    }

    pub fn push(&mut self, reading: Option<Sample>) {
        self.readings.push_back(reading);
    }
}

impl TrafficSource for ScriptedSource {
    fn read_total_bytes(&mut self) -> io::Result<Sample> {
        *self.reads.lock().unwrap() += 1;
        match self.readings.pop_front() {
            Some(Some(sample)) => Ok(sample),
            Some(None) => Err(io::Error::new(io::ErrorKind::Other, "counter unavailable")),
            None => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted")),
        }
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub messages: Arc<Mutex<Vec<(String, String)>>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn summaries(&self) -> Vec<String> {
        self.messages.lock().unwrap().iter().map(|(s, _)| s.clone()).collect()
    }

    pub fn bodies(&self) -> Vec<String> {
        self.messages.lock().unwrap().iter().map(|(_, b)| b.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, summary: &str, body: &str) -> Result<(), NotifyError> {
        self.messages
            .lock()
            .unwrap()
            .push((summary.to_string(), body.to_string()));
        if self.fail {
            Err(NotifyError("no notification daemon".to_string()))
        } else {
            Ok(())
        }
    }
}

pub fn at(base: Instant, secs: u64) -> Instant {
    base + Duration::from_secs(secs)
}

pub fn settings(limit: u64, window_secs: u64, processes: &[&str]) -> Settings {
    Settings {
        sample_interval: Duration::from_secs(10),
        limit,
        window: Duration::from_secs(window_secs),
        approach_ratio: 0.8,
        counter: Counter::Total,
        include_loopback: false,
        processes: processes.iter().map(|p| p.to_string()).collect(),
        notification_method: NotificationMethod::None,
        notification_cooldown: Duration::ZERO,
        notify_on_resume: true,
        log_file: None,
    }
}
