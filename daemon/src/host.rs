//! Process capability backed by the running Linux system

use crate::collector::{LinuxProcessCollector, ProcessCollector, ProcessHandle};
use crate::error::ActionError;
use crate::executor::{ProcessExecutor, SignalExecutor};

/// The real process capability: `/proc` enumeration plus signals.
#[derive(Default)]
pub struct LinuxHost {
    collector: LinuxProcessCollector,
    executor: SignalExecutor,
}

impl LinuxHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessCollector for LinuxHost {
    fn find_running(&self, name: &str) -> Vec<ProcessHandle> {
        self.collector.find_running(name)
    }

    fn is_alive(&self, handle: &ProcessHandle) -> bool {
        self.collector.is_alive(handle)
    }
}

impl ProcessExecutor for LinuxHost {
    fn suspend(&self, handle: &ProcessHandle) -> Result<(), ActionError> {
        self.executor.suspend(handle)
    }

    fn resume(&self, handle: &ProcessHandle) -> Result<(), ActionError> {
        self.executor.resume(handle)
    }
}
