//! Process action executor (suspend, resume)

use crate::collector::ProcessHandle;
use crate::error::ActionError;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Stop,
    Cont,
}

impl Signal {
    fn raw(self) -> libc::c_int {
        match self {
            Signal::Stop => libc::SIGSTOP,
            Signal::Cont => libc::SIGCONT,
        }
    }
}

pub fn send_signal(pid: u32, signal: Signal) -> Result<(), ActionError> {
    let result = unsafe { libc::kill(pid as libc::pid_t, signal.raw()) };
    if result == 0 {
        Ok(())
    } else {
        Err(ActionError::from_errno(pid, io::Error::last_os_error()))
    }
}

pub trait ProcessExecutor: Send + Sync {
    fn suspend(&self, handle: &ProcessHandle) -> Result<(), ActionError>;
    fn resume(&self, handle: &ProcessHandle) -> Result<(), ActionError>;
}

/// Suspends with SIGSTOP and resumes with SIGCONT.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignalExecutor;

impl ProcessExecutor for SignalExecutor {
    fn suspend(&self, handle: &ProcessHandle) -> Result<(), ActionError> {
        send_signal(handle.pid, Signal::Stop)
    }

    fn resume(&self, handle: &ProcessHandle) -> Result<(), ActionError> {
        send_signal(handle.pid, Signal::Cont)
    }
}
