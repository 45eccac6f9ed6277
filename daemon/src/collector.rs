//! Process enumeration (reads /proc on Linux)

mod linux;

pub use linux::LinuxProcessCollector;

/// Identifies one process instance. The start time guards against a
/// recycled pid being mistaken for the instance that was suspended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessHandle {
    pub pid: u32,
    pub start_time: u64,
}

#[derive(Debug, Clone)]
pub struct ProcessInfo {
    pub handle: ProcessHandle,
    pub name: String,
    pub exe_name: String,
    pub state: char,
}

impl ProcessInfo {
    /// Case-insensitive match against the kernel's comm name (truncated to
    /// 15 characters) or the basename of argv[0].
    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.name.to_lowercase() == name || self.exe_name.to_lowercase() == name
    }

    /// Stopped, traced, zombie and dead processes are not running.
    pub fn is_running(&self) -> bool {
        !matches!(self.state, 'T' | 't' | 'Z' | 'X' | 'x')
    }
}

pub trait ProcessCollector: Send + Sync {
    /// Running instances of `name`, excluding the governor itself.
    fn find_running(&self, name: &str) -> Vec<ProcessHandle>;

    /// Whether this exact instance still exists, in any state.
    fn is_alive(&self, handle: &ProcessHandle) -> bool;
}
