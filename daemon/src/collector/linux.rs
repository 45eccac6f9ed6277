use super::{ProcessCollector, ProcessHandle, ProcessInfo};
use std::fs;
use std::path::{Path, PathBuf};

pub struct LinuxProcessCollector {
    proc_root: PathBuf,
    own_pid: u32,
}

impl LinuxProcessCollector {
    pub fn new() -> Self {
        Self {
            proc_root: PathBuf::from("/proc"),
            own_pid: std::process::id(),
        }
    }

    /// Parse `/proc/<pid>/stat`. The comm field is wrapped in parentheses and
    /// may itself contain spaces or parentheses, so split at the last `)`.
    pub fn parse_stat(stat: &str) -> Option<(String, char, u64)> {
        let open = stat.find('(')?;
        let close = stat.rfind(')')?;
        let name = stat.get(open + 1..close)?.to_string();
        let rest: Vec<&str> = stat.get(close + 1..)?.split_whitespace().collect();
        // rest[0] is field 3 (state); starttime is field 22.
        if rest.len() < 20 {
            return None;
        }
        let state = rest[0].chars().next().unwrap_or('?');
        let start_time: u64 = rest[19].parse().ok()?;
        Some((name, state, start_time))
    }

    fn parse_process(&self, pid: u32) -> Option<ProcessInfo> {
        let proc_dir = self.proc_root.join(pid.to_string());
        let stat_content = fs::read_to_string(proc_dir.join("stat")).ok()?;
        let (name, state, start_time) = Self::parse_stat(&stat_content)?;

        let exe_name = fs::read(proc_dir.join("cmdline"))
            .ok()
            .and_then(|raw| {
                let argv0 = raw.split(|b| *b == 0).next()?.to_vec();
                let argv0 = String::from_utf8(argv0).ok()?;
                Path::new(&argv0)
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
            })
            .unwrap_or_default();

        Some(ProcessInfo {
            handle: ProcessHandle { pid, start_time },
            name,
            exe_name,
            state,
        })
    }

    pub fn list_processes(&self) -> Vec<ProcessInfo> {
        let mut processes = Vec::new();
        if let Ok(entries) = fs::read_dir(&self.proc_root) {
            for entry in entries.flatten() {
                if let Some(name) = entry.file_name().to_str() {
                    if let Ok(pid) = name.parse::<u32>() {
                        if let Some(info) = self.parse_process(pid) {
                            processes.push(info);
                        }
                    }
                }
            }
        }
        processes
    }

    pub fn get_process(&self, pid: u32) -> Option<ProcessInfo> {
        self.parse_process(pid)
    }
}

impl Default for LinuxProcessCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessCollector for LinuxProcessCollector {
    fn find_running(&self, name: &str) -> Vec<ProcessHandle> {
        self.list_processes()
            .into_iter()
            .filter(|p| p.handle.pid != self.own_pid && p.is_running() && p.matches(name))
            .map(|p| p.handle)
            .collect()
    }

    fn is_alive(&self, handle: &ProcessHandle) -> bool {
        self.parse_process(handle.pid)
            .map(|p| p.handle.start_time == handle.start_time && !matches!(p.state, 'Z' | 'X' | 'x'))
            .unwrap_or(false)
    }
}
