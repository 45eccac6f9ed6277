use super::{Counter, Sample, TrafficSource};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterfaceBytes {
    pub received: u64,
    pub sent: u64,
}

pub struct ProcNetDevSource {
    path: PathBuf,
    counter: Counter,
    include_loopback: bool,
}

impl ProcNetDevSource {
    pub fn new(counter: Counter, include_loopback: bool) -> Self {
        Self::with_path("/proc/net/dev", counter, include_loopback)
    }

    pub fn with_path(path: impl Into<PathBuf>, counter: Counter, include_loopback: bool) -> Self {
        Self {
            path: path.into(),
            counter,
            include_loopback,
        }
    }

    /// Parse the body of `/proc/net/dev` into per-interface byte counters.
    ///
    /// The first two lines are headers. Each remaining line is
    /// `iface: rx_bytes rx_packets ... (8 rx fields) tx_bytes ...`.
    pub fn parse(content: &str) -> io::Result<Vec<(String, InterfaceBytes)>> {
        let mut interfaces = Vec::new();
        for line in content.lines().skip(2) {
            let Some((name, fields)) = line.split_once(':') else {
                continue;
            };
            let fields: Vec<&str> = fields.split_whitespace().collect();
            if fields.len() < 9 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("truncated counters for interface {}", name.trim()),
                ));
            }
            let parse = |s: &str| {
                s.parse::<u64>()
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
            };
            interfaces.push((
                name.trim().to_string(),
                InterfaceBytes {
                    received: parse(fields[0])?,
                    sent: parse(fields[8])?,
                },
            ));
        }
        Ok(interfaces)
    }

    pub fn total(&self, interfaces: &[(String, InterfaceBytes)]) -> u64 {
        interfaces
            .iter()
            .filter(|(name, _)| self.include_loopback || name != "lo")
            .map(|(_, bytes)| match self.counter {
                Counter::Sent => bytes.sent,
                Counter::Received => bytes.received,
                Counter::Total => bytes.sent.saturating_add(bytes.received),
            })
            .fold(0u64, u64::saturating_add)
    }
}

impl TrafficSource for ProcNetDevSource {
    fn read_total_bytes(&mut self) -> io::Result<Sample> {
        let content = fs::read_to_string(&self.path)?;
        let timestamp = Instant::now();
        let interfaces = Self::parse(&content)?;
        Ok(Sample::new(timestamp, self.total(&interfaces)))
    }
}
