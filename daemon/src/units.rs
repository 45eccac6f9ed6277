//! Human-readable byte sizes

use crate::error::{GovernorError, Result};

/// Parse a size such as `"10 GB"`, `"512MiB"` or `"4096"` into bytes.
///
/// Decimal (`kB`, `MB`, ...) and binary (`KiB`, `MiB`, ...) units are
/// distinct: `2 kB` is 2000 bytes, `2 KiB` is 2048.
pub fn parse_size(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);
    if digits.is_empty() {
        return Err(GovernorError::config(format!("invalid size {:?}", input)));
    }
    let value: u64 = digits
        .parse()
        .map_err(|_| GovernorError::config(format!("invalid size {:?}", input)))?;

    let multiplier: u64 = match unit.trim() {
        "" | "B" | "bytes" => 1,
        "kB" | "KB" => 1_000,
        "MB" => 1_000_000,
        "GB" => 1_000_000_000,
        "TB" => 1_000_000_000_000,
        "KiB" => 1 << 10,
        "MiB" => 1 << 20,
        "GiB" => 1 << 30,
        "TiB" => 1 << 40,
        other => {
            return Err(GovernorError::config(format!(
                "unknown size unit {:?} in {:?}",
                other, input
            )))
        }
    };

    value
        .checked_mul(multiplier)
        .ok_or_else(|| GovernorError::config(format!("size {:?} is too large", input)))
}

const UNITS: [(&str, usize); 6] = [
    ("bytes", 0),
    ("KiB", 0),
    ("MiB", 1),
    ("GiB", 2),
    ("TiB", 2),
    ("PiB", 2),
];

/// Format a byte count with binary units, e.g. `"1.5 MiB"`.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 bytes".to_string();
    }
    let mut exponent = 0;
    let mut scaled = bytes;
    while scaled >= 1024 && exponent < UNITS.len() - 1 {
        scaled /= 1024;
        exponent += 1;
    }
    let (unit, decimals) = UNITS[exponent];
    let quotient = bytes as f64 / 1024f64.powi(exponent as i32);
    format!("{:.*} {}", decimals, quotient, unit)
}
