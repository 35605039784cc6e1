//! Small formatting helpers shared by the indicators.

use serde::Deserialize;
use std::time::Duration;

const BYTE_UNITS: [&str; 5] = ["bytes", "KB", "MB", "GB", "TB"];

/// Formats a remaining-time estimate as `MMmSSs`, or `SSs` under a minute.
///
/// # Example
///
/// ```rust
/// use readout::format_eta;
/// use std::time::Duration;
///
/// assert_eq!(format_eta(Duration::from_secs(7)), "07s");
/// assert_eq!(format_eta(Duration::from_secs(125)), "02m05s");
/// ```
pub fn format_eta(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    let minutes = secs / 60;
    let seconds = secs % 60;
    if minutes > 0 {
        format!("{:02}m{:02}s", minutes, seconds)
    } else {
        format!("{:02}s", seconds)
    }
}

/// Human-readable byte count with one decimal place.
///
/// Sizes past the largest unit stay in terabytes.
///
/// ```rust
/// use readout::format_bytes;
///
/// assert_eq!(format_bytes(512), "512.0bytes");
/// assert_eq!(format_bytes(1536), "1.5KB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1}{}", value, BYTE_UNITS[unit])
}

/// Whole-number percentage of `processed` out of `total`, rounded.
///
/// An empty total counts as complete.
pub fn percent(processed: u64, total: u64) -> u64 {
    if total == 0 {
        return 100;
    }
    (processed as f64 / total as f64 * 100.0).round() as u64
}

/// How counts are shown next to an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeFormat {
    /// Plain item counts: `3/10`.
    #[default]
    Count,
    /// Human-readable byte sizes: `1.5KB/3.0MB`.
    Bytes,
}

impl SizeFormat {
    /// Render a count in this format.
    pub fn format(self, n: u64) -> String {
        match self {
            SizeFormat::Count => n.to_string(),
            SizeFormat::Bytes => format_bytes(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_eta_seconds_only() {
        assert_eq!(format_eta(Duration::ZERO), "00s");
        assert_eq!(format_eta(Duration::from_secs(59)), "59s");
        assert_eq!(format_eta(Duration::from_millis(1999)), "01s");
    }

    #[test]
    fn test_format_eta_with_minutes() {
        assert_eq!(format_eta(Duration::from_secs(60)), "01m00s");
        assert_eq!(format_eta(Duration::from_secs(3599)), "59m59s");
        assert_eq!(format_eta(Duration::from_secs(6000)), "100m00s");
    }

    #[test]
    fn test_format_bytes_units() {
        assert_eq!(format_bytes(0), "0.0bytes");
        assert_eq!(format_bytes(1023), "1023.0bytes");
        assert_eq!(format_bytes(1024), "1.0KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0GB");
    }

    #[test]
    fn test_format_bytes_beyond_terabytes() {
        let pb = 1024u64.pow(5);
        assert_eq!(format_bytes(pb), "1024.0TB");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 4), 0);
        assert_eq!(percent(1, 4), 25);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(4, 4), 100);
        assert_eq!(percent(0, 0), 100);
    }

    #[test]
    fn test_size_format() {
        assert_eq!(SizeFormat::Count.format(2048), "2048");
        assert_eq!(SizeFormat::Bytes.format(2048), "2.0KB");
    }
}
