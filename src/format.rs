use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

use crate::error::SearchError;
use crate::traits::DisplayFormat;

const KB: f64 = 1024.0;

/// Binary multiples, largest first.
const DATA_UNITS: [(&str, f64); 5] = [
    ("TB", KB * KB * KB * KB),
    ("GB", KB * KB * KB),
    ("MB", KB * KB),
    ("KB", KB),
    ("B",  1.0),
];

const MILLIS_PER_SEC:  u128 = 1_000;
const MILLIS_PER_MIN:  u128 = 60 * MILLIS_PER_SEC;
const MILLIS_PER_HOUR: u128 = 60 * MILLIS_PER_MIN;
const MILLIS_PER_DAY:  u128 = 24 * MILLIS_PER_HOUR;

/// Parse a data size such as `"10 MB"` or `"1.5kb"` into bytes.
///
/// Units are binary (`1 KB` = 1024 bytes). Whitespace between the number
/// and the unit is optional and the unit is case-insensitive.
pub fn parse_data_size(value: &str) -> Result<f64, SearchError> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^\s*(\d+(?:\.\d+)?)\s*(B|KB|MB|GB|TB)\s*$")
            .expect("data size pattern is valid")
    });

    let caps = re
        .captures(value)
        .ok_or_else(|| SearchError::InvalidDataSize(value.to_string()))?;

    let amount: f64 = caps[1]
        .parse()
        .map_err(|_| SearchError::InvalidDataSize(value.to_string()))?;

    let unit = caps[2].to_ascii_uppercase();
    let multiplier = DATA_UNITS
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, m)| *m)
        .unwrap_or(1.0);

    Ok(amount * multiplier)
}

// ---------------------------------------------------------------------------
// StandardFormat
// ---------------------------------------------------------------------------

/// Default [`DisplayFormat`].
///
/// Durations are shown in the largest unit that divides them evenly
/// (`"5 mins"`, `"90 sec"`), sizes in the largest unit the value reaches,
/// to at most two decimals (`"1 GB"`, `"1.5 KB"`).
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFormat;

impl DisplayFormat for StandardFormat {
    fn format_duration(&self, duration: Duration) -> String {
        let ms = duration.as_millis();
        let (count, unit) = if ms == 0 {
            (0, "sec")
        } else if ms % MILLIS_PER_DAY == 0 {
            (ms / MILLIS_PER_DAY, "day")
        } else if ms % MILLIS_PER_HOUR == 0 {
            (ms / MILLIS_PER_HOUR, "hour")
        } else if ms % MILLIS_PER_MIN == 0 {
            (ms / MILLIS_PER_MIN, "min")
        } else if ms % MILLIS_PER_SEC == 0 {
            return format!("{} sec", ms / MILLIS_PER_SEC);
        } else {
            return format!("{ms} millis");
        };

        if count == 1 || unit == "sec" {
            format!("{count} {unit}")
        } else {
            format!("{count} {unit}s")
        }
    }

    fn format_data_size(&self, bytes: f64) -> String {
        let (unit, size) = DATA_UNITS
            .iter()
            .find(|(_, size)| bytes >= *size)
            .copied()
            .unwrap_or(("B", 1.0));

        let rendered = format!("{:.2}", bytes / size);
        let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
        format!("{rendered} {unit}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_units() {
        assert_eq!(parse_data_size("0 MB").unwrap(), 0.0);
        assert_eq!(parse_data_size("512 B").unwrap(), 512.0);
        assert_eq!(parse_data_size("1 GB").unwrap(), 1024.0 * 1024.0 * 1024.0);
        assert_eq!(parse_data_size("1.5kb").unwrap(), 1536.0);
        assert_eq!(parse_data_size(" 2TB ").unwrap(), 2.0 * KB * KB * KB * KB);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            parse_data_size("lots"),
            Err(SearchError::InvalidDataSize("lots".into()))
        );
        assert!(parse_data_size("10 PB").is_err());
        assert!(parse_data_size("").is_err());
    }

    #[test]
    fn formats_durations_in_whole_units() {
        let f = StandardFormat;
        assert_eq!(f.format_duration(Duration::from_secs(0)), "0 sec");
        assert_eq!(f.format_duration(Duration::from_millis(250)), "250 millis");
        assert_eq!(f.format_duration(Duration::from_secs(30)), "30 sec");
        assert_eq!(f.format_duration(Duration::from_secs(90)), "90 sec");
        assert_eq!(f.format_duration(Duration::from_secs(60)), "1 min");
        assert_eq!(f.format_duration(Duration::from_secs(300)), "5 mins");
        assert_eq!(f.format_duration(Duration::from_secs(3600)), "1 hour");
        assert_eq!(f.format_duration(Duration::from_secs(2 * 86_400)), "2 days");
    }

    #[test]
    fn formats_sizes() {
        let f = StandardFormat;
        assert_eq!(f.format_data_size(512.0), "512 B");
        assert_eq!(f.format_data_size(1536.0), "1.5 KB");
        assert_eq!(f.format_data_size(KB * KB * KB), "1 GB");
        assert_eq!(f.format_data_size(10.0 * KB * KB), "10 MB");
        assert_eq!(f.format_data_size(0.5), "0.5 B");
    }
}
