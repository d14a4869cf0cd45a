//! Unit-aware number formatting and parsing.

use std::cmp::Ordering;
use std::sync::OnceLock;

use regex::Regex;

use crate::core::config::BytesUnit;

const KB: f64 = 1024.0;
const MB: f64 = KB * 1024.0;
const GB: f64 = MB * 1024.0;
const TB: f64 = GB * 1024.0;

fn quantity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(-?\d+(?:\.\d+)?)\s*(KB|MB|GB|TB|B|%|ms|Mbps)?$")
            .unwrap_or_else(|e| unreachable!("static quantity regex: {e}"))
    })
}

/// Parse a rendered cell such as `"1,024"`, `"10 MB"`, `"3.5%"` or `"12ms"`
/// into a number on a common scale (sizes in bytes, everything else as-is).
#[must_use]
pub fn parse_quantity(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    let caps = quantity_re().captures(&cleaned)?;
    let value: f64 = caps[1].parse().ok()?;
    let scale = match caps.get(2).map(|m| m.as_str()) {
        Some("KB") => KB,
        Some("MB") => MB,
        Some("GB") => GB,
        Some("TB") => TB,
        _ => 1.0,
    };
    Some(value * scale)
}

/// Numeric comparison when both cells parse as quantities, otherwise lexicographic.
#[must_use]
pub fn compare_cells(a: &str, b: &str) -> Ordering {
    match (parse_quantity(a), parse_quantity(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => a.cmp(b),
    }
}

/// `1234567` -> `"1,234,567"`.
#[must_use]
pub fn format_count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Megabytes shown as MB below 1 GB, then GB, then TB.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_mb(megabytes: i64) -> String {
    let mut value = megabytes as f64;
    if value.abs() < 1024.0 {
        return format!("{} MB", format_count(megabytes));
    }
    value /= 1024.0;
    if value.abs() < 1024.0 {
        return format!("{value:.3} GB");
    }
    value /= 1024.0;
    format!("{value:.3} TB")
}

/// Byte count in the configured display unit.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn format_bytes(bytes: i64, unit: BytesUnit) -> String {
    let b = bytes as f64;
    match unit {
        BytesUnit::Bytes => format_count(bytes),
        BytesUnit::Kb => format!("{} KB", format_count((b / KB).round() as i64)),
        BytesUnit::Mb => format!("{} MB", format_count((b / MB).round() as i64)),
        BytesUnit::Gb => format!("{:.1} GB", b / GB),
        BytesUnit::Tb => format!("{:.3} TB", b / TB),
    }
}

/// Fraction `0.1234` -> `"12.34%"`; negative means unknown.
#[must_use]
pub fn format_percent(fraction: f64) -> String {
    if fraction < 0.0 {
        return "n/a".to_string();
    }
    format!("{:.2}%", fraction * 100.0)
}

#[must_use]
pub fn format_millis(value: f64) -> String {
    format!("{value:.3}ms")
}

#[must_use]
pub fn format_float(value: f64) -> String {
    format!("{value:.4}")
}

#[must_use]
pub fn format_mbps(value: f64) -> String {
    format!("{value:.1}Mbps")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sizes_onto_byte_scale() {
        assert_eq!(parse_quantity("900 KB"), Some(900.0 * 1024.0));
        assert_eq!(parse_quantity("10 MB"), Some(10.0 * 1024.0 * 1024.0));
        assert_eq!(parse_quantity("2GB"), Some(2.0 * 1024.0 * 1024.0 * 1024.0));
    }

    #[test]
    fn strips_thousands_separators() {
        assert_eq!(parse_quantity("1,234,567"), Some(1_234_567.0));
        assert_eq!(parse_quantity(" 12.5% "), Some(12.5));
        assert_eq!(parse_quantity("3.250ms"), Some(3.25));
        assert_eq!(parse_quantity("100.0Mbps"), Some(100.0));
        assert_eq!(parse_quantity("NODE-SAFE"), None);
        assert_eq!(parse_quantity(""), None);
    }

    #[test]
    fn compare_falls_back_to_lexicographic() {
        assert_eq!(compare_cells("900 KB", "10 MB"), Ordering::Less);
        assert_eq!(compare_cells("9", "10"), Ordering::Less);
        assert_eq!(compare_cells("abc", "10"), Ordering::Greater);
    }

    #[test]
    fn formats_counts_with_separators() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(-1_234_567), "-1,234,567");
    }

    #[test]
    fn formats_megabytes() {
        assert_eq!(format_mb(512), "512 MB");
        assert_eq!(format_mb(2048), "2.000 GB");
        assert_eq!(format_mb(3 * 1024 * 1024), "3.000 TB");
    }

    #[test]
    fn formats_bytes_in_unit() {
        assert_eq!(format_bytes(3 * 1024 * 1024, BytesUnit::Mb), "3 MB");
        assert_eq!(format_bytes(2048, BytesUnit::Kb), "2 KB");
        assert_eq!(format_bytes(1500, BytesUnit::Bytes), "1,500");
        assert_eq!(format_percent(-1.0), "n/a");
        assert_eq!(format_percent(0.5), "50.00%");
    }
}
