//! Cell highlighters. Each maps a rendered cell value to an optional color.
//!
//! Values that do not parse are left unstyled.

use colored::Color;

const ATTENTION: Color = Color::BrightYellow;
const DANGER: Color = Color::Red;

fn as_int(s: &str) -> Option<i64> {
    s.trim().replace(',', "").parse().ok()
}

fn as_percent(s: &str) -> Option<f64> {
    s.replacen('%', "", 1).trim().parse().ok()
}

/// `ENDANGERED` anywhere in an HA status.
pub fn status_ha(s: &str) -> Option<Color> {
    s.contains("ENDANGERED").then_some(DANGER)
}

/// Cache hit rate: >75% fine, >50% attention, otherwise danger.
pub fn hit_rate(s: &str) -> Option<Color> {
    let v = as_percent(s)?;
    if v > 75.0 {
        None
    } else if v > 50.0 {
        Some(ATTENTION)
    } else {
        Some(DANGER)
    }
}

/// Percentage of machine memory still free.
pub fn machine_memory(s: &str) -> Option<Color> {
    let v = as_percent(s)?;
    if v > 25.0 {
        None
    } else if v > 15.0 {
        Some(ATTENTION)
    } else {
        Some(DANGER)
    }
}

/// Error counters: any nonzero value is flagged, more than 20 is danger.
pub fn error_count(s: &str) -> Option<Color> {
    match as_int(s)? {
        0 => None,
        v if v > 20 => Some(DANGER),
        _ => Some(ATTENTION),
    }
}

/// Resent/lost packet counters.
pub fn packets(s: &str) -> Option<Color> {
    match as_int(s)? {
        0 => None,
        v if v > 10 => Some(DANGER),
        _ => Some(ATTENTION),
    }
}

/// Health flags where `false` is bad.
pub fn health_flag(s: &str) -> Option<Color> {
    (s == "false").then_some(DANGER)
}

/// Flags where `true` is bad (e.g. a paused reporter).
pub fn true_is_bad(s: &str) -> Option<Color> {
    (s == "true").then_some(DANGER)
}

/// Health summary ratios like `3/4`: any shortfall is flagged, `0/n` is danger.
///
/// Only cells that carry a ratio are styled; fully healthy rows render plain
/// because the panel prints `n/n` cells as-is.
pub fn health_ratio(s: &str) -> Option<Color> {
    let (ok, total) = s.split_once('/')?;
    let ok = as_int(ok)?;
    let total = as_int(total)?;
    if ok == total {
        None
    } else if ok == 0 {
        Some(DANGER)
    } else {
        Some(ATTENTION)
    }
}

/// Federation participant state.
pub fn federation_state(s: &str) -> Option<Color> {
    if s.contains("ERROR") {
        Some(DANGER)
    } else if ["PAUSED", "STOPPED", "CONNECT_WAIT"]
        .iter()
        .any(|state| s.contains(state))
    {
        Some(ATTENTION)
    } else {
        None
    }
}

/// Publisher/receiver success rates in `0.0..=1.0`.
pub fn network_rate(s: &str) -> Option<Color> {
    let v = as_percent(s)?;
    if v > 0.95 {
        None
    } else if v >= 0.9 {
        Some(ATTENTION)
    } else {
        Some(DANGER)
    }
}
