const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human-readable size with 1024 steps and two decimals, rounded half-up.
pub fn format_bytes(num_bytes: u64) -> String {
    let mut unit = 0;
    let mut divisor: u128 = 1;
    while (num_bytes as u128) >= divisor * 1024 && unit < SIZE_UNITS.len() - 1 {
        divisor *= 1024;
        unit += 1;
    }
    // Hundredths of the unit, half-up, in integer math
    let hundredths = (num_bytes as u128 * 200 + divisor) / (divisor * 2);
    format!(
        "{}.{:02} {}",
        hundredths / 100,
        hundredths % 100,
        SIZE_UNITS[unit]
    )
}

/// Total duration scaled to its two or three most significant units.
///
/// Tiers: seconds, minutes, hours, days, weeks (under 30 days), 30-day
/// months (under 12 of them), years.
pub fn format_duration(total_secs: f64) -> String {
    let secs = if total_secs.is_finite() && total_secs > 0.0 {
        (total_secs + 0.5).floor() as u64
    } else {
        0
    };

    if secs < 60 {
        return format!("{secs}s");
    }
    let (mins, s) = (secs / 60, secs % 60);
    if mins < 60 {
        return format!("{mins}m {s}s");
    }
    let (hours, m) = (mins / 60, mins % 60);
    if hours < 24 {
        return format!("{hours}h {m}m {s}s");
    }
    let (days, h) = (hours / 24, hours % 24);
    if days < 7 {
        return format!("{days}d {h}h {m}m");
    }
    if days < 30 {
        return format!("{}w {}d {h}h", days / 7, days % 7);
    }
    let (months, d) = (days / 30, days % 30);
    if months < 12 {
        return format!("{months}mo {d}d");
    }
    format!("{}y {}mo", months / 12, months % 12)
}
