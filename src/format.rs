//! Human-readable text for durations, delays and distances.

/// `"{hours}h {minutes}m"`, truncating partial minutes.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    format!("{}h {}m", hours, minutes)
}

/// `"+{minutes}m due to traffic"` for at least one whole minute, otherwise `"No delays"`.
pub fn format_delay(delay_seconds: f64) -> String {
    let minutes = (delay_seconds.max(0.0) / 60.0) as u64;
    if minutes > 0 {
        format!("+{}m due to traffic", minutes)
    } else {
        "No delays".to_string()
    }
}

/// Kilometers with one decimal place.
pub fn format_distance(km: f64) -> String {
    format!("{:.1}", km)
}

/// Round to `places` decimal places.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
