//! Formatting helpers shared across UIs.

/// Format elapsed seconds as zero-padded `HH:MM:SS`.
///
/// Hours are not capped at 24; fractional seconds are truncated.
pub fn format_hms(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}
