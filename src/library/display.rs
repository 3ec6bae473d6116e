use super::model::Track;

/// Format seconds as `MM:SS.mmm`. Minutes are not wrapped into hours.
pub fn format_time(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let mins = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    let ms = ((seconds % 1.0) * 1000.0).floor() as u64;
    format!("{mins:02}:{secs:02}.{ms:03}")
}

/// Format a byte count with binary units, rounded to two decimals.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}

/// One-line summary of a track for list views.
pub fn track_summary(track: &Track) -> String {
    format!(
        "{} [{}] {}  {}  {}  vol {}%  {}",
        track.id,
        track.kind.as_str().to_ascii_uppercase(),
        track.name,
        format_time(track.duration_seconds),
        format_bytes(track.size_bytes),
        (track.volume * 100.0).round() as i64,
        track.state.job_status,
    )
}
