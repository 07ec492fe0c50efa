//! Time formatting and the free-text seek grammar.

/// Format a position in seconds as `mm:ss`, switching to `hh:mm:ss` from
/// one hour up. Negative or non-finite values render as `"00:00"`.
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".to_string();
    }

    let whole = seconds.floor() as u64;
    let hours = whole / 3600;
    let minutes = (whole % 3600) / 60;
    let secs = whole % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

/// Parse a free-text seek expression.
///
/// A single integer or decimal is raw seconds; two colon-separated integers
/// are `mm:ss`; three are `hh:mm:ss`. Anything else (an empty or whitespace
/// component, a non-numeric component, more than three parts) is a parse
/// failure.
pub fn parse_time_input(raw: &str) -> Option<f64> {
    let normalized = raw.trim();
    if normalized.is_empty() {
        return None;
    }

    if !normalized.contains(':') {
        return parse_seconds(normalized);
    }

    let parts: Vec<&str> = normalized.split(':').map(str::trim).collect();
    let mut values = Vec::with_capacity(parts.len());
    for part in &parts {
        values.push(parse_integer(part)?);
    }

    match values.as_slice() {
        [mins, secs] => Some(mins * 60.0 + secs),
        [hours, mins, secs] => Some(hours * 3600.0 + mins * 60.0 + secs),
        _ => None,
    }
}

// Digits with an optional fraction, nothing else.
fn parse_seconds(raw: &str) -> Option<f64> {
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw, None),
    };

    if int_part.is_empty() || !int_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if let Some(f) = frac_part {
        if f.is_empty() || !f.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
    }

    raw.parse::<f64>().ok()
}

fn parse_integer(raw: &str) -> Option<f64> {
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse::<f64>().ok()
}
