use chrono::{DateTime, TimeZone, Utc};

/// Current time as epoch milliseconds, the unit progress entries use.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Parse a user-supplied instant into epoch milliseconds.
///
/// Supports:
/// - RFC 3339 (e.g. `"2026-10-16T05:00:00Z"`)
/// - Millisecond epoch (13+ digits)
/// - Second epoch (10-12 digits)
pub fn parse_millis(s: &str) -> Option<i64> {
    let trimmed = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.timestamp_millis());
    }

    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match trimmed.len() {
        13.. => trimmed.parse().ok(),
        10..=12 => trimmed.parse::<i64>().ok()?.checked_mul(1000),
        _ => None,
    }
}

/// Render epoch milliseconds for terminal output.
pub fn format_millis(ms: i64) -> String {
    match Utc.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => format!("{ms} ms"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339() {
        assert_eq!(parse_millis("2026-02-08T05:00:00.000Z"), Some(1770526800000));
    }

    #[test]
    fn test_parse_epochs() {
        assert_eq!(parse_millis("1770526800123"), Some(1770526800123));
        assert_eq!(parse_millis("1770526800"), Some(1770526800000));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(parse_millis("yesterday"), None);
        assert_eq!(parse_millis(""), None);
        assert_eq!(parse_millis("123"), None);
    }

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(1770526800000), "2026-02-08 05:00:00 UTC");
        assert!(now_millis() > 1770526800000);
    }
}
