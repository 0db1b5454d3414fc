//! Parsing utilities for human-readable configuration values

/// Parse a duration string into whole seconds (e.g., "30s", "5m", "1h", "1d")
///
/// Returns `None` when the string is empty, has an unknown suffix, or
/// overflows.
///
/// # Supported formats
/// - `"1d"` - days
/// - `"1h"` - hours
/// - `"5m"` - minutes
/// - `"30s"` or `"30"` - seconds
pub fn parse_duration_secs(s: &str) -> Option<u64> {
    let s = s.trim().to_lowercase();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('d') {
        (n, 24 * 60 * 60)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 60 * 60)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        (s.as_str(), 1)
    };

    num_str
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(multiplier))
}

/// Format seconds in the largest unit that divides them evenly
pub fn format_duration(secs: u64) -> String {
    if secs == 0 {
        "0s".to_string()
    } else if secs % 86_400 == 0 {
        format!("{}d", secs / 86_400)
    } else if secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

/// Normalise an identifier for flexible matching
///
/// Lowercases and drops `-`, `_`, `.`, `/` and spaces so that
/// `"IBNS 2.0"`, `"ibns-2.0"` and `"ibns20"` compare equal.
pub fn normalize_id(s: &str) -> String {
    s.to_lowercase().replace(['-', '_', ' ', '.', '/'], "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_secs() {
        assert_eq!(parse_duration_secs("30s"), Some(30));
        assert_eq!(parse_duration_secs("5m"), Some(300));
        assert_eq!(parse_duration_secs("1h"), Some(3600));
        assert_eq!(parse_duration_secs("1d"), Some(86_400));
        assert_eq!(parse_duration_secs("3600"), Some(3600));
        assert_eq!(parse_duration_secs("  10M  "), Some(600));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert_eq!(parse_duration_secs(""), None);
        assert_eq!(parse_duration_secs("soon"), None);
        assert_eq!(parse_duration_secs("-5m"), None);
        assert_eq!(parse_duration_secs("5w"), None);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(300), "5m");
        assert_eq!(format_duration(3600), "1h");
        assert_eq!(format_duration(86_400), "1d");
        assert_eq!(format_duration(90), "90s");
    }

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id("IBNS 2.0"), "ibns20");
        assert_eq!(normalize_id("ios-xe"), "iosxe");
        assert_eq!(normalize_id("AOS_CX"), "aoscx");
    }
}
