//! Argument extraction shared by the builtin tools.
//!
//! Errors are plain reason strings — the caller wraps them in a failure
//! envelope, so a bad argument degrades to a structured response like any
//! other tool failure.

use chrono::{DateTime, Utc};
use serde_json::Value;

use zilmon_core::QueryWindow;

pub(crate) const DEFAULT_LIMIT: usize = 5;

pub(crate) fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, String> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| format!("missing required parameter '{key}'"))
}

/// Optional positive integer `limit`, defaulting to [`DEFAULT_LIMIT`].
pub(crate) fn optional_limit(args: &Value) -> Result<usize, String> {
    match args.get("limit") {
        None | Some(Value::Null) => Ok(DEFAULT_LIMIT),
        Some(v) => match v.as_u64() {
            Some(n) if n > 0 => Ok(n as usize),
            _ => Err(format!("invalid 'limit': expected a positive integer, got {v}")),
        },
    }
}

/// Optional ISO-8601 timestamp.
pub(crate) fn optional_time(args: &Value, key: &str) -> Result<Option<DateTime<Utc>>, String> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|e| format!("invalid '{key}': {e}")),
        Some(v) => Err(format!("invalid '{key}': expected an ISO-8601 string, got {v}")),
    }
}

/// Effective query window from the optional `startTime` / `endTime` pair.
pub(crate) fn window_from_args(args: &Value) -> Result<QueryWindow, String> {
    let start = optional_time(args, "startTime")?;
    let end = optional_time(args, "endTime")?;
    Ok(QueryWindow::resolve(start, end, Utc::now()))
}

// ─── Unit tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_str_present() {
        assert_eq!(required_str(&json!({"validator": "x"}), "validator"), Ok("x"));
    }

    #[test]
    fn required_str_missing_or_empty() {
        assert!(required_str(&json!({}), "validator").is_err());
        assert!(required_str(&json!({"validator": "  "}), "validator").is_err());
        assert!(required_str(&json!({"validator": 7}), "validator").is_err());
    }

    #[test]
    fn limit_defaults_to_five() {
        assert_eq!(optional_limit(&json!({})), Ok(DEFAULT_LIMIT));
        assert_eq!(optional_limit(&json!({"limit": null})), Ok(DEFAULT_LIMIT));
    }

    #[test]
    fn limit_rejects_zero_and_negatives() {
        assert!(optional_limit(&json!({"limit": 0})).is_err());
        assert!(optional_limit(&json!({"limit": -3})).is_err());
        assert!(optional_limit(&json!({"limit": "many"})).is_err());
    }

    #[test]
    fn time_parses_rfc3339() {
        let t = optional_time(&json!({"endTime": "2026-03-14T12:00:00Z"}), "endTime")
            .unwrap()
            .unwrap();
        assert_eq!(t.timestamp(), 1_773_489_600);
    }

    #[test]
    fn time_rejects_garbage() {
        assert!(optional_time(&json!({"endTime": "yesterday"}), "endTime").is_err());
        assert!(optional_time(&json!({"endTime": 12}), "endTime").is_err());
    }

    #[test]
    fn window_end_only_is_one_hour_before_end() {
        let w = window_from_args(&json!({"endTime": "2026-03-14T12:00:00Z"})).unwrap();
        assert_eq!(w.length_secs(), 3600);
        assert!(w.explicit);
    }

    #[test]
    fn window_defaults_when_no_bounds() {
        let w = window_from_args(&json!({})).unwrap();
        assert_eq!(w.length_secs(), 3600);
        assert!(!w.explicit);
    }
}
