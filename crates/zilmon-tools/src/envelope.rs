//! The `{status, data|reason}` response envelope every tool resolves to.

use serde_json::{json, Value};

/// Success envelope carrying a data payload.
pub fn success(data: Value) -> String {
    json!({ "status": "success", "data": data }).to_string()
}

/// Failure envelope carrying a human-readable reason.
pub fn failed(reason: impl AsRef<str>) -> String {
    json!({ "status": "failed", "reason": reason.as_ref() }).to_string()
}

/// Failure envelope for a downstream call error.
pub fn downstream_failed(err: impl std::fmt::Display) -> String {
    failed(format!("Error calling downstream MCP: {err}"))
}

// ─── Unit tests ───────────────────────────────────────────────────────────────
