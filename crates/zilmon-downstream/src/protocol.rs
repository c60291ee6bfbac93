// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! Client-side wire types: JSON-RPC 2.0 framing plus the small slice of the
//! MCP schema the downstream roundtrip needs (`initialize`, `tools/call`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 request or notification (no `id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: impl Into<Value>, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id.into()),
            method: method.into(),
            params: Some(params),
        }
    }

    pub fn notification(method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: None,
            method: method.into(),
            params: Some(params),
        }
    }
}

/// JSON-RPC 2.0 response.  Messages without an `id` (notifications, server
/// requests) fail to deserialize into this and are skipped by the reader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// One content item in a tool result.  Only text parts are consumed; other
/// variants are tolerated and ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    Text { text: String },
    #[serde(other)]
    Other,
}

/// The subset of an MCP `tools/call` result the client cares about.
///
/// The time-series payload arrives either as `structuredContent` (an object)
/// or as a JSON string inside the first text part; both representations are
/// accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    #[serde(default)]
    pub content: Vec<ContentPart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
}

impl CallToolResult {
    /// Concatenation of all text parts.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                ContentPart::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The raw payload, normalized to a JSON string for the extractor:
    /// `structuredContent` serialized when present, otherwise the first
    /// text part.
    pub fn raw_payload(&self) -> String {
        if let Some(structured) = &self.structured_content {
            return structured.to_string();
        }
        self.content
            .iter()
            .find_map(|part| match part {
                ContentPart::Text { text } => Some(text.clone()),
                ContentPart::Other => None,
            })
            .unwrap_or_default()
    }
}

// ─── Unit tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_with_id() {
        let req = JsonRpcRequest::new(json!(7), "tools/call", json!({"name": "t"}));
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["jsonrpc"], "2.0");
        assert_eq!(v["id"], 7);
        assert_eq!(v["method"], "tools/call");
    }

    #[test]
    fn notification_omits_id_key() {
        let req = JsonRpcRequest::notification("notifications/initialized", json!({}));
        let text = serde_json::to_string(&req).unwrap();
        assert!(!text.contains("\"id\""));
    }

    #[test]
    fn notification_does_not_parse_as_response() {
        let line = r#"{"jsonrpc":"2.0","method":"notifications/progress","params":{}}"#;
        assert!(serde_json::from_str::<JsonRpcResponse>(line).is_err());
    }

    #[test]
    fn result_text_payload_is_extracted() {
        let result: CallToolResult = serde_json::from_value(json!({
            "content": [{"type": "text", "text": "[{\"points\":[]}]"}]
        }))
        .unwrap();
        assert_eq!(result.raw_payload(), "[{\"points\":[]}]");
        assert_eq!(result.is_error, None);
    }

    #[test]
    fn structured_content_wins_over_text() {
        let result: CallToolResult = serde_json::from_value(json!({
            "content": [{"type": "text", "text": "ignored"}],
            "structuredContent": [{"points": []}]
        }))
        .unwrap();
        assert_eq!(result.raw_payload(), "[{\"points\":[]}]");
    }

    #[test]
    fn unknown_content_parts_are_tolerated() {
        let result: CallToolResult = serde_json::from_value(json!({
            "content": [
                {"type": "image", "data": "...", "mimeType": "image/png"},
                {"type": "text", "text": "payload"}
            ]
        }))
        .unwrap();
        assert_eq!(result.raw_payload(), "payload");
    }

    #[test]
    fn empty_result_yields_empty_payload() {
        let result = CallToolResult::default();
        assert_eq!(result.raw_payload(), "");
    }

    #[test]
    fn text_concatenates_all_text_parts() {
        let result: CallToolResult = serde_json::from_value(json!({
            "content": [
                {"type": "text", "text": "a"},
                {"type": "text", "text": "b"}
            ]
        }))
        .unwrap();
        assert_eq!(result.text(), "a\nb");
    }
}
