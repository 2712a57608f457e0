// SPDX-License-Identifier: MIT
//
// Stdio wire envelopes: one JSON object per line in each direction. The
// request `id` is opaque to the bridges; it exists so the embedding side
// can correlate replies, which arrive in completion order, not arrival
// order.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use bridgekit_core::channel::{MethodCall, MethodReply};

/// One inbound call line: `{"id": 7, "channel": "...", "method": "...",
/// "arguments": ...}`. Absent arguments read as null.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestEnvelope {
    pub id: u64,
    pub channel: String,
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl RequestEnvelope {
    pub fn into_call(self) -> (u64, String, MethodCall) {
        let call = MethodCall::new(self.method, self.arguments);
        (self.id, self.channel, call)
    }
}

/// One outbound reply line. Exactly one of `result`, `error`, or
/// `notImplemented` is present.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyEnvelope {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<WireError>,
    #[serde(skip_serializing_if = "is_false")]
    pub not_implemented: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

fn is_false(flag: &bool) -> bool {
    !flag
}

impl ReplyEnvelope {
    pub fn new(id: u64, reply: MethodReply) -> Self {
        match reply {
            MethodReply::Value(value) => Self {
                id,
                result: Some(value),
                error: None,
                not_implemented: false,
            },
            MethodReply::Error {
                code,
                message,
                details,
            } => Self {
                id,
                result: None,
                error: Some(WireError {
                    code,
                    message,
                    details,
                }),
                not_implemented: false,
            },
            MethodReply::NotImplemented => Self {
                id,
                result: None,
                error: None,
                not_implemented: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_without_arguments_reads_as_null() {
        let envelope: RequestEnvelope = serde_json::from_str(
            r#"{"id": 3, "channel": "bridgekit/permissions", "method": "getPlatformVersion"}"#,
        )
        .expect("deserialize");
        assert_eq!(envelope.arguments, Value::Null);

        let (id, channel, call) = envelope.into_call();
        assert_eq!(id, 3);
        assert_eq!(channel, "bridgekit/permissions");
        assert_eq!(call.method, "getPlatformVersion");
    }

    #[test]
    fn reply_serializes_exactly_one_outcome_field() {
        let value = ReplyEnvelope::new(1, MethodReply::Value(json!("iOS 17.2")));
        assert_eq!(
            serde_json::to_value(&value).expect("serialize"),
            json!({ "id": 1, "result": "iOS 17.2" })
        );

        let error = ReplyEnvelope::new(
            2,
            MethodReply::error("delete_failed", "no such contact", None),
        );
        assert_eq!(
            serde_json::to_value(&error).expect("serialize"),
            json!({ "id": 2, "error": { "code": "delete_failed", "message": "no such contact" } })
        );

        let unimplemented = ReplyEnvelope::new(3, MethodReply::NotImplemented);
        assert_eq!(
            serde_json::to_value(&unimplemented).expect("serialize"),
            json!({ "id": 3, "notImplemented": true })
        );
    }

    #[test]
    fn null_result_is_kept_on_the_wire() {
        // A null result is the "no value" reply; it must stay distinct from
        // notImplemented.
        let reply = ReplyEnvelope::new(4, MethodReply::null());
        assert_eq!(
            serde_json::to_value(&reply).expect("serialize"),
            json!({ "id": 4, "result": null })
        );
    }
}
