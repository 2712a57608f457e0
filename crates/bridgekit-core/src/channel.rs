// SPDX-License-Identifier: MIT
//
// The cross-boundary channel contract: one method call in, exactly one
// asynchronous reply out.

use serde_json::Value;
use uuid::Uuid;

/// Correlation id assigned to each inbound call, used for log correlation
/// and for keying replies in the host router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallId(pub Uuid);

impl CallId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CallId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An untyped method call as delivered by the call router.
///
/// `arguments` carries whatever the caller sent: a dictionary for most
/// methods, a bare string for `getContacts`, or null when the method takes
/// no arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// The `arguments` dictionary, if the caller sent one.
    pub fn argument_map(&self) -> Option<&serde_json::Map<String, Value>> {
        self.arguments.as_object()
    }
}

/// The single reply owed to every call.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodReply {
    /// Success payload. `Value::Null` is the "no value" reply.
    Value(Value),
    /// Failure signal with a stable code, a human-readable message, and
    /// optional native detail.
    Error {
        code: String,
        message: String,
        details: Option<Value>,
    },
    /// Unrecognized method, unknown permission kind, or platform gate not
    /// met. Distinct from an error by contract.
    NotImplemented,
}

impl MethodReply {
    /// The "no value" success reply.
    pub fn null() -> Self {
        Self::Value(Value::Null)
    }

    pub fn bool(value: bool) -> Self {
        Self::Value(Value::Bool(value))
    }

    pub fn error(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<Value>,
    ) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
            details,
        }
    }
}
