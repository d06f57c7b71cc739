//! The normalized result returned from every dispatch.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, ErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// `{status, message?, kind?, data?}` as seen by the calling agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Set only on errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

impl Envelope {
    pub fn success(data: Option<Map<String, Value>>) -> Self {
        Self {
            status: Status::Success,
            message: None,
            kind: None,
            data,
        }
    }

    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: Some(message.into()),
            kind: Some(kind),
            data: None,
        }
    }

    /// Normalize a remote reply body.
    ///
    /// Both add-ons answer `{"status": "success"|"error", "message"?, "result"?}`,
    /// but the engine editor's code executor and older add-ons return bare
    /// values. Rules:
    /// - `status: "error"` becomes a `RemoteExecutionError` carrying the
    ///   remote message (or the whole body when there is none);
    /// - an object `result` becomes `data`; any other `result` is wrapped as
    ///   `data.result`; without `result`, the remaining fields become `data`;
    /// - objects without `status` are `data` as-is;
    /// - any other JSON value is wrapped as `data.result`, `null` means no data.
    pub fn from_remote(body: Value) -> Self {
        let mut fields = match body {
            Value::Object(fields) => fields,
            Value::Null => return Self::success(None),
            other => return Self::success(Some(wrap_result(other))),
        };

        let status = fields.remove("status");
        let message = match fields.remove("message") {
            Some(Value::String(message)) => Some(message),
            Some(other) => {
                fields.insert("message".to_string(), other);
                None
            }
            None => None,
        };

        if status.as_ref().and_then(Value::as_str) == Some("error") {
            let message = message
                .or_else(|| fields.get("error").and_then(Value::as_str).map(String::from))
                .unwrap_or_else(|| Value::Object(fields).to_string());
            return Self::error(ErrorKind::RemoteExecutionError, message);
        }

        let data = match fields.remove("result") {
            Some(Value::Object(result)) => Some(result),
            Some(Value::Null) | None if fields.is_empty() => None,
            Some(Value::Null) | None => Some(fields),
            Some(other) => Some(wrap_result(other)),
        };

        Self {
            status: Status::Success,
            message,
            kind: None,
            data,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == Status::Error
    }

    /// Look up a field of `data`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|data| data.get(key))
    }

    /// Insert a field into `data`, creating it when absent.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.data
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({"status": "error", "message": e.to_string()})
        })
    }
}

impl From<Error> for Envelope {
    fn from(err: Error) -> Self {
        Self::error(err.kind(), err.to_string())
    }
}

fn wrap_result(value: Value) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert("result".to_string(), value);
    data
}
