//! Wire-level data model: request/reply envelopes, announcements, and raw events.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Discovery record published periodically by the announcer and on ping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Announcement {
    pub node: String,
    pub application: String,
}

/// Identifies a specific engine resource a request addresses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceKey {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
}

/// An incoming RPC request envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<ResourceKey>,
    #[serde(default)]
    pub payload: Value,
}

/// The distinguished error kind reserved for "resource does not exist".
pub const ERROR_KIND_NOT_FOUND: &str = "NotFound";
/// The distinguished error kind for an unrecognized `Request::kind`.
pub const ERROR_KIND_NOT_IMPLEMENTED: &str = "NotImplemented";
/// Generic catch-all for any other handler failure.
pub const ERROR_KIND_ERROR: &str = "Error";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReplyError {
    pub kind: String,
    pub message: String,
}

impl ReplyError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self { kind: ERROR_KIND_NOT_FOUND.to_string(), message: message.into() }
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self { kind: ERROR_KIND_NOT_IMPLEMENTED.to_string(), message: message.into() }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self { kind: ERROR_KIND_ERROR.to_string(), message: message.into() }
    }
}

/// Reply envelope published back on a request's reply subject.
///
/// Serializes to `{"ok":true,"data":...}` or `{"ok":false,"error":{...}}`, matching the
/// two shapes callers outside this crate already parse.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Ok(Value),
    Err(ReplyError),
}

impl Reply {
    pub fn ok(data: Value) -> Self {
        Reply::Ok(data)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Reply::Err(ReplyError::not_found(message))
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        Reply::Err(ReplyError::not_implemented(message))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Reply::Err(ReplyError::other(message))
    }
}

impl Serialize for Reply {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        match self {
            Reply::Ok(data) => {
                let mut s = serializer.serialize_struct("Reply", 2)?;
                s.serialize_field("ok", &true)?;
                s.serialize_field("data", data)?;
                s.end()
            }
            Reply::Err(error) => {
                let mut s = serializer.serialize_struct("Reply", 2)?;
                s.serialize_field("ok", &false)?;
                s.serialize_field("error", error)?;
                s.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Reply {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Shape {
            ok: bool,
            #[serde(default)]
            data: Value,
            #[serde(default)]
            error: Option<ReplyError>,
        }
        let shape = Shape::deserialize(deserializer)?;
        if shape.ok {
            Ok(Reply::Ok(shape.data))
        } else {
            Ok(Reply::Err(shape.error.unwrap_or_else(|| ReplyError::other("unknown error"))))
        }
    }
}

/// A case-sensitive, ordered, multi-valued header bag.
///
/// A `Vec` rather than a `HashMap` because the raw-event path clones a header, overrides
/// one key (`dialog`) per dialog target, and republishes — cloning a small vec is cheap
/// and preserves insertion order for readers that care about it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header(Vec<(String, String)>);

impl Header {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Overwrites the first existing entry for `key`, or appends if absent.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.0.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.0.push((key, value));
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.0.retain(|(k, _)| k != key);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Engine-neutral representation of a telephony event, ready to publish.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    pub header: Header,
    pub body: Value,
}

/// Embedded in replies that expose a concrete resource, identifying the owning proxy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metadata {
    pub application: String,
    pub node: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialog: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_ok_serializes_to_ok_true_shape() {
        let reply = Reply::ok(serde_json::json!({"id": "c1"}));
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value, serde_json::json!({"ok": true, "data": {"id": "c1"}}));
    }

    #[test]
    fn reply_err_serializes_to_ok_false_shape() {
        let reply = Reply::not_found("channel missing");
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"ok": false, "error": {"kind": "NotFound", "message": "channel missing"}})
        );
    }

    #[test]
    fn reply_round_trips_through_json() {
        let reply = Reply::error("boom");
        let encoded = serde_json::to_string(&reply).unwrap();
        let decoded: Reply = serde_json::from_str(&encoded).unwrap();
        assert_eq!(reply, decoded);
    }

    #[test]
    fn header_set_overwrites_existing_key() {
        let mut header = Header::new();
        header.set("application", "demo");
        header.set("application", "other");
        assert_eq!(header.get("application"), Some("other"));
        assert_eq!(header.iter().count(), 1);
    }

    #[test]
    fn header_clone_is_independent() {
        let mut header = Header::new();
        header.set("application", "demo");
        let mut cloned = header.clone();
        cloned.set("dialog", "d1");
        assert_eq!(header.get("dialog"), None);
        assert_eq!(cloned.get("dialog"), Some("d1"));
    }
}
