use std::fmt::Display;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Identifier of the chat session a transcript belongs to.
///
/// The value is opaque: transcripts recorded elsewhere may carry any string,
/// so only freshly created ids are guaranteed to be UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_session_id_is_a_uuid() {
        let id = SessionId::default();
        let parsed = Uuid::parse_str(id.as_str()).expect("uuid");
        assert_ne!(parsed, Uuid::nil());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = SessionId::from("session-1");
        assert_eq!(
            serde_json::to_value(&id).expect("serialize"),
            serde_json::json!("session-1")
        );
    }
}
