use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

/// One turn of a chat transcript.
///
/// Turns are owned by whoever loaded the transcript; views borrow them and
/// never write back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub role: Role,
    #[serde(default)]
    pub content: MessageContent,
    /// Model invocations that produced this turn. `null` and a missing field
    /// both mean "no logs".
    #[serde(default, deserialize_with = "null_as_default", alias = "prompt_logs")]
    pub prompt_logs: Vec<PromptLogEntry>,
}

impl ChatTurn {
    pub fn new(role: Role, content: impl Into<MessageContent>) -> Self {
        Self {
            role,
            content: content.into(),
            prompt_logs: Vec::new(),
        }
    }

    pub fn with_prompt_logs(mut self, prompt_logs: Vec<PromptLogEntry>) -> Self {
        self.prompt_logs = prompt_logs;
        self
    }

    pub fn is_user_input(&self) -> bool {
        self.role == Role::User
    }
}

/// Message body as it appears on the wire: either a bare string or a list of
/// typed parts that may interleave text and images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentItem>),
    /// Anything else. Kept so a bad record does not fail the whole
    /// transcript; it displays as empty text.
    Unsupported(Value),
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<String> for MessageContent {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for MessageContent {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<ContentItem>> for MessageContent {
    fn from(value: Vec<ContentItem>) -> Self {
        Self::Parts(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentItem {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "imageUrl", alias = "image_url")]
    ImageUrl {
        #[serde(rename = "imageUrl", alias = "image_url")]
        image_url: ImageUrl,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Record of one model invocation tied to a turn.
///
/// The shape belongs to the provider that produced it, so it is kept as raw
/// JSON and forwarded untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptLogEntry(Value);

impl PromptLogEntry {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Returns the entry's fields with `extra` layered on top. Keys in
    /// `extra` replace keys already present in the entry.
    ///
    /// Entries that are not JSON objects are wrapped as `{ "value": ... }`.
    pub fn merged_with(&self, extra: Map<String, Value>) -> Map<String, Value> {
        let mut fields = match &self.0 {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            other => Map::from_iter([("value".to_string(), other.clone())]),
        };
        fields.extend(extra);
        fields
    }
}

impl From<Value> for PromptLogEntry {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
