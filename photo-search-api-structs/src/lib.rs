use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const CUSTOM_LABELS_HEADER: &str = "x-amz-meta-customlabels";

/// Creation time of an indexed photo, as the backend happens to send it.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(untagged)]
pub enum Timestamp {
    Text(String),
    /// Milliseconds since the Unix epoch.
    Millis(serde_json::Number),
    Other(serde_json::Value),
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timestamp::Text(text) => f.write_str(text),
            Timestamp::Millis(number) => write!(f, "{}", number),
            Timestamp::Other(value) => write!(f, "{}", value),
        }
    }
}

fn display_value(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Accepts any JSON value, rendering non-strings as their JSON text and `null` as empty.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Value::deserialize(deserializer).map(display_value)
}

fn lenient_labels<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
    let labels = match Value::deserialize(deserializer)? {
        Value::Null | Value::Object(_) => None,
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter(|item| !item.is_null())
                .map(display_value)
                .collect(),
        ),
        single => Some(vec![display_value(single)]),
    };
    Ok(labels)
}

/// One indexed photo. Indexers aren't consistent about types, so every field is read leniently.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub bucket: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub object_key: String,
    #[serde(default)]
    pub created_timestamp: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient_labels")]
    pub labels: Option<Vec<String>>,
}

/// Body of a successful search.
///
/// The search resource answers with a bare array, while gateway SDK clients wrap the same array
/// in a `data` envelope.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Photos(Vec<PhotoRecord>),
    Envelope {
        #[serde(default)]
        data: Option<Vec<PhotoRecord>>,
    },
}

impl SearchResponse {
    pub fn into_photos(self) -> Option<Vec<PhotoRecord>> {
        match self {
            SearchResponse::Photos(photos) => Some(photos),
            SearchResponse::Envelope { data } => data,
        }
    }
}
