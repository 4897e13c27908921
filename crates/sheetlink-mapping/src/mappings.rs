use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use sheetlink_core::UrlMapping;

/// A request to store a mapping.
///
/// Nothing is rejected: absent or `null` fields become empty strings,
/// numbers and booleans are stored as their JSON text, and a body that is
/// not an object carries no fields at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub struct CreateMapping {
    pub short_url: Option<String>,
    pub long_url: Option<String>,
}

impl From<Value> for CreateMapping {
    fn from(body: Value) -> Self {
        Self {
            short_url: body.get("shortUrl").and_then(field_text),
            long_url: body.get("longUrl").and_then(field_text),
        }
    }
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

impl CreateMapping {
    pub fn new(short_url: impl Into<String>, long_url: impl Into<String>) -> Self {
        Self {
            short_url: Some(short_url.into()),
            long_url: Some(long_url.into()),
        }
    }

    /// Resolves absent fields to empty strings.
    pub fn into_mapping(self) -> UrlMapping {
        UrlMapping {
            short_url: self.short_url.unwrap_or_default(),
            long_url: self.long_url.unwrap_or_default(),
        }
    }
}

#[async_trait]
pub trait Mappings: Send + Sync + 'static {
    /// Appends a mapping and echoes it back.
    ///
    /// Success means the backing store accepted the append; the row is not
    /// read back.
    async fn create(&self, request: CreateMapping) -> Result<UrlMapping>;

    /// Lists every stored mapping in insertion order.
    async fn list(&self) -> Result<Vec<UrlMapping>>;
}
