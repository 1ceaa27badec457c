use serde::{Deserialize, Deserializer, Serialize};

pub const DATABASE_NAME: &str = "CloudResumeChallengejad";
pub const CONTAINER_NAME: &str = "Counter";
pub const COUNTER_ID: &str = "1";
pub const COUNTER_PARTITION_KEY: &str = "1";

/// The visit counter document as stored in the `Counter` container.
///
/// Properties other than `id`, `partitionKey` and `value` (including the
/// `_rid`/`_etag`/`_ts` system properties) are carried in `extra` so that an
/// upsert writes back the document exactly as it was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterDocument {
    pub id: String,

    #[serde(
        rename = "partitionKey",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub partition_key: Option<String>,

    #[serde(default, deserialize_with = "null_as_zero")]
    pub value: u64,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CounterDocument {
    pub fn new(id: impl Into<String>, value: u64) -> Self {
        let id = id.into();
        Self {
            partition_key: Some(id.clone()),
            id,
            value,
            extra: serde_json::Map::new(),
        }
    }
}

// A missing field goes through `default`, an explicit `null` comes through here.
fn null_as_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_value_defaults_to_zero() {
        let doc: CounterDocument = serde_json::from_value(json!({"id": "1"})).unwrap();
        assert_eq!(doc.value, 0);
        assert_eq!(doc.partition_key, None);
    }

    #[test]
    fn test_null_value_defaults_to_zero() {
        let doc: CounterDocument =
            serde_json::from_value(json!({"id": "1", "partitionKey": "1", "value": null})).unwrap();
        assert_eq!(doc.value, 0);
        assert_eq!(doc.partition_key.as_deref(), Some("1"));
    }

    #[test]
    fn test_non_integer_value_is_rejected() {
        assert!(serde_json::from_value::<CounterDocument>(json!({"id": "1", "value": "41"})).is_err());
        assert!(serde_json::from_value::<CounterDocument>(json!({"id": "1", "value": -3})).is_err());
        assert!(serde_json::from_value::<CounterDocument>(json!({"id": "1", "value": 4.5})).is_err());
    }

    #[test]
    fn test_system_properties_are_preserved() {
        let stored = json!({
            "id": "1",
            "partitionKey": "1",
            "value": 41,
            "_rid": "abc==",
            "_etag": "\"0000d9\"",
            "_ts": 1700000000
        });

        let mut doc: CounterDocument = serde_json::from_value(stored).unwrap();
        assert_eq!(doc.extra.len(), 3);

        doc.value = 42;
        let written = serde_json::to_value(&doc).unwrap();
        assert_eq!(written["value"], 42);
        assert_eq!(written["_etag"], "\"0000d9\"");
        assert_eq!(written["_ts"], 1700000000);
        assert_eq!(written["partitionKey"], "1");
    }

    #[test]
    fn test_new_sets_partition_key_to_id() {
        let doc = CounterDocument::new(COUNTER_ID, 0);
        assert_eq!(doc.partition_key.as_deref(), Some(COUNTER_PARTITION_KEY));
        let written = serde_json::to_value(&doc).unwrap();
        assert_eq!(written, json!({"id": "1", "partitionKey": "1", "value": 0}));
    }
}
