//! Field access over a note's content map.
//!
//! API v1 content values are used as-is. API v2 wraps every value as
//! `{"value": ...}`; the wrapper must hold exactly that one entry, anything
//! else is a structural error in the source data.

use crate::error::{OpenReviewError, Result};
use crate::note::ApiVersion;
use serde_json::{Map, Value};

/// Read-only view of a content map for one API version.
#[derive(Debug, Clone, Copy)]
pub struct Content<'a> {
    map: &'a Map<String, Value>,
    api: ApiVersion,
    record: &'a str,
}

impl<'a> Content<'a> {
    /// `record` is the owning note's id, used in error messages.
    pub fn new(map: &'a Map<String, Value>, api: ApiVersion, record: &'a str) -> Self {
        Self { map, api, record }
    }

    /// Whether the key is present at all (wrapped or not).
    pub fn has(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Value of `key`, unwrapped for v2. `Ok(None)` when absent.
    pub fn get(&self, key: &str) -> Result<Option<&'a Value>> {
        match self.map.get(key) {
            None => Ok(None),
            Some(raw) => match self.api {
                ApiVersion::V1 => Ok(Some(raw)),
                ApiVersion::V2 => self.unwrap_value(key, raw).map(Some),
            },
        }
    }

    /// Value of a required field.
    pub fn require(&self, key: &str) -> Result<&'a Value> {
        self.get(key)?.ok_or_else(|| OpenReviewError::MissingField {
            field: key.to_string(),
            record: self.record.to_string(),
        })
    }

    /// Required field that must be a string.
    pub fn require_str(&self, key: &str) -> Result<&'a str> {
        self.require(key)?
            .as_str()
            .ok_or_else(|| OpenReviewError::Validation(format!(
                "field `{}` in record {} is not a string",
                key, self.record
            )))
    }

    /// Optional field rendered as a string, `None` when absent.
    pub fn get_str(&self, key: &str) -> Result<Option<&'a str>> {
        Ok(self.get(key)?.and_then(Value::as_str))
    }

    fn unwrap_value(&self, key: &str, raw: &'a Value) -> Result<&'a Value> {
        let malformed = |keys| OpenReviewError::MalformedField {
            field: key.to_string(),
            record: self.record.to_string(),
            keys,
        };
        let wrapper = raw.as_object().ok_or_else(|| malformed(0))?;
        if wrapper.len() != 1 {
            return Err(malformed(wrapper.len()));
        }
        wrapper.get("value").ok_or_else(|| malformed(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_v1_values_used_as_is() -> Result<()> {
        let m = map(json!({"title": "Deep Nets", "authors": ["A"]}));
        let content = Content::new(&m, ApiVersion::V1, "n1");
        assert_eq!(content.require_str("title")?, "Deep Nets");
        assert_eq!(content.require("authors")?, &json!(["A"]));
        assert!(content.get("pdf")?.is_none());
        Ok(())
    }

    #[test]
    fn test_v2_values_unwrapped() -> Result<()> {
        let m = map(json!({"title": {"value": "Deep Nets"}, "rating": {"value": 6}}));
        let content = Content::new(&m, ApiVersion::V2, "n1");
        assert_eq!(content.require_str("title")?, "Deep Nets");
        assert_eq!(content.require("rating")?, &json!(6));
        Ok(())
    }

    #[test]
    fn test_v2_wrapper_with_extra_keys_is_malformed() {
        let m = map(json!({"authorids": {"value": ["~A1"], "readers": ["everyone"]}}));
        let content = Content::new(&m, ApiVersion::V2, "n1");
        match content.get("authorids") {
            Err(OpenReviewError::MalformedField { field, keys, .. }) => {
                assert_eq!(field, "authorids");
                assert_eq!(keys, 2);
            }
            other => panic!("expected malformed field, got {:?}", other),
        }
    }

    #[test]
    fn test_v2_empty_wrapper_is_malformed() {
        let m = map(json!({"title": {}}));
        let content = Content::new(&m, ApiVersion::V2, "n1");
        assert!(matches!(
            content.get("title"),
            Err(OpenReviewError::MalformedField { keys: 0, .. })
        ));
    }

    #[test]
    fn test_missing_required_field() {
        let m = map(json!({}));
        let content = Content::new(&m, ApiVersion::V1, "n9");
        match content.require("abstract") {
            Err(OpenReviewError::MissingField { field, record }) => {
                assert_eq!(field, "abstract");
                assert_eq!(record, "n9");
            }
            other => panic!("expected missing field, got {:?}", other),
        }
    }
}
