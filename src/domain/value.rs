//! Mapped and stored attribute values
//!
//! [`MappedValue`] is what the path mapper extracts from a backend document,
//! [`StoredValue`] is what ends up in the host's attribute store.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value extracted for one target attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MappedValue {
    /// Path missing or evaluated to null; never written
    Null,
    /// Single text value
    Scalar(String),
    /// Ordered list of text values
    List(Vec<String>),
}

impl MappedValue {
    /// Converts an evaluated JSON node into a mapped value
    ///
    /// Strings are kept verbatim, every other scalar or object is rendered as
    /// compact JSON. Null list elements are dropped.
    ///
    /// ```
    /// use sensorsync::domain::MappedValue;
    /// use serde_json::json;
    ///
    /// assert_eq!(MappedValue::from_json(json!("v")), MappedValue::Scalar("v".into()));
    /// assert_eq!(MappedValue::from_json(json!(3)), MappedValue::Scalar("3".into()));
    /// assert_eq!(
    ///     MappedValue::from_json(json!(["a", null, 1])),
    ///     MappedValue::List(vec!["a".into(), "1".into()])
    /// );
    /// ```
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => MappedValue::Null,
            Value::Array(items) => MappedValue::List(
                items
                    .into_iter()
                    .filter(|item| !item.is_null())
                    .map(render_text)
                    .collect(),
            ),
            other => MappedValue::Scalar(render_text(other)),
        }
    }

    /// True for [`MappedValue::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, MappedValue::Null)
    }
}

fn render_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Attribute uri → extracted value, in mapping order
pub type MappingResult = IndexMap<String, MappedValue>;

/// Outcome of asking a handler about one external id
#[derive(Debug, Clone, PartialEq)]
pub enum HandleOutcome {
    /// Mapping succeeded (values may still be mostly null)
    Mapped(MappingResult),
    /// The identity-confirming request failed; nothing should be written
    Errors(Vec<String>),
}

impl HandleOutcome {
    /// Returns the mapping result, if any
    pub fn mapped(&self) -> Option<&MappingResult> {
        match self {
            HandleOutcome::Mapped(result) => Some(result),
            HandleOutcome::Errors(_) => None,
        }
    }
}

/// Schema declarations matching one attribute within a catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaCounts {
    /// Single collection fields bound to the attribute
    #[serde(default)]
    pub collection_fields: usize,

    /// Repeating groups containing a collection field bound to the attribute
    #[serde(default)]
    pub repeating_groups: usize,
}

/// Lookup and write key for an upsert
///
/// Fields not named by a variant are not part of the lookup; new rows get
/// their defaults (`set_prefix = ""`, `set_index = 0`, `collection_index = 0`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UpsertKey {
    /// Plain scalar value of the triggering set
    Scalar {
        project_id: i64,
        attribute_uri: String,
        set_index: i64,
    },
    /// One element of a collection field
    CollectionItem {
        project_id: i64,
        attribute_uri: String,
        set_index: i64,
        collection_index: i64,
    },
    /// One repetition of a repeating group nested under `set_prefix`
    SetInstance {
        project_id: i64,
        attribute_uri: String,
        set_prefix: String,
        set_index: i64,
    },
}

impl UpsertKey {
    /// Project the key belongs to
    pub fn project_id(&self) -> i64 {
        match self {
            UpsertKey::Scalar { project_id, .. }
            | UpsertKey::CollectionItem { project_id, .. }
            | UpsertKey::SetInstance { project_id, .. } => *project_id,
        }
    }

    /// Attribute the key targets
    pub fn attribute_uri(&self) -> &str {
        match self {
            UpsertKey::Scalar { attribute_uri, .. }
            | UpsertKey::CollectionItem { attribute_uri, .. }
            | UpsertKey::SetInstance { attribute_uri, .. } => attribute_uri,
        }
    }

    /// Whether a stored row is addressed by this key
    pub fn matches(&self, row: &StoredValue) -> bool {
        if row.project_id != self.project_id() || row.attribute_uri != self.attribute_uri() {
            return false;
        }
        match self {
            UpsertKey::Scalar { set_index, .. } => row.set_index == *set_index,
            UpsertKey::CollectionItem {
                set_index,
                collection_index,
                ..
            } => row.set_index == *set_index && row.collection_index == *collection_index,
            UpsertKey::SetInstance {
                set_prefix,
                set_index,
                ..
            } => row.set_prefix == *set_prefix && row.set_index == *set_index,
        }
    }
}

/// A row in the attribute store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredValue {
    pub project_id: i64,
    pub attribute_uri: String,
    pub set_prefix: String,
    pub set_index: i64,
    pub collection_index: i64,
    /// Row belongs to a collection or repeating group
    pub set_collection: bool,
    pub text: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl StoredValue {
    /// Builds a fresh row for a key that matched nothing
    pub fn from_key(key: &UpsertKey, text: String, now: DateTime<Utc>) -> Self {
        let (set_prefix, set_index, collection_index, set_collection) = match key {
            UpsertKey::Scalar { set_index, .. } => (String::new(), *set_index, 0, false),
            UpsertKey::CollectionItem {
                set_index,
                collection_index,
                ..
            } => (String::new(), *set_index, *collection_index, true),
            UpsertKey::SetInstance {
                set_prefix,
                set_index,
                ..
            } => (set_prefix.clone(), *set_index, 0, true),
        };

        Self {
            project_id: key.project_id(),
            attribute_uri: key.attribute_uri().to_string(),
            set_prefix,
            set_index,
            collection_index,
            set_collection,
            text,
            created: now,
            updated: now,
        }
    }
}

/// What an upsert did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
    Unchanged,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_null() {
        assert!(MappedValue::from_json(Value::Null).is_null());
    }

    #[test]
    fn test_from_json_object_renders_compact_json() {
        let value = MappedValue::from_json(json!({"a": 1}));
        assert_eq!(value, MappedValue::Scalar(r#"{"a":1}"#.to_string()));
    }

    #[test]
    fn test_from_json_bool() {
        assert_eq!(
            MappedValue::from_json(json!(true)),
            MappedValue::Scalar("true".to_string())
        );
    }

    #[test]
    fn test_empty_list_stays_list() {
        assert_eq!(MappedValue::from_json(json!([])), MappedValue::List(vec![]));
    }

    #[test]
    fn test_scalar_key_ignores_collection_index() {
        let now = Utc::now();
        let mut row = StoredValue::from_key(
            &UpsertKey::CollectionItem {
                project_id: 1,
                attribute_uri: "urn:a".to_string(),
                set_index: 0,
                collection_index: 3,
            },
            "x".to_string(),
            now,
        );
        let key = UpsertKey::Scalar {
            project_id: 1,
            attribute_uri: "urn:a".to_string(),
            set_index: 0,
        };
        assert!(key.matches(&row));

        row.set_index = 1;
        assert!(!key.matches(&row));
    }

    #[test]
    fn test_set_instance_key_defaults() {
        let key = UpsertKey::SetInstance {
            project_id: 7,
            attribute_uri: "urn:b".to_string(),
            set_prefix: "2".to_string(),
            set_index: 4,
        };
        let row = StoredValue::from_key(&key, "v".to_string(), Utc::now());
        assert_eq!(row.set_prefix, "2");
        assert_eq!(row.set_index, 4);
        assert_eq!(row.collection_index, 0);
        assert!(row.set_collection);
        assert!(key.matches(&row));
    }

    #[test]
    fn test_handle_outcome_mapped() {
        let outcome = HandleOutcome::Errors(vec!["boom".to_string()]);
        assert!(outcome.mapped().is_none());

        let mut result = MappingResult::new();
        result.insert("urn:a".to_string(), MappedValue::Null);
        assert_eq!(HandleOutcome::Mapped(result).mapped().map(|r| r.len()), Some(1));
    }
}
