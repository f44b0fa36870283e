use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Live form values keyed by field name.
pub type DataModel = Map<String, Value>;

/// Immutable, cheaply clonable view of a [`DataModel`].
///
/// Predicates and the resolver only ever see snapshots, never the live model.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelSnapshot {
    values: Arc<DataModel>,
}

impl ModelSnapshot {
    pub fn new(values: DataModel) -> Self {
        Self {
            values: Arc::new(values),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Reads a nested value by dotted path (`city.0`) or JSON pointer (`/city/0`).
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let path = path.trim();
        if let Some(pointer) = path.strip_prefix('/') {
            let (head, rest) = match pointer.split_once('/') {
                Some((head, rest)) => (head, Some(rest)),
                None => (pointer, None),
            };
            let root = self.values.get(&decode_segment(head))?;
            return match rest {
                Some(rest) => root.pointer(&format!("/{rest}")),
                None => Some(root),
            };
        }

        if let Some(value) = self.values.get(path) {
            return Some(value);
        }
        let mut segments = path.split('.').filter(|segment| !segment.is_empty());
        let mut current = self.values.get(segments.next()?)?;
        for segment in segments {
            current = if let Ok(index) = segment.parse::<usize>() {
                current.get(index)?
            } else {
                current.get(segment)?
            };
        }
        Some(current)
    }

    pub fn as_map(&self) -> &DataModel {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.values.as_ref().clone())
    }

    /// Takes the values back, copying only if other snapshots still share them.
    pub fn into_model(self) -> DataModel {
        Arc::unwrap_or_clone(self.values)
    }
}

impl From<DataModel> for ModelSnapshot {
    fn from(values: DataModel) -> Self {
        Self::new(values)
    }
}

impl Serialize for ModelSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

fn decode_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot() -> ModelSnapshot {
        let value = json!({
            "hobby": 2,
            "city": ["湖北省", "武汉市"],
            "profile": { "name": "kim" }
        });
        ModelSnapshot::new(value.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn lookup_supports_dotted_paths_and_pointers() {
        let snapshot = snapshot();
        assert_eq!(snapshot.lookup("hobby"), Some(&json!(2)));
        assert_eq!(snapshot.lookup("city.1"), Some(&json!("武汉市")));
        assert_eq!(snapshot.lookup("/profile/name"), Some(&json!("kim")));
        assert_eq!(snapshot.lookup("profile.missing"), None);
        assert_eq!(snapshot.lookup(""), None);
    }

    #[test]
    fn exact_keys_win_over_dotted_paths() {
        let value = json!({ "user.name": "kim", "user": { "name": "lee" } });
        let snapshot = ModelSnapshot::new(value.as_object().cloned().unwrap_or_default());
        assert_eq!(snapshot.lookup("user.name"), Some(&json!("kim")));

        let nested = json!({ "user": { "name": "lee" } });
        let snapshot = ModelSnapshot::new(nested.as_object().cloned().unwrap_or_default());
        assert_eq!(snapshot.lookup("user.name"), Some(&json!("lee")));
    }

    #[test]
    fn clones_share_storage() {
        let first = snapshot();
        let second = first.clone();
        assert!(Arc::ptr_eq(&first.values, &second.values));
        let owned = second.into_model();
        assert_eq!(owned.len(), first.len());
    }
}
