//! FILENAME: report-model/src/record.rs
//! PURPOSE: A data record from the driving cursor or a child row source.
//! CONTEXT: Records are opaque to the engine apart from field lookup by the
//! expression evaluator. They are shared by `Arc` once a run holds them.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use crate::value::Value;

/// A named-field record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: FxHashMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Record {
            fields: FxHashMap::default(),
        }
    }

    /// Builder-style field setter.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Record {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_lookup() {
        let record = Record::new().with("region", "E").with("amt", 10.0);
        assert_eq!(record.get("region"), Some(&Value::from("E")));
        assert_eq!(record.get("amt"), Some(&Value::Number(10.0)));
        assert!(record.get("missing").is_none());
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_collect_from_pairs() {
        let record: Record = vec![("a", 1.0), ("b", 2.0)].into_iter().collect();
        assert!(record.contains("a"));
        assert!(record.contains("b"));
    }
}
