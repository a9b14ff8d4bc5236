//! Plain key/value records exchanged with storage drivers and HTTP layers.

use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::value::Value;

/// An insertion-ordered mapping from field name to [`Value`].
///
/// Keys are unique. Inserting an existing key replaces its value in place, so
/// the original position is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace a field, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        self.entries.push((key, value));
        None
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// First field whose lowercased name equals the lowercased `key`.
    pub fn get_ignore_case(&self, key: &str) -> Option<&Value> {
        let wanted = key.to_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| k.to_lowercase() == wanted)
            .map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build a record from a JSON object.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        match json {
            serde_json::Value::Object(map) => Ok(map
                .into_iter()
                .map(|(k, v)| (k, Value::from_json(v)))
                .collect()),
            serde_json::Value::Null => Err(Error::NotAnObject("null")),
            serde_json::Value::Bool(_) => Err(Error::NotAnObject("bool")),
            serde_json::Value::Number(_) => Err(Error::NotAnObject("number")),
            serde_json::Value::String(_) => Err(Error::NotAnObject("string")),
            serde_json::Value::Array(_) => Err(Error::NotAnObject("array")),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }

    /// Flatten any serializable struct into a record.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self> {
        Self::from_json(serde_json::to_value(value)?)
    }

    /// Rebuild a typed struct from this record.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.to_json())?)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        Record::from_json(json).map_err(serde::de::Error::custom)
    }
}

/// Build a [`Record`] from `key => value` pairs.
///
/// ```
/// use ormbase_core::{record, Value};
///
/// let r = record! { "id" => 1, "name" => "Ann" };
/// assert_eq!(r.get("name"), Some(&Value::Text("Ann".to_string())));
/// ```
#[macro_export]
macro_rules! record {
    () => { $crate::Record::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::Record::new();
        $( record.insert($key, $value); )+
        record
    }};
}
