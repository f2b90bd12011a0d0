use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

/// One node of a configuration document.
///
/// Read-only once constructed. Mappings preserve insertion order so that
/// declaration-order contracts (job listings) hold.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Seq(Vec<ConfigValue>),
    Map(ConfigMap),
}

/// Scalar number, keeping integers distinct from floats so that values render
/// back the way they were written (`2`, not `2.0`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(x) => write!(f, "{x}"),
        }
    }
}

/// String-keyed mapping preserving insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigMap {
    entries: Vec<(String, ConfigValue)>,
}

impl ConfigMap {
    pub fn new() -> Self {
        ConfigMap::default()
    }

    /// Insert `value` under `key`. A repeated key replaces the earlier value
    /// in place, keeping the key's original position.
    pub fn insert(&mut self, key: String, value: ConfigValue) -> Option<ConfigValue> {
        for (existing, slot) in &mut self.entries {
            if *existing == key {
                return Some(std::mem::replace(slot, value));
            }
        }
        self.entries.push((key, value));
        None
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, ConfigValue)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (String, ConfigValue)>>(iter: I) -> Self {
        let mut map = ConfigMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            ConfigValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ConfigMap> {
        match self {
            ConfigValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    /// Human-readable type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Number(_) => "number",
            ConfigValue::String(_) => "string",
            ConfigValue::Seq(_) => "sequence",
            ConfigValue::Map(_) => "mapping",
        }
    }

    /// Convert into a JSON value, e.g. for embedding the input document in an
    /// audit record. Non-finite floats become null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ConfigValue::Null => serde_json::Value::Null,
            ConfigValue::Bool(b) => serde_json::Value::Bool(*b),
            ConfigValue::Number(Number::Int(i)) => serde_json::Value::from(*i),
            ConfigValue::Number(Number::Float(x)) => serde_json::Number::from_f64(*x)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ConfigValue::String(s) => serde_json::Value::String(s.clone()),
            ConfigValue::Seq(items) => {
                serde_json::Value::Array(items.iter().map(ConfigValue::to_json).collect())
            }
            ConfigValue::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigValue::Null => serializer.serialize_unit(),
            ConfigValue::Bool(b) => serializer.serialize_bool(*b),
            ConfigValue::Number(Number::Int(i)) => serializer.serialize_i64(*i),
            ConfigValue::Number(Number::Float(x)) => serializer.serialize_f64(*x),
            ConfigValue::String(s) => serializer.serialize_str(s),
            ConfigValue::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ConfigValue::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map.iter() {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_preserves_insertion_order() {
        let mut map = ConfigMap::new();
        map.insert("zeta".to_string(), ConfigValue::Null);
        map.insert("alpha".to_string(), ConfigValue::Null);
        map.insert("mid".to_string(), ConfigValue::Null);

        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn repeated_insert_replaces_in_place() {
        let mut map = ConfigMap::new();
        map.insert("a".to_string(), ConfigValue::Bool(false));
        map.insert("b".to_string(), ConfigValue::Null);
        let previous = map.insert("a".to_string(), ConfigValue::Bool(true));

        assert_eq!(previous, Some(ConfigValue::Bool(false)));
        assert_eq!(map.len(), 2);
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(map.get("a"), Some(&ConfigValue::Bool(true)));
    }

    #[test]
    fn numbers_render_without_spurious_fraction() {
        assert_eq!(Number::Int(2).to_string(), "2");
        assert_eq!(Number::Float(1.9).to_string(), "1.9");
        assert_eq!(Number::Float(2.0).to_string(), "2");
    }

    #[test]
    fn to_json_mirrors_structure() {
        let doc = ConfigValue::Map(ConfigMap::from_iter([
            (
                "version".to_string(),
                ConfigValue::Number(Number::Float(2.1)),
            ),
            (
                "jobs".to_string(),
                ConfigValue::Seq(vec![ConfigValue::String("build".to_string())]),
            ),
        ]));

        assert_eq!(
            doc.to_json(),
            serde_json::json!({"version": 2.1, "jobs": ["build"]})
        );
    }

    #[test]
    fn serialize_matches_to_json() {
        let doc = ConfigValue::Map(ConfigMap::from_iter([(
            "n".to_string(),
            ConfigValue::Number(Number::Int(7)),
        )]));
        let direct = serde_json::to_value(&doc).expect("serialize");
        assert_eq!(direct, doc.to_json());
    }
}
