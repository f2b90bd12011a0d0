use crate::value::{ConfigMap, ConfigValue, Number};
use thiserror::Error;

/// Maximum nesting depth accepted when loading a document. Documents are
/// organization-scale configs; anything deeper is adversarial input.
pub const MAX_DEPTH: usize = 128;

/// Errors raised while loading a configuration document. All are fatal to the
/// request and occur before any rule evaluation.
#[derive(Debug, Error)]
pub enum DocError {
    #[error("malformed document: {0}")]
    Syntax(#[from] serde_yaml::Error),

    #[error("mapping key is not a string (found {found})")]
    NonStringKey { found: &'static str },

    #[error("document nesting exceeds {MAX_DEPTH} levels")]
    TooDeep,
}

/// Parse a configuration document from YAML text. JSON is accepted as well
/// since it is a YAML subset.
pub fn parse_document(text: &str) -> Result<ConfigValue, DocError> {
    let raw: serde_yaml::Value = serde_yaml::from_str(text)?;
    from_yaml(raw, 0)
}

fn from_yaml(value: serde_yaml::Value, depth: usize) -> Result<ConfigValue, DocError> {
    if depth > MAX_DEPTH {
        return Err(DocError::TooDeep);
    }
    match value {
        serde_yaml::Value::Null => Ok(ConfigValue::Null),
        serde_yaml::Value::Bool(b) => Ok(ConfigValue::Bool(b)),
        serde_yaml::Value::Number(n) => Ok(ConfigValue::Number(convert_number(&n))),
        serde_yaml::Value::String(s) => Ok(ConfigValue::String(s)),
        serde_yaml::Value::Sequence(items) => {
            let converted = items
                .into_iter()
                .map(|item| from_yaml(item, depth + 1))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ConfigValue::Seq(converted))
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = ConfigMap::new();
            for (key, entry) in mapping {
                let key = yaml_key(&key)?;
                map.insert(key, from_yaml(entry, depth + 1)?);
            }
            Ok(ConfigValue::Map(map))
        }
        serde_yaml::Value::Tagged(tagged) => from_yaml(tagged.value, depth),
    }
}

fn yaml_key(key: &serde_yaml::Value) -> Result<String, DocError> {
    match key {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Null => Err(DocError::NonStringKey { found: "null" }),
        serde_yaml::Value::Bool(_) => Err(DocError::NonStringKey { found: "bool" }),
        serde_yaml::Value::Number(_) => Err(DocError::NonStringKey { found: "number" }),
        serde_yaml::Value::Sequence(_) => Err(DocError::NonStringKey { found: "sequence" }),
        serde_yaml::Value::Mapping(_) => Err(DocError::NonStringKey { found: "mapping" }),
        serde_yaml::Value::Tagged(_) => Err(DocError::NonStringKey { found: "tagged value" }),
    }
}

fn convert_number(n: &serde_yaml::Number) -> Number {
    if let Some(i) = n.as_i64() {
        Number::Int(i)
    } else {
        // u64 values above i64::MAX and actual floats both land here.
        Number::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}
