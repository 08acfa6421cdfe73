//! # Configuration Document
//!
//! A strain file parsed into a JSON value tree.
//!
//! YAML has a richer type system than JSON (tags, anchors, non-string keys),
//! but strain files only use the JSON-compatible subset. Converting once at
//! load time lets the schema stage hand the tree straight to `jsonschema`
//! and lets every other stage use `serde_json::Value` accessors.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::StrainError;

/// A parsed strain configuration. The root is always a mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct StrainDocument {
    origin: String,
    root: Map<String, Value>,
}

impl StrainDocument {
    /// Read and parse a strain file.
    ///
    /// # Errors
    ///
    /// Returns [`StrainError::Read`] if the file cannot be read and
    /// [`StrainError::Parse`] if it is not YAML or its root is not a mapping.
    pub fn load(path: &Path) -> Result<Self, StrainError> {
        let content = std::fs::read_to_string(path).map_err(|source| StrainError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse strain YAML held in memory. `origin` labels diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`StrainError::Parse`] on malformed YAML or a non-mapping root.
    pub fn parse(content: &str, origin: &str) -> Result<Self, StrainError> {
        let parse_err = |reason: String| StrainError::Parse {
            path: origin.to_string(),
            reason,
        };

        let yaml: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| parse_err(e.to_string()))?;
        match yaml_to_json_value(&yaml).map_err(parse_err)? {
            Value::Object(root) => Ok(Self {
                origin: origin.to_string(),
                root,
            }),
            other => Err(parse_err(format!(
                "document root must be a mapping, found {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Where the document came from (file path or test label).
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Look up a top-level key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// Look up a top-level key holding a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.root.get(key).and_then(Value::as_str)
    }

    /// Whether a top-level key is present (even if its value is null).
    pub fn contains(&self, key: &str) -> bool {
        self.root.contains_key(key)
    }

    /// All top-level keys, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.root.keys().map(String::as_str)
    }

    /// The root mapping as a JSON object value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }
}

/// Short name of a JSON value's type, for diagnostics.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent {f} as a JSON number"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported mapping key: {other:?}")),
                };
                out.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(out))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
