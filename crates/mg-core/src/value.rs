use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Owned value tree shared by templates, JSON documents and script bindings.
///
/// `Clone` produces a fully independent deep copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MgValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<MgValue>),
    Map(BTreeMap<String, MgValue>),
}

impl MgValue {
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, MgValue>> {
        match self {
            Self::Map(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut BTreeMap<String, MgValue>> {
        match self {
            Self::Map(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[MgValue]> {
        match self {
            Self::Array(values) => Some(values),
            _ => None,
        }
    }

    /// Field lookup on a map value; `None` for every other variant.
    pub fn get(&self, key: &str) -> Option<&MgValue> {
        self.as_map().and_then(|values| values.get(key))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
        }
    }
}

impl From<serde_json::Value> for MgValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(value) => Self::Bool(value),
            serde_json::Value::Number(value) => Self::Number(value.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(value) => Self::String(value),
            serde_json::Value::Array(values) => {
                Self::Array(values.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(values) => Self::Map(
                values
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for MgValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<f64> for MgValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for MgValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
