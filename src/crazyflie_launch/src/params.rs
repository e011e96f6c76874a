//! Typed parameter values and parameter namespace handling

use crate::{
    error::{ParseError, Result},
    substitution::context::join_name,
};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;

/// Parameter namespace keyed by fully-resolved name
pub type ParamTree = BTreeMap<String, ParamValue>;

/// A parameter value as handed to the node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(String),
    List(Vec<ParamValue>),
    Map(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value, ints widen to floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(n) => Some(*n as f64),
            ParamValue::Double(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Infer a value from untyped text: bool, then int, then double, then string
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_lowercase().as_str() {
            "true" => return ParamValue::Bool(true),
            "false" => return ParamValue::Bool(false),
            _ => {}
        }

        if let Ok(n) = trimmed.parse::<i64>() {
            return ParamValue::Int(n);
        }
        if let Ok(n) = trimmed.parse::<f64>() {
            return ParamValue::Double(n);
        }

        ParamValue::Str(raw.to_string())
    }

    /// Coerce text to a value of an explicit `type`, or infer when none is given
    pub fn coerce(name: &str, raw: &str, param_type: Option<ParamType>) -> Result<Self> {
        let mismatch = |expected_type: &'static str| ParseError::TypeCoercion {
            attribute: name.to_string(),
            value: raw.to_string(),
            expected_type,
        };

        match param_type {
            None => Ok(Self::infer(raw)),
            Some(ParamType::Str) => Ok(ParamValue::Str(raw.to_string())),
            Some(ParamType::Int) => raw
                .trim()
                .parse::<i64>()
                .map(ParamValue::Int)
                .map_err(|_| mismatch("int")),
            Some(ParamType::Double) => raw
                .trim()
                .parse::<f64>()
                .map(ParamValue::Double)
                .map_err(|_| mismatch("double")),
            Some(ParamType::Bool) => match raw.trim().to_lowercase().as_str() {
                "true" => Ok(ParamValue::Bool(true)),
                "false" => Ok(ParamValue::Bool(false)),
                _ => Err(mismatch("bool")),
            },
            Some(ParamType::Yaml) => {
                let yaml: Value = serde_yaml::from_str(raw)?;
                Ok(Self::from_yaml(&yaml))
            }
        }
    }

    /// Structural conversion from YAML
    pub fn from_yaml(value: &Value) -> Self {
        match value {
            Value::Null => ParamValue::Str(String::new()),
            Value::Bool(b) => ParamValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ParamValue::Int(i),
                None => ParamValue::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => ParamValue::Str(s.clone()),
            Value::Sequence(seq) => ParamValue::List(seq.iter().map(Self::from_yaml).collect()),
            Value::Mapping(map) => ParamValue::Map(
                map.iter()
                    .map(|(k, v)| (yaml_key(k), Self::from_yaml(v)))
                    .collect(),
            ),
            Value::Tagged(tagged) => Self::from_yaml(&tagged.value),
        }
    }
}

fn yaml_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

/// Explicit `type` attribute of a `<param>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Str,
    Int,
    Double,
    Bool,
    Yaml,
}

impl std::str::FromStr for ParamType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "str" | "string" => Ok(ParamType::Str),
            "int" => Ok(ParamType::Int),
            "double" | "float" => Ok(ParamType::Double),
            "bool" | "boolean" => Ok(ParamType::Bool),
            "yaml" => Ok(ParamType::Yaml),
            other => Err(format!("unknown param type '{}'", other)),
        }
    }
}

/// Resolve a parameter name against a namespace and, for `~name`, a node
///
/// `node_fqn` is the fully-qualified node name private names attach to.
pub fn resolve_name(name: &str, namespace: &str, node_fqn: Option<&str>) -> String {
    let resolved = if name.starts_with('/') {
        name.to_string()
    } else if let Some(private) = name.strip_prefix('~') {
        join_name(node_fqn.unwrap_or(namespace), private)
    } else {
        join_name(namespace, name)
    };
    normalize_name(&resolved)
}

/// Collapse repeated slashes and drop a trailing slash
fn normalize_name(name: &str) -> String {
    let parts: Vec<&str> = name.split('/').filter(|p| !p.is_empty()).collect();
    format!("/{}", parts.join("/"))
}

/// Place a value into the tree, flattening mappings into nested names
///
/// Returns the names that were set, in order.
pub fn insert_value(tree: &mut ParamTree, name: &str, value: ParamValue) -> Vec<String> {
    let mut inserted = Vec::new();
    insert_recursive(tree, name, value, &mut inserted);
    inserted
}

fn insert_recursive(tree: &mut ParamTree, name: &str, value: ParamValue, out: &mut Vec<String>) {
    match value {
        ParamValue::Map(map) if !map.is_empty() => {
            for (key, nested) in map {
                insert_recursive(tree, &join_name(name, &key), nested, out);
            }
        }
        other => {
            tree.insert(name.to_string(), other);
            out.push(name.to_string());
        }
    }
}

/// Remove a name and everything beneath it
pub fn delete_name(tree: &mut ParamTree, name: &str) -> usize {
    let prefix = format!("{}/", name.trim_end_matches('/'));
    let before = tree.len();
    tree.retain(|key, _| key != name && !key.starts_with(&prefix));
    before - tree.len()
}

/// Strip the smallest common indentation from an inline YAML body
pub(crate) fn dedent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    text.lines()
        .map(|line| line.get(indent..).unwrap_or_else(|| line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}
