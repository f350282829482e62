//! Schema tree and dot-path resolution over [`Value`] trees.
//!
//! A [`Schema`] wraps a root [`Element`]. Every path handed to the
//! [`PathResolver`] methods is interpreted against that tree: object elements
//! are traversed by property name, array elements by decimal index. The data
//! being addressed must keep the same shape as the schema or resolution fails.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Value;

/// Errors raised while resolving a path against a schema or its data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("unknown property {segment:?}")]
    UnknownProperty { segment: String },
    #[error("array index {segment:?} is not a non-negative integer")]
    InvalidIndex { segment: String },
    #[error("cannot descend into {kind} element at {segment:?}")]
    NotTraversable { segment: String, kind: &'static str },
    #[error("index {index} is out of range for array of length {length}")]
    IndexOutOfRange { index: usize, length: usize },
    #[error("schema expects {expected} but data holds {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid value for {expected}: {reason}")]
    InvalidValue {
        expected: &'static str,
        reason: String,
    },
    #[error("element at {path:?} is {kind}, not an array")]
    NotAnArray { path: String, kind: &'static str },
}

/// A node in the schema tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Element {
    Object {
        #[serde(default)]
        properties: BTreeMap<String, Element>,
    },
    Array {
        items: Box<Element>,
        /// Minimum number of items. 0 means no lower bound.
        #[serde(default, rename = "minLength")]
        min_length: usize,
        /// Maximum number of items. 0 means unbounded.
        #[serde(default, rename = "maxLength")]
        max_length: usize,
    },
    String {
        /// Maximum length in characters. 0 means unbounded.
        #[serde(default, rename = "maxLength")]
        max_length: usize,
        /// Allowed values, offered as choices by select fields.
        #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
        enum_values: Vec<String>,
    },
    Integer,
    Number,
    Boolean,
}

impl Element {
    /// Object element built from `(name, element)` pairs.
    #[must_use]
    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, Element)>,
        K: Into<String>,
    {
        Self::Object {
            properties: properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Array element with the given item element and bounds (0 = none).
    #[must_use]
    pub fn array(items: Element, min_length: usize, max_length: usize) -> Self {
        Self::Array {
            items: Box::new(items),
            min_length,
            max_length,
        }
    }

    /// Unbounded string element.
    #[must_use]
    pub fn string() -> Self {
        Self::String {
            max_length: 0,
            enum_values: Vec::new(),
        }
    }

    /// String element restricted to the given choices.
    #[must_use]
    pub fn string_enum<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::String {
            max_length: 0,
            enum_values: values.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Object { .. } => "object",
            Self::Array { .. } => "array",
            Self::String { .. } => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    /// Value written when a field is posted without data.
    #[must_use]
    pub fn zero_value(&self) -> Value {
        match self {
            Self::Object { .. } => Value::Map(BTreeMap::new()),
            Self::Array { .. } => Value::Array(Vec::new()),
            Self::String { .. } => Value::String(String::new()),
            Self::Integer => Value::Int(0),
            Self::Number => Value::Float(0.0),
            Self::Boolean => Value::Bool(false),
        }
    }

    /// Child element addressed by a single path segment.
    fn child(&self, segment: &str) -> Result<&Element, PathError> {
        match self {
            Self::Object { properties } => {
                properties
                    .get(segment)
                    .ok_or_else(|| PathError::UnknownProperty {
                        segment: segment.to_string(),
                    })
            }
            Self::Array { items, .. } => {
                parse_index(segment)?;
                Ok(items.as_ref())
            }
            other => Err(PathError::NotTraversable {
                segment: segment.to_string(),
                kind: other.kind_name(),
            }),
        }
    }

    /// Converts an incoming value to this element's kind.
    ///
    /// Form posts deliver every field as a string, so strings are parsed into
    /// numbers and booleans here. `Null` becomes the kind's zero value.
    pub fn coerce(&self, value: Value) -> Result<Value, PathError> {
        if value.is_null() {
            return Ok(self.zero_value());
        }

        match self {
            Self::String { max_length, .. } => {
                let text = match value {
                    Value::String(s) => s,
                    Value::Bool(_) | Value::Int(_) | Value::Float(_) => value.to_string(),
                    other => return Err(mismatch(self, &other)),
                };
                let chars = text.chars().count();
                if *max_length > 0 && chars > *max_length {
                    return Err(PathError::InvalidValue {
                        expected: "string",
                        reason: format!("{chars} characters exceeds maximum of {max_length}"),
                    });
                }
                Ok(Value::String(text))
            }
            Self::Integer => match value {
                Value::Int(i) => Ok(Value::Int(i)),
                #[allow(clippy::cast_possible_truncation)]
                Value::Float(x) if x.fract() == 0.0 => Ok(Value::Int(x as i64)),
                Value::String(s) if s.trim().is_empty() => Ok(Value::Int(0)),
                Value::String(s) => s.trim().parse().map(Value::Int).map_err(|_| {
                    PathError::InvalidValue {
                        expected: "integer",
                        reason: format!("{s:?} is not an integer"),
                    }
                }),
                other => Err(mismatch(self, &other)),
            },
            Self::Number => match value {
                #[allow(clippy::cast_precision_loss)]
                Value::Int(i) => Ok(Value::Float(i as f64)),
                Value::Float(x) => Ok(Value::Float(x)),
                Value::String(s) if s.trim().is_empty() => Ok(Value::Float(0.0)),
                Value::String(s) => s.trim().parse().map(Value::Float).map_err(|_| {
                    PathError::InvalidValue {
                        expected: "number",
                        reason: format!("{s:?} is not a number"),
                    }
                }),
                other => Err(mismatch(self, &other)),
            },
            Self::Boolean => match value {
                Value::Bool(b) => Ok(Value::Bool(b)),
                Value::String(s) => match s.as_str() {
                    "true" | "on" | "1" => Ok(Value::Bool(true)),
                    "" | "false" | "off" | "0" => Ok(Value::Bool(false)),
                    _ => Err(PathError::InvalidValue {
                        expected: "boolean",
                        reason: format!("{s:?} is not a boolean"),
                    }),
                },
                other => Err(mismatch(self, &other)),
            },
            Self::Object { .. } => match value {
                Value::Map(map) => Ok(Value::Map(map)),
                other => Err(mismatch(self, &other)),
            },
            Self::Array { .. } => match value {
                Value::Array(items) => Ok(Value::Array(items)),
                other => Err(mismatch(self, &other)),
            },
        }
    }
}

/// Bounds and item schema of an array element.
#[derive(Debug, Clone, Copy)]
pub struct ArrayDescriptor<'s> {
    pub items: &'s Element,
    pub min_length: usize,
    /// 0 means unbounded.
    pub max_length: usize,
}

/// Dynamic get/set/remove/describe over a schema-tagged value tree.
///
/// Paths are dot-delimited strings relative to the resolver's root. The empty
/// path addresses the root itself.
pub trait PathResolver {
    /// Reads the value at `path`.
    ///
    /// Returns `Ok(None)` when the path is valid for the schema but the data
    /// has nothing there yet.
    ///
    /// # Errors
    ///
    /// Fails when the path does not fit the schema, or the data found along the
    /// way has a different kind than the schema declares.
    fn get<'v>(&self, object: &'v Value, path: &str) -> Result<Option<&'v Value>, PathError>;

    /// Returns the schema element at `path`.
    ///
    /// # Errors
    ///
    /// Fails when the path does not fit the schema.
    fn describe(&self, path: &str) -> Result<&Element, PathError>;

    /// Writes `value` at `path`, creating missing containers along the way.
    ///
    /// # Errors
    ///
    /// Fails on schema violations, out-of-range indexes, or values that cannot
    /// be coerced to the target element's kind.
    fn set(&self, object: &mut Value, path: &str, value: Value) -> Result<(), PathError>;

    /// Removes the array item or map entry at `path`. Returns `false` when
    /// nothing was removed.
    fn remove(&self, object: &mut Value, path: &str) -> bool;

    /// Describes the array element at `path`.
    ///
    /// # Errors
    ///
    /// Fails when the path does not resolve or addresses a non-array element.
    fn describe_array(&self, path: &str) -> Result<ArrayDescriptor<'_>, PathError> {
        match self.describe(path)? {
            Element::Array {
                items,
                min_length,
                max_length,
            } => Ok(ArrayDescriptor {
                items,
                min_length: *min_length,
                max_length: *max_length,
            }),
            other => Err(PathError::NotAnArray {
                path: path.to_string(),
                kind: other.kind_name(),
            }),
        }
    }
}

/// A schema: the root of an [`Element`] tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    pub root: Element,
}

impl Schema {
    #[must_use]
    pub fn new(root: Element) -> Self {
        Self { root }
    }
}

impl PathResolver for Schema {
    fn get<'v>(&self, object: &'v Value, path: &str) -> Result<Option<&'v Value>, PathError> {
        get_in(&self.root, object, &split_path(path))
    }

    fn describe(&self, path: &str) -> Result<&Element, PathError> {
        split_path(path)
            .into_iter()
            .try_fold(&self.root, |element, segment| element.child(segment))
    }

    fn set(&self, object: &mut Value, path: &str, value: Value) -> Result<(), PathError> {
        set_in(&self.root, object, &split_path(path), value)
    }

    fn remove(&self, object: &mut Value, path: &str) -> bool {
        let segments = split_path(path);
        let Some((last, parents)) = segments.split_last() else {
            return false;
        };
        remove_in(&self.root, object, parents, last)
    }
}

/// Joins path segments with `.`, skipping empty ones.
#[must_use]
pub fn join_path(segments: &[&str]) -> String {
    segments
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(".")
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('.').filter(|s| !s.is_empty()).collect()
}

fn parse_index(segment: &str) -> Result<usize, PathError> {
    if !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PathError::InvalidIndex {
            segment: segment.to_string(),
        });
    }
    segment.parse().map_err(|_| PathError::InvalidIndex {
        segment: segment.to_string(),
    })
}

fn mismatch(element: &Element, found: &Value) -> PathError {
    PathError::TypeMismatch {
        expected: element.kind_name(),
        found: found.kind_name(),
    }
}

fn get_in<'v>(
    element: &Element,
    value: &'v Value,
    segments: &[&str],
) -> Result<Option<&'v Value>, PathError> {
    let Some((segment, rest)) = segments.split_first() else {
        return Ok(Some(value));
    };

    let child_element = element.child(segment)?;

    let child_value = match (element, value) {
        (_, Value::Null) => None,
        (Element::Object { .. }, Value::Map(map)) => map.get(*segment),
        (Element::Array { .. }, Value::Array(items)) => items.get(parse_index(segment)?),
        (_, other) => return Err(mismatch(element, other)),
    };

    match child_value {
        Some(child) => get_in(child_element, child, rest),
        // Keep validating the remaining path against the schema.
        None => rest
            .iter()
            .try_fold(child_element, |e, s| e.child(s))
            .map(|_| None),
    }
}

fn set_in(
    element: &Element,
    slot: &mut Value,
    segments: &[&str],
    value: Value,
) -> Result<(), PathError> {
    let Some((segment, rest)) = segments.split_first() else {
        *slot = element.coerce(value)?;
        return Ok(());
    };

    let child_element = element.child(segment)?;

    if slot.is_null() {
        *slot = element.zero_value();
    }

    match (element, slot) {
        (Element::Object { .. }, Value::Map(map)) => {
            let child = map.entry((*segment).to_string()).or_insert(Value::Null);
            set_in(child_element, child, rest, value)
        }
        (Element::Array { max_length, .. }, Value::Array(items)) => {
            let index = parse_index(segment)?;
            let length = items.len();

            if index < length {
                return set_in(child_element, &mut items[index], rest, value);
            }

            if index > length {
                return Err(PathError::IndexOutOfRange { index, length });
            }

            if *max_length > 0 && length >= *max_length {
                return Err(PathError::InvalidValue {
                    expected: "array",
                    reason: format!("cannot grow beyond maximum length {max_length}"),
                });
            }

            items.push(Value::Null);
            let result = set_in(child_element, &mut items[index], rest, value);
            if result.is_err() {
                items.pop();
            }
            result
        }
        (_, other) => Err(mismatch(element, other)),
    }
}

fn remove_in(element: &Element, slot: &mut Value, parents: &[&str], last: &str) -> bool {
    if let Some((segment, rest)) = parents.split_first() {
        let Ok(child_element) = element.child(segment) else {
            return false;
        };
        let child = match (element, slot) {
            (Element::Object { .. }, Value::Map(map)) => map.get_mut(*segment),
            (Element::Array { .. }, Value::Array(items)) => match parse_index(segment) {
                Ok(index) => items.get_mut(index),
                Err(_) => None,
            },
            _ => None,
        };
        return child.is_some_and(|c| remove_in(child_element, c, rest, last));
    }

    match (element, slot) {
        (Element::Object { properties }, Value::Map(map)) => {
            properties.contains_key(last) && map.remove(last).is_some()
        }
        (Element::Array { .. }, Value::Array(items)) => match parse_index(last) {
            Ok(index) if index < items.len() => {
                items.remove(index);
                true
            }
            _ => false,
        },
        _ => false,
    }
}
