//! Form layout: which fields a table shows as columns and how they render.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Value;

/// Layout option naming a fixed header-cell width (any CSS length).
pub const OPTION_COLUMN_WIDTH: &str = "column-width";
/// Layout option naming the lookup group that supplies a select's choices.
pub const OPTION_PROVIDER: &str = "provider";

/// One field descriptor in a [`FormLayout`].
///
/// Leaf fields carry a `path` relative to one row's schema. Fields with
/// `children` are layout groups; only their leaves are written on save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Widget type understood by the field renderer (`text`, `select`, ...).
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Field>,
}

impl Field {
    /// Leaf field of the given widget type.
    #[must_use]
    pub fn new(kind: impl Into<String>, path: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            path: path.into(),
            label: label.into(),
            options: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn option_str(&self, name: &str) -> Option<&str> {
        self.options.get(name).and_then(Value::as_str)
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Field>) {
        if self.children.is_empty() {
            if !self.path.is_empty() {
                out.push(self);
            }
        } else {
            for child in &self.children {
                child.collect_leaves(out);
            }
        }
    }
}

/// Ordered list of columns for a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormLayout {
    pub children: Vec<Field>,
}

impl FormLayout {
    #[must_use]
    pub fn new(children: Vec<Field>) -> Self {
        Self { children }
    }

    /// Every leaf field, depth-first, including those nested in groups.
    #[must_use]
    pub fn all_fields(&self) -> Vec<&Field> {
        let mut out = Vec::new();
        for field in &self.children {
            field.collect_leaves(&mut out);
        }
        out
    }
}
