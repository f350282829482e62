//! Rendering collaborators consumed by the table widget.
//!
//! The widget never draws a cell itself: each field goes through a
//! [`FieldRenderer`], icons come from an [`IconProvider`], and select choices
//! may come from a [`LookupProvider`]. [`StandardFieldRenderer`] covers the
//! usual form widgets.

use std::fmt;

use crate::html::{Element as Html, Node};
use crate::layout::{Field, OPTION_PROVIDER};
use crate::schema::{Element, PathError, PathResolver, Schema};
use crate::types::Value;

/// Errors raised while rendering a single field.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("field {path:?}: {source}")]
    Path {
        path: String,
        #[source]
        source: PathError,
    },
    #[error("field {path:?}: unsupported field type {kind:?}")]
    UnsupportedKind { path: String, kind: String },
}

/// One selectable choice offered by a [`LookupProvider`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LookupCode {
    pub value: String,
    pub label: String,
}

impl LookupCode {
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Supplies named groups of choices for select fields.
pub trait LookupProvider {
    /// Returns the choices in `group`, or `None` if the group is unknown.
    fn lookup_group(&self, group: &str) -> Option<Vec<LookupCode>>;
}

/// Returns HTML snippets for the table's action icons.
///
/// The widget asks for `plus`, `edit`, `delete`, `save` and `cancel`.
pub trait IconProvider {
    fn get(&self, name: &str) -> String;

    /// Writes the icon for `name` into `out`.
    ///
    /// # Errors
    ///
    /// Propagates failures of the underlying writer.
    fn write(&self, name: &str, out: &mut dyn fmt::Write) -> fmt::Result {
        out.write_str(&self.get(name))
    }
}

/// Renders one layout field against one row.
pub trait FieldRenderer {
    /// Read-only rendering of `field` for `row_value`.
    ///
    /// # Errors
    ///
    /// Fails when the field cannot be resolved or rendered.
    fn render_view(
        &self,
        field: &Field,
        row_schema: &Schema,
        lookup: Option<&dyn LookupProvider>,
        row_value: &Value,
    ) -> Result<Node, RenderError>;

    /// Editable rendering of `field` for `row_value`. `focus` asks the widget
    /// to take initial input focus.
    ///
    /// # Errors
    ///
    /// Fails when the field cannot be resolved or rendered.
    fn render_edit(
        &self,
        field: &Field,
        row_schema: &Schema,
        lookup: Option<&dyn LookupProvider>,
        row_value: &Value,
        focus: bool,
    ) -> Result<Node, RenderError>;
}

/// Renders `text`, `textarea`, `number`, `select` and `checkbox` fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFieldRenderer;

impl StandardFieldRenderer {
    fn resolve<'s, 'v>(
        field: &Field,
        row_schema: &'s Schema,
        row_value: &'v Value,
    ) -> Result<(&'s Element, Option<&'v Value>), RenderError> {
        let wrap = |source| RenderError::Path {
            path: field.path.clone(),
            source,
        };
        let element = row_schema.describe(&field.path).map_err(wrap)?;
        let value = row_schema.get(row_value, &field.path).map_err(wrap)?;
        Ok((element, value))
    }

    fn choices(
        field: &Field,
        element: &Element,
        lookup: Option<&dyn LookupProvider>,
    ) -> Vec<LookupCode> {
        if let (Some(group), Some(provider)) = (field.option_str(OPTION_PROVIDER), lookup) {
            if let Some(codes) = provider.lookup_group(group) {
                return codes;
            }
        }

        match element {
            Element::String { enum_values, .. } => enum_values
                .iter()
                .map(|v| LookupCode::new(v.as_str(), v.as_str()))
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl FieldRenderer for StandardFieldRenderer {
    fn render_view(
        &self,
        field: &Field,
        row_schema: &Schema,
        lookup: Option<&dyn LookupProvider>,
        row_value: &Value,
    ) -> Result<Node, RenderError> {
        let (element, value) = Self::resolve(field, row_schema, row_value)?;
        let text = value.map(Value::display_string).unwrap_or_default();

        if field.kind == "select" {
            let label = Self::choices(field, element, lookup)
                .into_iter()
                .find(|code| code.value == text)
                .map_or(text, |code| code.label);
            return Ok(Node::Text(label));
        }

        Ok(Node::Text(text))
    }

    fn render_edit(
        &self,
        field: &Field,
        row_schema: &Schema,
        lookup: Option<&dyn LookupProvider>,
        row_value: &Value,
        focus: bool,
    ) -> Result<Node, RenderError> {
        let (element, value) = Self::resolve(field, row_schema, row_value)?;
        let text = value.map(Value::display_string).unwrap_or_default();

        let widget = match field.kind.as_str() {
            "text" | "number" => {
                let mut input = Html::new("input")
                    .attr("type", field.kind.as_str())
                    .attr("name", field.path.as_str())
                    .attr("value", text);
                if let Element::String { max_length, .. } = element {
                    if *max_length > 0 {
                        input = input.attr("maxlength", max_length.to_string());
                    }
                }
                input
            }
            "textarea" => Html::new("textarea")
                .attr("name", field.path.as_str())
                .text(text),
            "select" => {
                let options = Self::choices(field, element, lookup).into_iter().map(|code| {
                    let selected = code.value == text;
                    Node::from(
                        Html::new("option")
                            .attr("value", code.value)
                            .flag_if("selected", selected)
                            .text(code.label),
                    )
                });
                Html::new("select")
                    .attr("name", field.path.as_str())
                    .children(options)
            }
            "checkbox" => Html::new("input")
                .attr("type", "checkbox")
                .attr("name", field.path.as_str())
                .attr("value", "true")
                .flag_if("checked", value == Some(&Value::Bool(true))),
            other => {
                return Err(RenderError::UnsupportedKind {
                    path: field.path.clone(),
                    kind: other.to_string(),
                })
            }
        };

        Ok(widget.flag_if("autofocus", focus).into())
    }
}
