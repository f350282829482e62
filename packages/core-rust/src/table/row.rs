//! Per-row rendering in view, edit, and add submodes.

use crate::capability::Capabilities;
use crate::html::{Element as Html, Node};
use crate::layout::FormLayout;
use crate::render::{FieldRenderer, IconProvider, LookupProvider, RenderError};
use crate::schema::Schema;
use crate::types::Value;

const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this row?";

/// Builds the literal action URLs the table links to.
///
/// Every URL is the target URL with at most one action parameter appended,
/// so hosts can route on the exact strings.
#[derive(Debug, Clone, Copy)]
pub struct ActionUrls<'u> {
    target: &'u str,
}

impl<'u> ActionUrls<'u> {
    #[must_use]
    pub fn new(target: &'u str) -> Self {
        Self { target }
    }

    /// Plain target URL; used by cancel buttons.
    #[must_use]
    pub fn view(&self) -> &'u str {
        self.target
    }

    #[must_use]
    pub fn add(&self) -> String {
        format!("{}?add=true", self.target)
    }

    #[must_use]
    pub fn edit(&self, row: usize) -> String {
        format!("{}?edit={row}", self.target)
    }

    /// Edit URL that also asks for focus on `column`. Column 0 is the
    /// default focus and produces the plain edit URL.
    #[must_use]
    pub fn edit_focus(&self, row: usize, column: usize) -> String {
        if column == 0 {
            self.edit(row)
        } else {
            format!("{}?edit={row}&focus={column}", self.target)
        }
    }

    #[must_use]
    pub fn delete(&self, row: usize) -> String {
        format!("{}?delete={row}", self.target)
    }
}

pub(super) struct RowRenderer<'r> {
    pub layout: &'r FormLayout,
    pub row_schema: &'r Schema,
    pub renderer: &'r dyn FieldRenderer,
    pub lookup: Option<&'r dyn LookupProvider>,
    pub icons: &'r dyn IconProvider,
    pub urls: &'r ActionUrls<'r>,
    pub caps: Capabilities,
}

impl RowRenderer<'_> {
    fn cell_width(&self) -> String {
        format!("width:calc(100% / {})", self.layout.children.len())
    }

    /// Read-only row with edit and delete triggers as permitted.
    pub fn view_row(&self, index: usize, value: &Value) -> Result<Html, RenderError> {
        let width = self.cell_width();
        let mut row = Html::new("tr").class("grid-row hover-trigger");

        for (column, field) in self.layout.children.iter().enumerate() {
            let mut cell = Html::new("td").class("grid-cell").style(width.as_str());
            if self.caps.can_edit {
                cell = cell
                    .data("hx-get", self.urls.edit_focus(index, column))
                    .data("hx-trigger", "click");
            }
            let content = self
                .renderer
                .render_view(field, self.row_schema, self.lookup, value)?;
            row.push(cell.child(content));
        }

        let mut controls = Html::new("td").class("grid-cell grid-controls");

        if self.caps.can_edit {
            controls.push(
                Html::new("button")
                    .attr("type", "button")
                    .data("hx-get", self.urls.edit(index))
                    .raw(self.icons.get("edit")),
            );
        }

        if self.caps.can_delete {
            if self.caps.can_edit {
                controls.push(Node::text(" "));
            }
            controls.push(
                Html::new("button")
                    .attr("type", "button")
                    .data("hx-post", self.urls.delete(index))
                    .data("hx-confirm", DELETE_CONFIRMATION)
                    .raw(self.icons.get("delete")),
            );
        }

        row.push(controls);
        Ok(row)
    }

    /// Editable row for an existing record. `focus` names the column that
    /// takes initial input focus; it is handed to that one field only.
    pub fn edit_row(&self, value: &Value, focus: usize) -> Result<Html, RenderError> {
        let width = self.cell_width();
        let mut row = Html::new("tr").class("grid-row grid-editable");

        for (column, field) in self.layout.children.iter().enumerate() {
            let content = self.renderer.render_edit(
                field,
                self.row_schema,
                self.lookup,
                value,
                column == focus,
            )?;
            row.push(
                Html::new("td")
                    .class("grid-cell grid-editable")
                    .style(width.as_str())
                    .child(content),
            );
        }

        row.push(
            Html::new("td")
                .class("grid-cell grid-editable grid-controls")
                .child(
                    Html::new("button")
                        .attr("type", "submit")
                        .class("text-green")
                        .raw(self.icons.get("save")),
                )
                .text(" ")
                .child(
                    Html::new("button")
                        .attr("type", "button")
                        .data("hx-get", self.urls.view())
                        .raw(self.icons.get("cancel")),
                ),
        );

        Ok(row)
    }

    /// Editable row for a record that does not exist yet.
    pub fn add_row(&self, focus: usize) -> Result<Html, RenderError> {
        self.edit_row(&Value::Null, focus)
    }
}
