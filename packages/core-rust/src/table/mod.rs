//! The table widget: renders a schema-bound collection as an editable grid.
//!
//! A [`TableWidget`] is built per request around a borrowed data object. Each
//! draw or mutation re-reads the collection length, recomputes effective
//! [`Capabilities`](crate::capability::Capabilities) from the schema bounds,
//! and only then decides what to render or whether to write.
//!
//! Rendering works in three states:
//!
//! - `View`: read-only rows with edit/delete triggers and an add trigger
//! - `AddRow`: all rows read-only plus an empty editable row at the end
//! - `EditRow(i)`: row `i` editable, every other row read-only

mod mutation;
mod row;

pub use mutation::FormData;
pub use row::ActionUrls;

use std::fmt;

use tracing::debug;

use crate::capability::{self, Capabilities};
use crate::error::TableError;
use crate::html::{Element as Html, Node};
use crate::layout::{FormLayout, OPTION_COLUMN_WIDTH};
use crate::render::{FieldRenderer, IconProvider, LookupProvider};
use crate::request::{QueryParams, RenderIntent, RenderRequest};
use crate::schema::{ArrayDescriptor, PathResolver, Schema};
use crate::types::Value;

use row::RowRenderer;

/// Render state after the requested intent has been checked against the
/// effective capabilities and the current length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    View,
    AddRow,
    EditRow(usize),
}

impl RenderState {
    /// Validates `intent`, falling back to `View` when it cannot be honoured.
    #[must_use]
    pub fn select(intent: RenderIntent, caps: Capabilities, length: usize) -> Self {
        match intent {
            RenderIntent::View => Self::View,
            RenderIntent::Add if caps.can_add => Self::AddRow,
            RenderIntent::Add => {
                debug!(length, "add requested but not allowed, rendering view");
                Self::View
            }
            RenderIntent::Edit(index) => match usize::try_from(index) {
                Ok(row) if caps.can_edit && row < length => Self::EditRow(row),
                _ => {
                    debug!(index, length, can_edit = caps.can_edit, "edit request rejected, rendering view");
                    Self::View
                }
            },
        }
    }
}

/// Schema-bound CRUD table over one array inside a borrowed data object.
///
/// Capabilities start fully open and are narrowed with the `allow_*`
/// methods, which consume and return the widget for chaining.
pub struct TableWidget<'a> {
    schema: &'a Schema,
    layout: &'a FormLayout,
    object: &'a mut Value,
    path: String,
    target_url: String,
    renderer: &'a dyn FieldRenderer,
    icons: &'a dyn IconProvider,
    lookup: Option<&'a dyn LookupProvider>,
    configured: Capabilities,
}

impl<'a> TableWidget<'a> {
    /// Creates a widget for the array at `path` inside `object`.
    ///
    /// `target_url` is where every action (edit, delete, add, cancel) is sent.
    #[must_use]
    pub fn new(
        schema: &'a Schema,
        layout: &'a FormLayout,
        object: &'a mut Value,
        path: impl Into<String>,
        target_url: impl Into<String>,
        renderer: &'a dyn FieldRenderer,
        icons: &'a dyn IconProvider,
    ) -> Self {
        Self {
            schema,
            layout,
            object,
            path: path.into(),
            target_url: target_url.into(),
            renderer,
            icons,
            lookup: None,
            configured: Capabilities::all(),
        }
    }

    #[must_use]
    pub fn allow_add(mut self, allowed: bool) -> Self {
        self.configured.can_add = allowed;
        self
    }

    #[must_use]
    pub fn allow_edit(mut self, allowed: bool) -> Self {
        self.configured.can_edit = allowed;
        self
    }

    #[must_use]
    pub fn allow_delete(mut self, allowed: bool) -> Self {
        self.configured.can_delete = allowed;
        self
    }

    #[must_use]
    pub fn allow_all(mut self) -> Self {
        self.configured = Capabilities::all();
        self
    }

    #[must_use]
    pub fn allow_none(mut self) -> Self {
        self.configured = Capabilities::none();
        self
    }

    #[must_use]
    pub fn use_lookup_provider(mut self, lookup: &'a dyn LookupProvider) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// The capabilities as configured, before bounds are applied.
    #[must_use]
    pub fn configured(&self) -> Capabilities {
        self.configured
    }

    /// The bound data object.
    #[must_use]
    pub fn object(&self) -> &Value {
        &*self.object
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Effective capabilities for the collection as it is right now.
    ///
    /// # Errors
    ///
    /// Fails when the collection cannot be resolved.
    pub fn capabilities(&self) -> Result<Capabilities, TableError> {
        let (array, rows) = self.collection()?;
        Ok(capability::resolve(self.configured, rows.len(), &array))
    }

    /// Draws the table in the state requested by `params`
    /// (`add=true`, `edit=<i>`, optional `focus=<col>`).
    ///
    /// # Errors
    ///
    /// Fails on schema resolution or field rendering errors. Nothing is
    /// written to `out` unless the whole table rendered.
    pub fn draw(&self, params: &QueryParams, out: &mut dyn fmt::Write) -> Result<(), TableError> {
        self.draw_request(RenderRequest::from_query(params), out)
    }

    /// Draws the table read-only.
    ///
    /// # Errors
    ///
    /// See [`draw`](Self::draw).
    pub fn draw_view(&self, out: &mut dyn fmt::Write) -> Result<(), TableError> {
        self.draw_request(
            RenderRequest {
                intent: RenderIntent::View,
                focus: None,
            },
            out,
        )
    }

    /// Draws the table with an empty row for adding a record.
    ///
    /// # Errors
    ///
    /// See [`draw`](Self::draw).
    pub fn draw_add(&self, out: &mut dyn fmt::Write) -> Result<(), TableError> {
        self.draw_request(
            RenderRequest {
                intent: RenderIntent::Add,
                focus: None,
            },
            out,
        )
    }

    /// Draws the table with row `index` editable.
    ///
    /// # Errors
    ///
    /// See [`draw`](Self::draw).
    pub fn draw_edit(&self, index: i64, out: &mut dyn fmt::Write) -> Result<(), TableError> {
        self.draw_request(
            RenderRequest {
                intent: RenderIntent::Edit(index),
                focus: None,
            },
            out,
        )
    }

    /// [`draw`](Self::draw) into a new `String`.
    ///
    /// # Errors
    ///
    /// See [`draw`](Self::draw).
    pub fn draw_string(&self, params: &QueryParams) -> Result<String, TableError> {
        let mut out = String::new();
        self.draw(params, &mut out)?;
        Ok(out)
    }

    /// [`draw_view`](Self::draw_view) into a new `String`.
    ///
    /// # Errors
    ///
    /// See [`draw`](Self::draw).
    pub fn draw_view_string(&self) -> Result<String, TableError> {
        let mut out = String::new();
        self.draw_view(&mut out)?;
        Ok(out)
    }

    /// [`draw_add`](Self::draw_add) into a new `String`.
    ///
    /// # Errors
    ///
    /// See [`draw`](Self::draw).
    pub fn draw_add_string(&self) -> Result<String, TableError> {
        let mut out = String::new();
        self.draw_add(&mut out)?;
        Ok(out)
    }

    /// [`draw_edit`](Self::draw_edit) into a new `String`.
    ///
    /// # Errors
    ///
    /// See [`draw`](Self::draw).
    pub fn draw_edit_string(&self, index: i64) -> Result<String, TableError> {
        let mut out = String::new();
        self.draw_edit(index, &mut out)?;
        Ok(out)
    }

    fn draw_request(
        &self,
        request: RenderRequest,
        out: &mut dyn fmt::Write,
    ) -> Result<(), TableError> {
        let tree = self.build(request)?;
        tree.write_to(out)?;
        Ok(())
    }

    /// Resolves the array descriptor and the current rows.
    ///
    /// Absent data is an empty table; data of another kind is an error.
    fn collection(&self) -> Result<(ArrayDescriptor<'a>, &[Value]), TableError> {
        let schema: &'a Schema = self.schema;
        let schema_error = |source| TableError::Schema {
            path: self.path.clone(),
            source,
        };

        let array = schema.describe_array(&self.path).map_err(schema_error)?;
        let rows = match schema.get(&*self.object, &self.path).map_err(schema_error)? {
            None | Some(Value::Null) => &[][..],
            Some(Value::Array(items)) => items.as_slice(),
            Some(other) => {
                return Err(TableError::NotACollection {
                    path: self.path.clone(),
                    found: other.kind_name(),
                })
            }
        };

        Ok((array, rows))
    }

    fn build(&self, request: RenderRequest) -> Result<Html, TableError> {
        let (array, rows) = self.collection()?;
        let length = rows.len();
        let caps = capability::resolve(self.configured, length, &array);
        let state = RenderState::select(request.intent, caps, length);
        let urls = ActionUrls::new(&self.target_url);

        let row_schema = Schema::new(array.items.clone());
        let row_renderer = RowRenderer {
            layout: self.layout,
            row_schema: &row_schema,
            renderer: self.renderer,
            lookup: self.lookup,
            icons: self.icons,
            urls: &urls,
            caps,
        };

        let focus = request.focus.unwrap_or(0);

        let mut table = Html::new("table").class("grid").child(self.header_row());

        for (index, value) in rows.iter().enumerate() {
            let row = if state == RenderState::EditRow(index) {
                row_renderer.edit_row(value, focus)
            } else {
                row_renderer.view_row(index, value)
            };
            table.push(row.map_err(|source| TableError::Render { row: index, source })?);
        }

        if state == RenderState::AddRow {
            let row = row_renderer
                .add_row(focus)
                .map_err(|source| TableError::Render { row: length, source })?;
            table.push(row);
        }

        let wrapper = match state {
            RenderState::View => Html::new("div"),
            RenderState::AddRow => Html::new("form").data("hx-post", urls.edit(length)),
            RenderState::EditRow(index) => Html::new("form").data("hx-post", urls.edit(index)),
        };

        let mut wrapper = wrapper
            .class("grid")
            .data("hx-target", "this")
            .data("hx-swap", "outerHTML")
            .data("hx-push-url", "false")
            .child(table);

        if caps.can_add && state != RenderState::AddRow {
            wrapper.push(
                Html::new("div").child(
                    Html::new("button")
                        .attr("type", "button")
                        .class("link")
                        .data("hx-get", urls.add())
                        .raw(format!("{} Add a Row", self.icons.get("plus"))),
                ),
            );
        }

        Ok(wrapper)
    }

    fn header_row(&self) -> Html {
        let cells = self.layout.children.iter().map(|field| {
            let mut cell = Html::new("td").class("grid-cell");
            if let Some(width) = field.options.get(OPTION_COLUMN_WIDTH) {
                cell = cell.style(format!("width:{}", width.display_string()));
            }
            Node::from(cell.child(Html::new("div").text(field.label.as_str())))
        });

        Html::new("tr")
            .class("grid-header")
            .children(cells)
            .child(Html::new("td").class("grid-cell grid-controls"))
    }
}
