//! Decodes query parameters into per-request render and mutation intent.
//!
//! Nothing decoded here outlives the request: the widget builds a fresh
//! [`RenderRequest`] or [`MutationIntent`] on every call and discards it.

use std::collections::HashMap;

/// Query parameters of one request.
pub type QueryParams = HashMap<String, String>;

/// Which rendering the caller asked for, before capabilities are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderIntent {
    View,
    Add,
    /// Edit the row at this index. May be out of range or negative; the
    /// widget falls back to `View` in that case.
    Edit(i64),
}

/// Decoded `GET` request: render intent plus the optional focus column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderRequest {
    pub intent: RenderIntent,
    pub focus: Option<usize>,
}

impl RenderRequest {
    /// `add=true` wins over an integer `edit=<i>`; everything else is `View`.
    #[must_use]
    pub fn from_query(params: &QueryParams) -> Self {
        let intent = if params.get("add").is_some_and(|v| v == "true") {
            RenderIntent::Add
        } else if let Some(index) = int_param(params, "edit") {
            RenderIntent::Edit(index)
        } else {
            RenderIntent::View
        };

        let focus = params.get("focus").and_then(|v| v.parse().ok());

        Self { intent, focus }
    }
}

/// Decoded `POST` request: which mutation to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationIntent {
    None,
    Edit(i64),
    Delete(i64),
}

impl MutationIntent {
    /// A non-empty `edit` key shadows `delete` even when it does not parse;
    /// values that are not integers mean no mutation was requested.
    #[must_use]
    pub fn from_query(params: &QueryParams) -> Self {
        if params.get("edit").is_some_and(|v| !v.is_empty()) {
            return int_param(params, "edit").map_or(Self::None, Self::Edit);
        }

        int_param(params, "delete").map_or(Self::None, Self::Delete)
    }
}

fn int_param(params: &QueryParams, name: &str) -> Option<i64> {
    params.get(name).and_then(|v| v.parse().ok())
}
