//! Table endpoints: draw the widget, apply mutations, serve the host page.
//!
//! Every request builds its own widget inside [`TableStore::with_widget`],
//! so the store's mutex serializes the read-modify-draw sequence.
//!
//! [`TableStore::with_widget`]: crate::store::TableStore::with_widget

use std::collections::HashMap;

use axum::extract::rejection::FormRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use gridtable_core::{ErrorKind, FormData, QueryParams, TableError, Value};
use tracing::{debug, error, warn};

use super::AppState;

const HTMX_SCRIPT: &str = "https://unpkg.com/htmx.org@1.9.12";
const BOOTSTRAP_ICONS_CSS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap-icons@1.11.3/font/bootstrap-icons.min.css";

const PAGE_STYLE: &str = "\
table.grid{width:100%;border-collapse:collapse}\
.grid-cell{padding:4px 8px;border-bottom:1px solid #ddd;vertical-align:top}\
.grid-controls{white-space:nowrap;text-align:right}\
.hover-trigger:hover{background:#f5f5f5;cursor:pointer}\
.grid-editable input,.grid-editable select,.grid-editable textarea{width:100%}\
.text-green{color:#198754}\
button.link{border:none;background:none;color:#0d6efd;cursor:pointer}";

/// Why a table request was not answered with a table.
///
/// Validation problems are the client's to fix (400), refused mutations are
/// 403, requests arriving during shutdown are 503, and everything else is a
/// 500.
#[derive(Debug)]
pub enum TableResponseError {
    Table(TableError),
    Draining,
}

impl From<TableError> for TableResponseError {
    fn from(err: TableError) -> Self {
        Self::Table(err)
    }
}

impl TableResponseError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        let Self::Table(err) = self else {
            return StatusCode::SERVICE_UNAVAILABLE;
        };
        match err.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Permission => StatusCode::FORBIDDEN,
            ErrorKind::SchemaResolution
            | ErrorKind::PartialWrite
            | ErrorKind::Render
            | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TableResponseError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Table(err) if status.is_server_error() => {
                error!(error = %err, kind = ?err.kind(), "table request failed");
                err.to_string()
            }
            Self::Table(err) => {
                warn!(error = %err, kind = ?err.kind(), "table request rejected");
                err.to_string()
            }
            Self::Draining => "server is shutting down".to_string(),
        };
        (status, body).into_response()
    }
}

/// `GET` on the table route: draws the table for the requested state.
///
/// # Errors
///
/// Returns [`TableResponseError`] when the table cannot be drawn.
pub async fn get_table(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Html<String>, TableResponseError> {
    let _guard = state.shutdown.admit().ok_or(TableResponseError::Draining)?;
    let html = state
        .store
        .with_widget(&state.config.table_route, |widget| widget.draw_string(&params))?;
    Ok(Html(html))
}

/// `POST` on the table route: applies the mutation named in the query
/// string, then redraws the table in view mode.
///
/// A request without a form body (a delete button, for instance) carries an
/// empty form.
///
/// # Errors
///
/// Returns [`TableResponseError`] when the mutation is refused or fails, or
/// when the table cannot be redrawn.
pub async fn post_table(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<Html<String>, TableResponseError> {
    let _guard = state.shutdown.admit().ok_or(TableResponseError::Draining)?;

    let form: FormData = match form {
        Ok(Form(fields)) => fields
            .into_iter()
            .map(|(name, value)| (name, Value::String(value)))
            .collect(),
        Err(rejection) => {
            debug!(%rejection, "no form body, using empty form");
            FormData::new()
        }
    };

    let html = state
        .store
        .with_widget(&state.config.table_route, |widget| -> Result<String, TableError> {
            widget.apply(&params, &form)?;
            widget.draw_view_string()
        })?;
    Ok(Html(html))
}

/// Host page that loads htmx and embeds the table in view mode.
///
/// # Errors
///
/// Returns [`TableResponseError`] when the table cannot be drawn.
pub async fn index_handler(
    State(state): State<AppState>,
) -> Result<Html<String>, TableResponseError> {
    let table = state
        .store
        .with_widget(&state.config.table_route, |widget| widget.draw_view_string())?;

    Ok(Html(format!(
        "<!DOCTYPE html>\
<html><head><meta charset=\"utf-8\"><title>Tasks</title>\
<script src=\"{HTMX_SCRIPT}\"></script>\
<link rel=\"stylesheet\" href=\"{BOOTSTRAP_ICONS_CSS}\">\
<style>{PAGE_STYLE}</style>\
</head><body><h1>Tasks</h1>{table}</body></html>"
    )))
}
