//! Error types for the table widget.

use std::fmt;

use crate::render::RenderError;
use crate::schema::PathError;

/// A mutation the widget can be asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    Edit,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "adding rows",
            Self::Edit => "editing rows",
            Self::Delete => "deleting rows",
        })
    }
}

/// Broad class of a [`TableError`], used by hosts to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The configured path does not fit the schema. Not retryable.
    SchemaResolution,
    /// The request addressed a row that does not exist, or the data does not
    /// have the shape of a collection. Correctable by the client.
    Validation,
    /// The mutation is not currently permitted.
    Permission,
    /// A save failed part way; earlier fields of the row stay written.
    PartialWrite,
    /// A field renderer failed.
    Render,
    Internal,
}

/// Errors returned by [`TableWidget`](crate::table::TableWidget).
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("cannot resolve table at {path:?}: {source}")]
    Schema {
        path: String,
        #[source]
        source: PathError,
    },
    #[error("value at {path:?} is {found}, not an array")]
    NotACollection { path: String, found: &'static str },
    #[error("row index {index} is out of range for table of length {length}")]
    InvalidIndex { index: i64, length: usize },
    #[error("{action} is not allowed")]
    Forbidden { action: Action },
    #[error("writing {path:?} failed after {written} field(s) were saved: {source}")]
    PartialWrite {
        path: String,
        written: usize,
        #[source]
        source: PathError,
    },
    #[error("rendering row {row} failed: {source}")]
    Render {
        row: usize,
        #[source]
        source: RenderError,
    },
    #[error("could not remove row {index} from {path:?}")]
    RemoveFailed { path: String, index: i64 },
    #[error("writing rendered output failed")]
    Output(#[from] fmt::Error),
}

impl TableError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Schema { .. } => ErrorKind::SchemaResolution,
            Self::NotACollection { .. } | Self::InvalidIndex { .. } => ErrorKind::Validation,
            Self::Forbidden { .. } => ErrorKind::Permission,
            Self::PartialWrite { .. } => ErrorKind::PartialWrite,
            Self::Render { .. } => ErrorKind::Render,
            Self::RemoveFailed { .. } | Self::Output(_) => ErrorKind::Internal,
        }
    }
}
