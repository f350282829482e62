//! gridtable core: a schema-bound CRUD table widget.
//!
//! Given a [`Schema`], a [`FormLayout`], a mutable [`Value`] and the dot-path
//! of an array inside it, [`TableWidget`] renders the array as an HTML grid
//! and applies add/edit/delete requests posted back from that grid.

pub mod capability;
pub mod error;
pub mod html;
pub mod layout;
pub mod render;
pub mod request;
pub mod schema;
pub mod table;
pub mod types;

pub use capability::Capabilities;
pub use error::{Action, ErrorKind, TableError};
pub use layout::{Field, FormLayout};
pub use render::{FieldRenderer, IconProvider, LookupCode, LookupProvider, RenderError, StandardFieldRenderer};
pub use request::{MutationIntent, QueryParams, RenderIntent, RenderRequest};
pub use schema::{ArrayDescriptor, Element, PathError, PathResolver, Schema};
pub use table::{ActionUrls, FormData, RenderState, TableWidget};
pub use types::Value;
