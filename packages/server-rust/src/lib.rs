//! gridtable server: hosts one editable table over HTTP for htmx clients.

pub mod cli;
pub mod demo;
pub mod icons;
pub mod network;
pub mod store;

pub use icons::BootstrapIcons;
pub use network::{NetworkConfig, NetworkModule};
pub use store::{TableDefinition, TableStore};
