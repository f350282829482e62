//! In-memory table store shared by all requests.
//!
//! The widget itself does no locking: every request builds its own
//! [`TableWidget`] while holding the store's mutex, so reads and writes to
//! the bound data are serialized here.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use gridtable_core::{
    FormLayout, LookupCode, LookupProvider, PathResolver, Schema, StandardFieldRenderer,
    TableWidget, Value,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::icons::BootstrapIcons;

/// Everything needed to serve one table: schema, columns, data location,
/// initial data, and the lookup groups its select fields draw from.
///
/// Loaded from JSON with `--definition`; see [`crate::demo`] for the
/// built-in example.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDefinition {
    pub schema: Schema,
    pub layout: FormLayout,
    /// Dot-path of the array inside `data`.
    pub path: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub lookups: BTreeMap<String, Vec<LookupCode>>,
}

impl TableDefinition {
    /// Reads a definition from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if `path`
    /// does not address an array in `schema`.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading table definition {}", path.display()))?;
        let definition: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing table definition {}", path.display()))?;
        definition.validate()?;
        Ok(definition)
    }

    /// Checks that the definition's path addresses an array.
    ///
    /// # Errors
    ///
    /// Returns the path resolution error, if any.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.schema
            .describe_array(&self.path)
            .with_context(|| format!("table path {:?} does not resolve", self.path))?;
        Ok(())
    }
}

/// Lookup groups held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticLookups(BTreeMap<String, Vec<LookupCode>>);

impl LookupProvider for StaticLookups {
    fn lookup_group(&self, group: &str) -> Option<Vec<LookupCode>> {
        self.0.get(group).cloned()
    }
}

/// Shared, mutex-guarded table data plus its fixed configuration.
pub struct TableStore {
    schema: Schema,
    layout: FormLayout,
    path: String,
    lookups: StaticLookups,
    data: Mutex<Value>,
}

impl TableStore {
    #[must_use]
    pub fn new(definition: TableDefinition) -> Self {
        info!(path = %definition.path, columns = definition.layout.children.len(), "table store created");
        Self {
            schema: definition.schema,
            layout: definition.layout,
            path: definition.path,
            lookups: StaticLookups(definition.lookups),
            data: Mutex::new(definition.data),
        }
    }

    /// Runs `f` with a freshly built widget over the locked data.
    ///
    /// Actions rendered by the widget point back at `target_url`.
    pub fn with_widget<R>(&self, target_url: &str, f: impl FnOnce(&mut TableWidget<'_>) -> R) -> R {
        let mut data = self.data.lock();
        let mut widget = TableWidget::new(
            &self.schema,
            &self.layout,
            &mut data,
            self.path.as_str(),
            target_url,
            &StandardFieldRenderer,
            &BootstrapIcons,
        )
        .use_lookup_provider(&self.lookups);
        f(&mut widget)
    }

    /// Number of rows currently stored; 0 if the data cannot be resolved.
    #[must_use]
    pub fn row_count(&self) -> usize {
        let data = self.data.lock();
        self.schema
            .get(&data, &self.path)
            .ok()
            .flatten()
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    /// Copy of the current data.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        self.data.lock().clone()
    }
}
