//! Applies add/edit/delete requests to the bound collection.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::TableWidget;
use crate::capability;
use crate::error::{Action, TableError};
use crate::request::{MutationIntent, QueryParams};
use crate::schema::{join_path, PathResolver};
use crate::types::Value;

/// Posted form values keyed by layout field path.
pub type FormData = BTreeMap<String, Value>;

impl TableWidget<'_> {
    /// Applies the mutation selected by `params` (`edit=<i>` or `delete=<i>`).
    ///
    /// Requests without a usable index are a successful no-op.
    ///
    /// # Errors
    ///
    /// See [`do_edit`](Self::do_edit) and [`do_delete`](Self::do_delete).
    pub fn apply(&mut self, params: &QueryParams, form: &FormData) -> Result<(), TableError> {
        match MutationIntent::from_query(params) {
            MutationIntent::Edit(index) => self.do_edit(form, index),
            MutationIntent::Delete(index) => self.do_delete(index),
            MutationIntent::None => Ok(()),
        }
    }

    /// Writes `form` into row `index`. An index equal to the current length
    /// appends a new row.
    ///
    /// Fields are written one by one in layout order. If a write fails, the
    /// fields written before it stay written.
    ///
    /// # Errors
    ///
    /// - [`TableError::InvalidIndex`] when `index` is negative or past the end
    /// - [`TableError::Forbidden`] when adding or editing is not allowed now
    /// - [`TableError::PartialWrite`] when a field cannot be written
    pub fn do_edit(&mut self, form: &FormData, index: i64) -> Result<(), TableError> {
        let (array, rows) = self.collection()?;
        let length = rows.len();
        let caps = capability::resolve(self.configured, length, &array);

        let row = match usize::try_from(index) {
            Ok(row) if row <= length => row,
            _ => return Err(TableError::InvalidIndex { index, length }),
        };

        let (allowed, action) = if row == length {
            (caps.can_add, Action::Add)
        } else {
            (caps.can_edit, Action::Edit)
        };

        if !allowed {
            warn!(path = %self.path, index, length, %action, "mutation refused");
            return Err(TableError::Forbidden { action });
        }

        let schema = self.schema;
        let layout = self.layout;
        let row_key = row.to_string();

        for (written, field) in layout.all_fields().into_iter().enumerate() {
            let path = join_path(&[&self.path, &row_key, &field.path]);
            let value = form.get(&field.path).cloned().unwrap_or_default();

            if let Err(source) = schema.set(&mut *self.object, &path, value) {
                return Err(TableError::PartialWrite {
                    path,
                    written,
                    source,
                });
            }
        }

        debug!(path = %self.path, index, %action, "row saved");
        Ok(())
    }

    /// Removes row `index`.
    ///
    /// # Errors
    ///
    /// - [`TableError::Forbidden`] when deleting is not allowed now
    /// - [`TableError::RemoveFailed`] when there is no such row
    pub fn do_delete(&mut self, index: i64) -> Result<(), TableError> {
        let (array, rows) = self.collection()?;
        let length = rows.len();
        let caps = capability::resolve(self.configured, length, &array);

        if !caps.can_delete {
            warn!(path = %self.path, index, length, action = %Action::Delete, "mutation refused");
            return Err(TableError::Forbidden {
                action: Action::Delete,
            });
        }

        let path = join_path(&[&self.path, &index.to_string()]);
        if !self.schema.remove(&mut *self.object, &path) {
            return Err(TableError::RemoveFailed {
                path: self.path.clone(),
                index,
            });
        }

        debug!(path = %self.path, index, "row deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::layout::{Field, FormLayout};
    use crate::render::StandardFieldRenderer;
    use crate::schema::Schema;
    use crate::table::tests::{task_data, task_layout, task_schema, NameIcons};
    use proptest::prelude::*;

    fn widget<'a>(schema: &'a Schema, layout: &'a FormLayout, data: &'a mut Value) -> TableWidget<'a> {
        TableWidget::new(
            schema,
            layout,
            data,
            "data",
            "/t",
            &StandardFieldRenderer,
            &NameIcons,
        )
    }

    fn form(pairs: &[(&str, &str)]) -> FormData {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), Value::from(*v)))
            .collect()
    }

    fn rows(data: &Value) -> &Vec<Value> {
        let Value::Map(map) = data else {
            panic!("expected a map");
        };
        map["data"].as_array().unwrap()
    }

    #[test]
    fn edit_at_length_appends_row() {
        let (schema, layout, mut data) = (task_schema(1, 6), task_layout(), task_data(2));
        widget(&schema, &layout, &mut data)
            .do_edit(&form(&[("label", "x")]), 2)
            .unwrap();

        let rows = rows(&data);
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[2],
            serde_json::from_value::<Value>(serde_json::json!({"label": "x", "status": ""}))
                .unwrap()
        );
    }

    #[test]
    fn edit_existing_row_overwrites_fields() {
        let (schema, layout, mut data) = (task_schema(0, 0), task_layout(), task_data(2));
        widget(&schema, &layout, &mut data)
            .do_edit(&form(&[("label", "Renamed"), ("status", "Done")]), 0)
            .unwrap();

        let Value::Map(row) = &rows(&data)[0] else {
            panic!("expected a map");
        };
        assert_eq!(row["label"], Value::from("Renamed"));
        assert_eq!(row["status"], Value::from("Done"));
    }

    #[test]
    fn edit_past_length_is_invalid_and_leaves_data() {
        let (schema, layout, mut data) = (task_schema(0, 0), task_layout(), task_data(2));
        let err = widget(&schema, &layout, &mut data)
            .do_edit(&form(&[("label", "x")]), 5)
            .unwrap_err();

        assert!(matches!(err, TableError::InvalidIndex { index: 5, length: 2 }));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(data, task_data(2));
    }

    #[test]
    fn negative_edit_is_invalid() {
        let (schema, layout, mut data) = (task_schema(0, 0), task_layout(), task_data(2));
        let err = widget(&schema, &layout, &mut data)
            .do_edit(&form(&[]), -1)
            .unwrap_err();
        assert!(matches!(err, TableError::InvalidIndex { index: -1, .. }));
    }

    #[test]
    fn append_requires_add_capability() {
        let (schema, layout, mut data) = (task_schema(0, 0), task_layout(), task_data(2));
        let err = widget(&schema, &layout, &mut data)
            .allow_add(false)
            .do_edit(&form(&[("label", "x")]), 2)
            .unwrap_err();
        assert!(matches!(err, TableError::Forbidden { action: Action::Add }));
        assert_eq!(rows(&data).len(), 2);
    }

    #[test]
    fn append_at_max_length_is_forbidden() {
        let (schema, layout, mut data) = (task_schema(0, 2), task_layout(), task_data(2));
        let err = widget(&schema, &layout, &mut data)
            .do_edit(&form(&[("label", "x")]), 2)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permission);
    }

    #[test]
    fn edit_requires_edit_capability() {
        let (schema, layout, mut data) = (task_schema(0, 0), task_layout(), task_data(2));
        let err = widget(&schema, &layout, &mut data)
            .allow_edit(false)
            .do_edit(&form(&[("label", "x")]), 1)
            .unwrap_err();
        assert!(matches!(err, TableError::Forbidden { action: Action::Edit }));
        assert_eq!(data, task_data(2));
    }

    #[test]
    fn nested_layout_fields_are_written() {
        let schema = task_schema(0, 0);
        let layout = FormLayout::new(vec![Field {
            kind: "layout-vertical".into(),
            children: vec![
                Field::new("text", "label", "Label"),
                Field::new("number", "estimate", "Estimate"),
            ],
            ..Field::default()
        }]);
        let mut data = task_data(1);
        widget(&schema, &layout, &mut data)
            .do_edit(&form(&[("label", "Deep"), ("estimate", "8")]), 0)
            .unwrap();

        let Value::Map(row) = &rows(&data)[0] else {
            panic!("expected a map");
        };
        assert_eq!(row["label"], Value::from("Deep"));
        assert_eq!(row["estimate"], Value::Int(8));
    }

    #[test]
    fn failed_field_keeps_earlier_writes() {
        let schema = task_schema(0, 0);
        let layout = FormLayout::new(vec![
            Field::new("text", "label", "Label"),
            Field::new("number", "estimate", "Estimate"),
        ]);
        let mut data = task_data(1);
        let err = widget(&schema, &layout, &mut data)
            .do_edit(&form(&[("label", "Half"), ("estimate", "lots")]), 0)
            .unwrap_err();

        match &err {
            TableError::PartialWrite { path, written, .. } => {
                assert_eq!(path, "data.0.estimate");
                assert_eq!(*written, 1);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(err.kind(), ErrorKind::PartialWrite);

        let Value::Map(row) = &rows(&data)[0] else {
            panic!("expected a map");
        };
        assert_eq!(row["label"], Value::from("Half"));
    }

    #[test]
    fn delete_stops_at_min_length() {
        let (schema, layout, mut data) = (task_schema(1, 6), task_layout(), task_data(3));
        let mut table = widget(&schema, &layout, &mut data);

        table.do_delete(0).unwrap();
        table.do_delete(0).unwrap();
        let err = table.do_delete(0).unwrap_err();

        assert!(matches!(err, TableError::Forbidden { action: Action::Delete }));
        assert_eq!(rows(&data).len(), 1);
        let Value::Map(row) = &rows(&data)[0] else {
            panic!("expected a map");
        };
        assert_eq!(row["label"], Value::from("Task 2"));
    }

    #[test]
    fn delete_without_capability_is_forbidden() {
        let (schema, layout, mut data) = (task_schema(0, 0), task_layout(), task_data(2));
        let err = widget(&schema, &layout, &mut data)
            .allow_delete(false)
            .do_delete(0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permission);
    }

    #[test]
    fn delete_missing_row_is_internal_error() {
        let (schema, layout, mut data) = (task_schema(0, 0), task_layout(), task_data(2));
        let err = widget(&schema, &layout, &mut data).do_delete(7).unwrap_err();
        assert!(matches!(err, TableError::RemoveFailed { index: 7, .. }));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn apply_dispatches_on_query() {
        let (schema, layout, mut data) = (task_schema(0, 0), task_layout(), task_data(3));
        let mut table = widget(&schema, &layout, &mut data);
        let query = |k: &str, v: &str| QueryParams::from([(k.to_string(), v.to_string())]);

        table.apply(&query("delete", "1"), &FormData::new()).unwrap();
        table
            .apply(&query("edit", "0"), &form(&[("label", "First"), ("status", "Done")]))
            .unwrap();
        table.apply(&query("edit", "zero"), &form(&[("label", "ignored")])).unwrap();
        table.apply(&query("delete", "one"), &FormData::new()).unwrap();
        table.apply(&QueryParams::new(), &FormData::new()).unwrap();

        let rows = rows(&data);
        assert_eq!(rows.len(), 2);
        let Value::Map(first) = &rows[0] else {
            panic!("expected a map");
        };
        assert_eq!(first["label"], Value::from("First"));
    }

    #[test]
    fn mutation_is_visible_to_next_draw() {
        let (schema, layout, mut data) = (task_schema(0, 3), task_layout(), task_data(2));
        let mut table = widget(&schema, &layout, &mut data);
        assert!(table.draw_view_string().unwrap().contains("?add=true"));

        table.do_edit(&form(&[("label", "Third")]), 2).unwrap();
        let html = table.draw_view_string().unwrap();
        assert!(html.contains("Third"));
        assert!(!html.contains("?add=true"));
    }

    proptest! {
        #[test]
        fn edit_index_rules(
            length in 0usize..5,
            index in -3i64..9,
            can_add in any::<bool>(),
            can_edit in any::<bool>(),
        ) {
            let (schema, layout) = (task_schema(0, 0), task_layout());
            let mut data = task_data(length);
            let result = widget(&schema, &layout, &mut data)
                .allow_add(can_add)
                .allow_edit(can_edit)
                .do_edit(&form(&[("label", "p")]), index);

            let in_range = usize::try_from(index).ok().filter(|i| *i <= length);
            match in_range {
                None => {
                    let invalid = matches!(result, Err(TableError::InvalidIndex { .. }));
                    prop_assert!(invalid, "expected InvalidIndex, got {:?}", result);
                }
                Some(i) if i == length => prop_assert_eq!(result.is_ok(), can_add),
                Some(_) => prop_assert_eq!(result.is_ok(), can_edit),
            }
        }
    }
}
