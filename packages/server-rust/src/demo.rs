//! Built-in task list served when no definition file is given.

use std::collections::BTreeMap;

use gridtable_core::layout::OPTION_PROVIDER;
use gridtable_core::{Element, Field, FormLayout, LookupCode, Schema, Value};

use crate::store::TableDefinition;

const STATUSES: [&str; 5] = ["New", "Pending", "Waiting", "In Progress", "Complete"];
const PEOPLE: [&str; 4] = ["Alice", "Bob", "Carl", "Dave"];

/// Lookup group the "Assigned To" column draws its choices from.
pub const PEOPLE_GROUP: &str = "people";

/// Task list with between one and six rows.
#[must_use]
pub fn task_table() -> TableDefinition {
    let task = Element::object([
        ("taskId", Element::string()),
        (
            "label",
            Element::String {
                max_length: 128,
                enum_values: Vec::new(),
            },
        ),
        (
            "description",
            Element::String {
                max_length: 1024,
                enum_values: Vec::new(),
            },
        ),
        ("status", Element::string_enum(STATUSES)),
        ("assignedTo", Element::string_enum(PEOPLE)),
    ]);

    let layout = FormLayout::new(vec![
        Field::new("text", "label", "Task Name"),
        Field::new("textarea", "description", "Description"),
        Field::new("select", "status", "Status"),
        Field::new("select", "assignedTo", "Assigned To").with_option(OPTION_PROVIDER, PEOPLE_GROUP),
    ]);

    let rows = vec![
        task_row("1", "Grocery Store", "Some gibberish.", "In Progress", "Bob"),
        task_row("2", "Hardware Store", "More gibberish here.", "Pending", "Alice"),
    ];

    let people: Vec<LookupCode> = PEOPLE
        .iter()
        .map(|name| LookupCode::new(*name, *name))
        .collect();

    TableDefinition {
        schema: Schema::new(Element::object([("data", Element::array(task, 1, 6))])),
        layout,
        path: "data".to_string(),
        data: Value::Map(BTreeMap::from([("data".to_string(), Value::Array(rows))])),
        lookups: BTreeMap::from([(PEOPLE_GROUP.to_string(), people)]),
    }
}

fn task_row(id: &str, label: &str, description: &str, status: &str, assignee: &str) -> Value {
    Value::Map(BTreeMap::from([
        ("taskId".to_string(), Value::from(id)),
        ("label".to_string(), Value::from(label)),
        ("description".to_string(), Value::from(description)),
        ("status".to_string(), Value::from(status)),
        ("assignedTo".to_string(), Value::from(assignee)),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_definition_is_valid() {
        let definition = task_table();
        definition.validate().unwrap();
        assert_eq!(definition.layout.children.len(), 4);
        assert_eq!(definition.lookups[PEOPLE_GROUP].len(), 4);
    }

    #[test]
    fn demo_definition_survives_json() {
        let json = serde_json::to_string(&task_table()).unwrap();
        let parsed: TableDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.path, "data");
        assert_eq!(parsed.data, task_table().data);
    }
}
