//! Bootstrap Icons for the table's action buttons.

use gridtable_core::IconProvider;

/// Maps action names to Bootstrap Icons `<i>` tags. Unknown names come back
/// unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct BootstrapIcons;

impl IconProvider for BootstrapIcons {
    fn get(&self, name: &str) -> String {
        let class = match name {
            "plus" => "bi-plus-circle-fill",
            "edit" => "bi-pencil-square",
            "delete" => "bi-trash",
            "save" => "bi-check-circle-fill",
            "cancel" => "bi-x-circle-fill",
            other => return other.to_string(),
        };
        format!(r#"<i class="bi {class}"></i>"#)
    }
}
