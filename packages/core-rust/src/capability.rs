//! Effective add/edit/delete permissions for the current collection length.

use crate::schema::ArrayDescriptor;

/// Add/edit/delete gates.
///
/// Used twice: as the widget's configured flags, and as the effective flags
/// [`resolve`]d from them on every render or mutation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub can_add: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl Capabilities {
    #[must_use]
    pub fn all() -> Self {
        Self {
            can_add: true,
            can_edit: true,
            can_delete: true,
        }
    }

    #[must_use]
    pub fn none() -> Self {
        Self {
            can_add: false,
            can_edit: false,
            can_delete: false,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::all()
    }
}

/// Narrows `configured` by the array's length bounds.
///
/// Adding needs room below `max_length` (0 = unbounded); deleting needs the
/// length to stay at or above `min_length`. Editing ignores bounds.
#[must_use]
pub fn resolve(configured: Capabilities, length: usize, array: &ArrayDescriptor<'_>) -> Capabilities {
    Capabilities {
        can_add: configured.can_add && (array.max_length == 0 || length < array.max_length),
        can_edit: configured.can_edit,
        can_delete: configured.can_delete && length > array.min_length,
    }
}
