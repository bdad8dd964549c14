use std::collections::BTreeSet;

use crate::value::RowKey;

/// Row selection modes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionMode {
    /// All selection actions are no-ops.
    #[default]
    None,
    /// At most one selected row; selecting another evicts the prior one,
    /// re-selecting the current one toggles it off.
    Single,
    /// Clicks toggle membership.
    Multiple,
    /// Like `Multiple`, rendered with a checkbox gutter column.
    Checkbox,
}

impl SelectionMode {
    pub fn is_multi(&self) -> bool {
        matches!(self, SelectionMode::Multiple | SelectionMode::Checkbox)
    }
}

/// Selected-row-key state machine.
///
/// Every mutating method reports whether the set changed, so the owning
/// widget emits exactly one selection-changed event per transition. No
/// method here touches caller-owned row data.
#[derive(Clone, Debug, Default)]
pub struct SelectionState {
    mode: SelectionMode,
    keys: BTreeSet<RowKey>,
    preserve_across_pages: bool,
}

impl SelectionState {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            keys: BTreeSet::new(),
            preserve_across_pages: true,
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Changing mode clears the current selection; the old set is
    /// meaningless under the new rules.
    pub fn set_mode(&mut self, mode: SelectionMode) -> bool {
        self.mode = mode;
        self.clear()
    }

    pub fn preserve_across_pages(&self) -> bool {
        self.preserve_across_pages
    }

    pub fn set_preserve_across_pages(&mut self, preserve: bool) {
        self.preserve_across_pages = preserve;
    }

    pub fn keys(&self) -> &BTreeSet<RowKey> {
        &self.keys
    }

    pub fn is_selected(&self, key: &RowKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// A row was clicked (or its checkbox toggled).
    pub fn click(&mut self, key: RowKey) -> bool {
        match self.mode {
            SelectionMode::None => false,
            SelectionMode::Single => {
                if self.keys.contains(&key) {
                    // Toggle-off on re-click.
                    self.keys.clear();
                } else {
                    self.keys.clear();
                    self.keys.insert(key);
                }
                true
            }
            SelectionMode::Multiple | SelectionMode::Checkbox => {
                if !self.keys.remove(&key) {
                    self.keys.insert(key);
                }
                true
            }
        }
    }

    /// Select the full filtered key set (not just the visible page). Only
    /// meaningful in the multi modes.
    pub fn select_all(&mut self, keys: impl IntoIterator<Item = RowKey>) -> bool {
        if !self.mode.is_multi() {
            return false;
        }
        let next: BTreeSet<RowKey> = keys.into_iter().collect();
        if next == self.keys {
            return false;
        }
        self.keys = next;
        true
    }

    pub fn clear(&mut self) -> bool {
        if self.keys.is_empty() {
            return false;
        }
        self.keys.clear();
        true
    }

    /// Page navigation with `preserve_across_pages` off: drop selected keys
    /// not on the new page.
    pub fn retain_page(&mut self, page_keys: &BTreeSet<RowKey>) -> bool {
        if self.preserve_across_pages {
            return false;
        }
        let before = self.keys.len();
        self.keys.retain(|k| page_keys.contains(k));
        self.keys.len() != before
    }
}
