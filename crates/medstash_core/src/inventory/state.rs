//! Engine-owned view state.

use crate::model::medication::MedicationId;
use serde::{Deserialize, Serialize};

/// List ordering mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Ascending by `(expiration_year, expiration_month)`.
    #[default]
    Expiration,
    /// Alphabetical by name.
    Name,
}

/// Selection and pending-delete state as one value.
///
/// `PendingDelete(id)` implies `id` is also the selected medication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Idle,
    Selected(MedicationId),
    /// Marked for deletion, not yet committed to storage.
    PendingDelete(MedicationId),
}

impl Selection {
    pub fn selected_id(self) -> Option<MedicationId> {
        match self {
            Self::Idle => None,
            Self::Selected(id) | Self::PendingDelete(id) => Some(id),
        }
    }

    pub fn pending_delete_id(self) -> Option<MedicationId> {
        match self {
            Self::PendingDelete(id) => Some(id),
            _ => None,
        }
    }
}

/// State of one mounted inventory view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryViewState {
    pub(crate) query: String,
    pub(crate) sort_by: SortBy,
    pub(crate) selection: Selection,
}

impl InventoryViewState {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort_by(&self) -> SortBy {
        self.sort_by
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selected_id(&self) -> Option<MedicationId> {
        self.selection.selected_id()
    }

    pub fn pending_delete_id(&self) -> Option<MedicationId> {
        self.selection.pending_delete_id()
    }

    /// True when the query contains nothing but whitespace.
    pub fn is_search_inactive(&self) -> bool {
        self.query.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{InventoryViewState, Selection, SortBy};

    #[test]
    fn defaults_match_fresh_mount() {
        let state = InventoryViewState::default();
        assert_eq!(state.query(), "");
        assert_eq!(state.sort_by(), SortBy::Expiration);
        assert_eq!(state.selected_id(), None);
        assert_eq!(state.pending_delete_id(), None);
        assert!(state.is_search_inactive());
    }

    #[test]
    fn pending_delete_implies_selection() {
        let selection = Selection::PendingDelete(5);
        assert_eq!(selection.selected_id(), Some(5));
        assert_eq!(selection.pending_delete_id(), Some(5));
        assert_eq!(Selection::Selected(5).pending_delete_id(), None);
    }
}
