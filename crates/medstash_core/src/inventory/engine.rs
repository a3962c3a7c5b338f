//! Inventory list state machine.
//!
//! # Responsibility
//! - Apply query/sort/selection changes to [`InventoryViewState`].
//! - Derive the visible medication list as a pure function of source data
//!   and state.
//! - Run the optimistic delete lifecycle: request, then undo or confirm.
//!
//! # Invariants
//! - Precondition failures return [`InvalidStateError`] and leave state
//!   untouched.
//! - The delete collaborator is invoked only from `confirm_delete`, at most
//!   once per `request_delete`.
//! - A selection that is filtered out of the view is kept as-is.

use crate::config::InventoryConfig;
use crate::inventory::keyboard::Action;
use crate::inventory::state::{InventoryViewState, Selection, SortBy};
use crate::model::medication::{Medication, MedicationId};
use crate::model::substance::Substance;
use crate::search::medication_matcher::MedicationMatcher;
use crate::search::name_order;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// External collaborator that commits a medication deletion.
pub trait MedicationDeleter {
    type Error: Error + 'static;

    fn delete_medication(&mut self, id: MedicationId) -> Result<(), Self::Error>;
}

/// Caller violated an operation precondition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidStateError {
    /// Operation needs a selected medication.
    NothingSelected,
    /// Delete requested for a medication other than the selected one.
    NotSelected {
        requested: MedicationId,
        selected: MedicationId,
    },
    /// Another delete is already waiting for confirm/undo.
    DeleteAlreadyPending(MedicationId),
    /// Undo/confirm called with nothing pending.
    NoPendingDelete,
}

impl Display for InvalidStateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NothingSelected => write!(f, "no medication is selected"),
            Self::NotSelected {
                requested,
                selected,
            } => write!(
                f,
                "medication {requested} is not selected (selected: {selected})"
            ),
            Self::DeleteAlreadyPending(id) => {
                write!(f, "delete of medication {id} is already pending")
            }
            Self::NoPendingDelete => write!(f, "no delete is pending"),
        }
    }
}

impl Error for InvalidStateError {}

/// Failure of [`InventoryEngine::confirm_delete`].
#[derive(Debug)]
pub enum ConfirmDeleteError<E> {
    InvalidState(InvalidStateError),
    /// The collaborator rejected the delete. Local state was already
    /// cleared; the caller decides whether to retry or re-surface the row.
    Collaborator { medication_id: MedicationId, source: E },
}

impl<E: Display> Display for ConfirmDeleteError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidState(err) => write!(f, "{err}"),
            Self::Collaborator {
                medication_id,
                source,
            } => write!(f, "failed to delete medication {medication_id}: {source}"),
        }
    }
}

impl<E: Error + 'static> Error for ConfirmDeleteError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidState(err) => Some(err),
            Self::Collaborator { source, .. } => Some(source),
        }
    }
}

impl<E> From<InvalidStateError> for ConfirmDeleteError<E> {
    fn from(value: InvalidStateError) -> Self {
        Self::InvalidState(value)
    }
}

/// One row of the derived view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewEntry<'a> {
    pub medication: &'a Medication,
    pub matcher: MedicationMatcher,
}

impl ViewEntry<'_> {
    /// Substance details are revealed without selection when the search hit
    /// came through a substance.
    pub fn reveals_substances(&self) -> bool {
        self.matcher.has_substance_match()
    }
}

/// Interaction engine for one mounted inventory list.
#[derive(Debug, Clone, Default)]
pub struct InventoryEngine {
    state: InventoryViewState,
}

impl InventoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine using the configured initial sort mode.
    pub fn from_config(config: &InventoryConfig) -> Self {
        let mut engine = Self::new();
        engine.state.sort_by = config.default_sort;
        engine
    }

    pub fn state(&self) -> &InventoryViewState {
        &self.state
    }

    pub fn query(&self) -> &str {
        self.state.query()
    }

    pub fn sort_by(&self) -> SortBy {
        self.state.sort_by()
    }

    pub fn selection(&self) -> Selection {
        self.state.selection()
    }

    pub fn selected_id(&self) -> Option<MedicationId> {
        self.state.selected_id()
    }

    pub fn pending_delete_id(&self) -> Option<MedicationId> {
        self.state.pending_delete_id()
    }

    /// Replaces the search query. Selection is left alone.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.query = query.into();
        debug!(
            "event=query_set module=inventory status=ok query_chars={}",
            self.state.query.chars().count()
        );
    }

    /// Replaces the sort mode. Filtering and selection are left alone.
    pub fn set_sort(&mut self, sort_by: SortBy) {
        self.state.sort_by = sort_by;
        debug!("event=sort_set module=inventory status=ok sort={sort_by:?}");
    }

    /// Builds the filtered, sorted, match-annotated list.
    ///
    /// A blank query keeps every medication. Sorting is stable, so equal keys
    /// keep source order across repeated calls.
    pub fn derive_view<'a>(
        &self,
        medications: &'a [Medication],
        substances: &[Substance],
    ) -> Vec<ViewEntry<'a>> {
        let search_inactive = self.state.is_search_inactive();
        let mut entries: Vec<ViewEntry<'a>> = medications
            .iter()
            .map(|medication| ViewEntry {
                medication,
                matcher: MedicationMatcher::for_medication(
                    medication,
                    substances,
                    &self.state.query,
                ),
            })
            .filter(|entry| search_inactive || entry.matcher.matches())
            .collect();

        match self.state.sort_by {
            SortBy::Expiration => {
                entries.sort_by(|a, b| a.medication.cmp_expiration(b.medication));
            }
            SortBy::Name => {
                entries.sort_by(|a, b| name_order(&a.medication.name, &b.medication.name));
            }
        }

        entries
    }

    /// Toggles selection.
    ///
    /// Selecting the already selected id clears the selection. Any change
    /// drops a pending delete without touching storage.
    pub fn select(&mut self, id: Option<MedicationId>) {
        let previous = self.state.selection;
        let next = match id {
            Some(id) if previous.selected_id() == Some(id) => Selection::Idle,
            Some(id) => Selection::Selected(id),
            None => Selection::Idle,
        };

        if let Some(cancelled) = previous.pending_delete_id() {
            debug!(
                "event=delete_cancelled module=inventory status=ok medication_id={cancelled} reason=selection_changed"
            );
        }
        self.state.selection = next;
    }

    /// Marks the selected medication as pending delete.
    ///
    /// Nothing is sent to storage yet.
    pub fn request_delete(&mut self, id: MedicationId) -> Result<(), InvalidStateError> {
        let result = match self.state.selection {
            Selection::Selected(selected) if selected == id => {
                self.state.selection = Selection::PendingDelete(id);
                Ok(())
            }
            Selection::Selected(selected) => Err(InvalidStateError::NotSelected {
                requested: id,
                selected,
            }),
            Selection::PendingDelete(pending) => {
                Err(InvalidStateError::DeleteAlreadyPending(pending))
            }
            Selection::Idle => Err(InvalidStateError::NothingSelected),
        };

        match &result {
            Ok(()) => debug!(
                "event=delete_requested module=inventory status=ok medication_id={id}"
            ),
            Err(err) => warn!(
                "event=delete_requested module=inventory status=rejected medication_id={id} error={err}"
            ),
        }
        result
    }

    /// Drops the pending delete and keeps the medication selected.
    pub fn undo_delete(&mut self) -> Result<MedicationId, InvalidStateError> {
        let Selection::PendingDelete(id) = self.state.selection else {
            warn!("event=delete_undo module=inventory status=rejected error=no_pending_delete");
            return Err(InvalidStateError::NoPendingDelete);
        };

        self.state.selection = Selection::Selected(id);
        debug!("event=delete_undo module=inventory status=ok medication_id={id}");
        Ok(id)
    }

    /// Commits the pending delete through `deleter` and clears selection.
    ///
    /// Local state is cleared before the collaborator result is inspected;
    /// a collaborator failure is returned with the affected id.
    pub fn confirm_delete<D: MedicationDeleter>(
        &mut self,
        deleter: &mut D,
    ) -> Result<MedicationId, ConfirmDeleteError<D::Error>> {
        let Selection::PendingDelete(id) = self.state.selection else {
            warn!("event=delete_confirm module=inventory status=rejected error=no_pending_delete");
            return Err(InvalidStateError::NoPendingDelete.into());
        };

        self.state.selection = Selection::Idle;
        match deleter.delete_medication(id) {
            Ok(()) => {
                info!("event=delete_confirm module=inventory status=ok medication_id={id}");
                Ok(id)
            }
            Err(err) => {
                error!(
                    "event=delete_confirm module=inventory status=error medication_id={id} error={err}"
                );
                Err(ConfirmDeleteError::Collaborator {
                    medication_id: id,
                    source: err,
                })
            }
        }
    }

    /// Reconciles state with a refreshed source list.
    ///
    /// Returns `true` when a pending delete was dropped because its
    /// medication no longer exists.
    pub fn sync_source(&mut self, medications: &[Medication]) -> bool {
        let Some(id) = self.state.pending_delete_id() else {
            return false;
        };
        if medications.iter().any(|medication| medication.id == id) {
            return false;
        }

        self.state.selection = Selection::Idle;
        debug!(
            "event=source_sync module=inventory status=ok medication_id={id} cleared=pending_delete"
        );
        true
    }

    /// Applies a keyboard action to engine state.
    ///
    /// Focus and add-form actions belong to the caller and are no-ops here.
    pub fn apply(&mut self, action: &Action) -> Result<(), InvalidStateError> {
        match action {
            Action::Select(id) => {
                self.select(Some(*id));
                Ok(())
            }
            Action::RequestDelete(id) => self.request_delete(*id),
            Action::FocusSearch | Action::OpenAddForm | Action::CloseAddForm => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{InvalidStateError, InventoryEngine};
    use crate::inventory::state::{Selection, SortBy};

    #[test]
    fn select_toggles_same_id() {
        let mut engine = InventoryEngine::new();
        engine.select(Some(5));
        assert_eq!(engine.selected_id(), Some(5));
        engine.select(Some(5));
        assert_eq!(engine.selected_id(), None);
    }

    #[test]
    fn select_none_clears() {
        let mut engine = InventoryEngine::new();
        engine.select(Some(5));
        engine.select(None);
        assert_eq!(engine.selection(), Selection::Idle);
    }

    #[test]
    fn query_and_sort_leave_selection_alone() {
        let mut engine = InventoryEngine::new();
        engine.select(Some(3));
        engine.request_delete(3).expect("selected id can be deleted");
        engine.set_query("ibu");
        engine.set_sort(SortBy::Name);
        assert_eq!(engine.selection(), Selection::PendingDelete(3));
        assert_eq!(engine.query(), "ibu");
        assert_eq!(engine.sort_by(), SortBy::Name);
    }

    #[test]
    fn request_delete_rejects_without_mutation() {
        let mut engine = InventoryEngine::new();
        assert_eq!(
            engine.request_delete(1),
            Err(InvalidStateError::NothingSelected)
        );

        engine.select(Some(2));
        assert_eq!(
            engine.request_delete(1),
            Err(InvalidStateError::NotSelected {
                requested: 1,
                selected: 2
            })
        );
        assert_eq!(engine.selection(), Selection::Selected(2));

        engine.request_delete(2).expect("selected id can be deleted");
        assert_eq!(
            engine.request_delete(2),
            Err(InvalidStateError::DeleteAlreadyPending(2))
        );
        assert_eq!(engine.selection(), Selection::PendingDelete(2));
    }

    #[test]
    fn undo_without_pending_delete_is_rejected() {
        let mut engine = InventoryEngine::new();
        engine.select(Some(4));
        assert_eq!(engine.undo_delete(), Err(InvalidStateError::NoPendingDelete));
        assert_eq!(engine.selection(), Selection::Selected(4));
    }

    #[test]
    fn selecting_pending_row_again_cancels_and_deselects() {
        let mut engine = InventoryEngine::new();
        engine.select(Some(5));
        engine.request_delete(5).expect("selected id can be deleted");
        engine.select(Some(5));
        assert_eq!(engine.selection(), Selection::Idle);
    }
}
