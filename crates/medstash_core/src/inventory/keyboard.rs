//! Keyboard command interpreter for the inventory list.
//!
//! Decision and effect are split: [`interpret_key`] is a pure function from
//! key + context + state + view to an [`Action`], and
//! [`InventoryEngine::apply`](crate::inventory::InventoryEngine::apply)
//! performs the engine-owned part of that action.

use crate::inventory::engine::ViewEntry;
use crate::inventory::state::{InventoryViewState, Selection};
use crate::model::medication::MedicationId;

/// Keys the list surface reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Slash,
    Plus,
    Escape,
    ArrowDown,
    ArrowUp,
    Delete,
    Backspace,
    Other,
}

impl Key {
    /// Maps a DOM `KeyboardEvent.key` name.
    pub fn parse(name: &str) -> Self {
        match name {
            "/" => Self::Slash,
            "+" => Self::Plus,
            "Escape" | "Esc" => Self::Escape,
            "ArrowDown" | "Down" => Self::ArrowDown,
            "ArrowUp" | "Up" => Self::ArrowUp,
            "Delete" | "Del" => Self::Delete,
            "Backspace" => Self::Backspace,
            _ => Self::Other,
        }
    }
}

/// UI facts the engine does not own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyContext {
    pub add_form_open: bool,
    /// Focus is inside a text field; list shortcuts stay quiet.
    pub text_input_focused: bool,
}

/// Result of interpreting one key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    FocusSearch,
    OpenAddForm,
    CloseAddForm,
    Select(MedicationId),
    RequestDelete(MedicationId),
}

impl Action {
    /// Whether outer handlers must not see the event.
    pub fn stops_propagation(&self) -> bool {
        matches!(self, Self::CloseAddForm)
    }
}

/// Decides what a key press does. Returns `None` for ignored keys.
pub fn interpret_key(
    key: Key,
    context: KeyContext,
    state: &InventoryViewState,
    view: &[ViewEntry<'_>],
) -> Option<Action> {
    if context.text_input_focused {
        return match key {
            Key::Escape if context.add_form_open => Some(Action::CloseAddForm),
            _ => None,
        };
    }

    match key {
        Key::Slash => Some(Action::FocusSearch),
        Key::Plus if !context.add_form_open => Some(Action::OpenAddForm),
        Key::Escape if context.add_form_open => Some(Action::CloseAddForm),
        Key::ArrowDown if !context.add_form_open => {
            let target = match selected_position(state, view) {
                Some(index) => view.get(index + 1),
                None => view.first(),
            };
            target.map(|entry| Action::Select(entry.medication.id))
        }
        Key::ArrowUp if !context.add_form_open => {
            let target = match selected_position(state, view) {
                Some(0) => None,
                Some(index) => view.get(index - 1),
                None => view.first(),
            };
            target.map(|entry| Action::Select(entry.medication.id))
        }
        Key::Delete | Key::Backspace if !context.add_form_open => match state.selection() {
            Selection::Selected(id) if view.iter().any(|entry| entry.medication.id == id) => {
                Some(Action::RequestDelete(id))
            }
            _ => None,
        },
        _ => None,
    }
}

/// Index of the selected medication inside `view`, `None` when nothing is
/// selected or the selection is filtered out.
fn selected_position(state: &InventoryViewState, view: &[ViewEntry<'_>]) -> Option<usize> {
    let selected = state.selected_id()?;
    view.iter().position(|entry| entry.medication.id == selected)
}
