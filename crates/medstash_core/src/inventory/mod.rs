//! Inventory list interaction engine.
//!
//! # Responsibility
//! - Own the list's query, sort mode and selection/pending-delete state.
//! - Derive the filtered, sorted, match-annotated view from source data.
//! - Interpret list keyboard commands and drive the delete/undo lifecycle.
//!
//! # Invariants
//! - A pending delete always refers to the selected medication; the two are
//!   one tagged [`Selection`] value, never separate fields.
//! - The derived view is recomputed from source + state on every read.
//! - Nothing here reads the wall clock; timers take caller-supplied instants.

pub mod engine;
pub mod keyboard;
pub mod state;
pub mod timer;

pub use engine::{
    ConfirmDeleteError, InvalidStateError, InventoryEngine, MedicationDeleter, ViewEntry,
};
pub use keyboard::{interpret_key, Action, Key, KeyContext};
pub use state::{InventoryViewState, Selection, SortBy};
pub use timer::{QueryDebouncer, UndoCountdown};
