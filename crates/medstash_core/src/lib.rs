//! Core domain logic for MedStash, a household medication inventory.
//! This crate is the single source of truth for inventory invariants.

pub mod config;
pub mod db;
pub mod expiry;
pub mod inventory;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{ConfigError, InventoryConfig};
pub use expiry::{expired_medications, expiring_within};
pub use inventory::{
    interpret_key, Action, ConfirmDeleteError, InvalidStateError, InventoryEngine,
    InventoryViewState, Key, KeyContext, MedicationDeleter, QueryDebouncer, Selection, SortBy,
    UndoCountdown, ViewEntry,
};
pub use logging::{default_log_level, init_logging, init_logging_with_config, logging_status};
pub use model::medication::{
    Medication, MedicationId, MedicationValidationError, Presentation, SubstanceLink, YearMonth,
};
pub use model::substance::{ResolvedSubstance, Substance, SubstanceId};
pub use repo::medication_repo::{
    MedicationListQuery, MedicationRepository, NewMedication, NewSubstanceLink, RepoError,
    RepoResult, SqliteMedicationRepository,
};
pub use search::medication_matcher::{MedicationMatcher, SubstanceWithHighlights};
pub use search::substance_filter::{filter_substances, should_show_add_option};
pub use search::text_match::{
    highlight_segments, match_text, HighlightSegment, MatchResult, MatchSpan, TextMatch,
};
pub use service::medication_service::{
    AddMedicationRequest, AddSubstanceRequest, InventorySnapshot, MedicationService,
    MedicationServiceError,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
