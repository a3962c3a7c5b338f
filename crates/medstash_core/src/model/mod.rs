//! Domain model for the medication inventory.
//!
//! # Responsibility
//! - Define canonical records shared by storage, search and the list engine.
//! - Keep validation rules for medication records in one place.
//!
//! # Invariants
//! - Medications reference substances by id only; names are resolved at
//!   match/render time against the externally supplied substance list.
//! - Deletion is represented by soft-delete tombstones in storage, never by
//!   a field on the in-memory record.

pub mod medication;
pub mod substance;
