//! Medication use-case service.
//!
//! # Responsibility
//! - Validate and normalize "add medication" requests.
//! - Provide the delete collaborator used by the inventory engine.
//! - Load the plain-data snapshot (medications + substances) the engine
//!   derives its view from.
//!
//! # Invariants
//! - Names and substance names are trimmed; blank values are rejected.
//! - Blank concentrations are stored as `None`.
//! - Substance names repeated within one request collapse to the first.
//! - Service layer remains storage-agnostic.

use crate::inventory::engine::MedicationDeleter;
use crate::model::medication::{
    validate_fields, Medication, MedicationId, MedicationValidationError, Presentation, YearMonth,
};
use crate::model::substance::Substance;
use crate::repo::medication_repo::{
    MedicationListQuery, MedicationRepository, NewMedication, NewSubstanceLink, RepoError,
};
use log::info;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for medication use-cases.
#[derive(Debug)]
pub enum MedicationServiceError {
    /// Name/expiration fields are invalid.
    InvalidInput(MedicationValidationError),
    /// Presentation is not one of the known forms.
    InvalidPresentation(String),
    /// A substance entry has an empty name.
    BlankSubstanceName,
    /// Target medication does not exist.
    MedicationNotFound(MedicationId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for MedicationServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "{err}"),
            Self::InvalidPresentation(value) => write!(f, "invalid presentation: `{value}`"),
            Self::BlankSubstanceName => write!(f, "substance name is required"),
            Self::MedicationNotFound(id) => write!(f, "medication not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MedicationServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for MedicationServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::MedicationNotFound(id),
            RepoError::Validation(err) => Self::InvalidInput(err),
            other => Self::Repo(other),
        }
    }
}

impl From<MedicationValidationError> for MedicationServiceError {
    fn from(value: MedicationValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

/// One substance entry of an add-medication form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddSubstanceRequest {
    pub name: String,
    pub concentration: Option<String>,
}

/// Raw add-medication form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddMedicationRequest {
    pub name: String,
    /// Presentation name, e.g. `pill`.
    pub presentation: String,
    pub expiration_year: i32,
    pub expiration_month: u32,
    pub substances: Vec<AddSubstanceRequest>,
}

/// Everything the inventory engine needs to derive its view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventorySnapshot {
    pub medications: Vec<Medication>,
    pub substances: Vec<Substance>,
}

/// Medication service facade over repository implementations.
pub struct MedicationService<R: MedicationRepository> {
    repo: R,
}

impl<R: MedicationRepository> MedicationService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates `request` and stores a new medication.
    ///
    /// Returns the new id so the caller can select it right away.
    pub fn add_medication(
        &self,
        request: &AddMedicationRequest,
    ) -> Result<MedicationId, MedicationServiceError> {
        let new_medication = normalize_request(request)?;
        let substance_count = new_medication.substances.len();
        let medication_id = self.repo.create_medication(&new_medication)?;
        info!(
            "event=medication_create module=service status=ok medication_id={} substances={}",
            medication_id, substance_count
        );
        Ok(medication_id)
    }

    /// Soft-deletes a medication by id.
    pub fn delete_medication(&self, id: MedicationId) -> Result<(), MedicationServiceError> {
        self.repo.soft_delete_medication(id)?;
        info!("event=medication_delete module=service status=ok medication_id={id}");
        Ok(())
    }

    pub fn get_medication(
        &self,
        id: MedicationId,
    ) -> Result<Option<Medication>, MedicationServiceError> {
        Ok(self.repo.get_medication(id, false)?)
    }

    /// Lists active medications in insertion order.
    pub fn list_medications(&self) -> Result<Vec<Medication>, MedicationServiceError> {
        Ok(self.repo.list_medications(&MedicationListQuery::default())?)
    }

    pub fn list_substances(&self) -> Result<Vec<Substance>, MedicationServiceError> {
        Ok(self.repo.list_substances()?)
    }

    /// Reads active medications and all substances in one call.
    pub fn load_inventory(&self) -> Result<InventorySnapshot, MedicationServiceError> {
        Ok(InventorySnapshot {
            medications: self.list_medications()?,
            substances: self.list_substances()?,
        })
    }
}

impl<R: MedicationRepository> MedicationDeleter for MedicationService<R> {
    type Error = MedicationServiceError;

    fn delete_medication(&mut self, id: MedicationId) -> Result<(), Self::Error> {
        MedicationService::delete_medication(self, id)
    }
}

fn normalize_request(
    request: &AddMedicationRequest,
) -> Result<NewMedication, MedicationServiceError> {
    let name = request.name.trim();
    let presentation = Presentation::parse(&request.presentation).ok_or_else(|| {
        MedicationServiceError::InvalidPresentation(request.presentation.clone())
    })?;
    validate_fields(name, request.expiration_year, request.expiration_month)?;

    let mut seen = HashSet::new();
    let mut substances = Vec::with_capacity(request.substances.len());
    for substance in &request.substances {
        let substance_name = substance.name.trim();
        if substance_name.is_empty() {
            return Err(MedicationServiceError::BlankSubstanceName);
        }
        if !seen.insert(substance_name.to_lowercase()) {
            continue;
        }
        let concentration = substance
            .concentration
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        substances.push(NewSubstanceLink {
            name: substance_name.to_string(),
            concentration,
        });
    }

    Ok(NewMedication {
        name: name.to_string(),
        presentation,
        expiration: YearMonth::new(request.expiration_year, request.expiration_month),
        substances,
    })
}
