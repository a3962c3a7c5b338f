//! Medication repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `medications`, `active_substances` and their links.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate records before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Substance links are returned in the order they were written.
//! - Soft-deleted medications are hidden unless explicitly requested.

use crate::db::{ensure_schema_ready, DbError};
use crate::model::medication::{
    validate_fields, Medication, MedicationId, MedicationValidationError, Presentation,
    SubstanceLink, YearMonth,
};
use crate::model::substance::{Substance, SubstanceId};
use rusqlite::{params, Connection, Row};
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MEDICATION_SELECT_SQL: &str = "SELECT
    id,
    name,
    presentation,
    expiration_year,
    expiration_month
FROM medications";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for medication persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(MedicationValidationError),
    Db(DbError),
    NotFound(MedicationId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "medication not found: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted medication data: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<MedicationValidationError> for RepoError {
    fn from(value: MedicationValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Substance reference by name, resolved or created on write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubstanceLink {
    pub name: String,
    pub concentration: Option<String>,
}

/// Write model for a medication that has no id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMedication {
    pub name: String,
    pub presentation: Presentation,
    pub expiration: YearMonth,
    pub substances: Vec<NewSubstanceLink>,
}

/// Query options for listing medications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MedicationListQuery {
    pub include_deleted: bool,
}

/// Repository interface for medication/substance operations.
pub trait MedicationRepository {
    fn create_medication(&self, medication: &NewMedication) -> RepoResult<MedicationId>;
    fn get_medication(
        &self,
        id: MedicationId,
        include_deleted: bool,
    ) -> RepoResult<Option<Medication>>;
    /// Lists medications in insertion order.
    fn list_medications(&self, query: &MedicationListQuery) -> RepoResult<Vec<Medication>>;
    fn soft_delete_medication(&self, id: MedicationId) -> RepoResult<()>;
    /// Lists all substances in insertion order.
    fn list_substances(&self) -> RepoResult<Vec<Substance>>;
    /// Returns the id of the substance named `name` (case-insensitive),
    /// creating it when missing.
    fn find_or_create_substance(&self, name: &str) -> RepoResult<SubstanceId>;
}

/// SQLite-backed medication repository.
pub struct SqliteMedicationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMedicationRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `RepoError::Db(DbError::SchemaNotReady)` when migrations were not
    ///   applied (use [`crate::db::open_db`]).
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl MedicationRepository for SqliteMedicationRepository<'_> {
    fn create_medication(&self, medication: &NewMedication) -> RepoResult<MedicationId> {
        validate_fields(
            &medication.name,
            medication.expiration.year,
            medication.expiration.month,
        )?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO medications (
                name,
                presentation,
                expiration_year,
                expiration_month
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                medication.name.as_str(),
                medication.presentation.as_str(),
                medication.expiration.year,
                medication.expiration.month,
            ],
        )?;
        let medication_id = tx.last_insert_rowid();

        let mut seen = HashSet::new();
        let mut position = 0_i64;
        for link in &medication.substances {
            let substance_id = find_or_create_substance_in(&tx, &link.name)?;
            if !seen.insert(substance_id) {
                continue;
            }
            tx.execute(
                "INSERT INTO medication_substances (
                    medication_id,
                    substance_id,
                    position,
                    concentration
                ) VALUES (?1, ?2, ?3, ?4);",
                params![
                    medication_id,
                    substance_id,
                    position,
                    link.concentration.as_deref(),
                ],
            )?;
            position += 1;
        }
        tx.commit()?;

        Ok(medication_id)
    }

    fn get_medication(
        &self,
        id: MedicationId,
        include_deleted: bool,
    ) -> RepoResult<Option<Medication>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEDICATION_SELECT_SQL}
             WHERE id = ?1
               AND (?2 = 1 OR is_deleted = 0);"
        ))?;
        let mut rows = stmt.query(params![id, bool_to_int(include_deleted)])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let mut medication = parse_medication_row(row)?;
        medication.substances = load_links(self.conn, Some(id))?
            .remove(&id)
            .unwrap_or_default();
        Ok(Some(medication))
    }

    fn list_medications(&self, query: &MedicationListQuery) -> RepoResult<Vec<Medication>> {
        let mut sql = format!("{MEDICATION_SELECT_SQL} WHERE 1 = 1");
        if !query.include_deleted {
            sql.push_str(" AND is_deleted = 0");
        }
        sql.push_str(" ORDER BY id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut medications = Vec::new();
        while let Some(row) = rows.next()? {
            medications.push(parse_medication_row(row)?);
        }

        let mut links = load_links(self.conn, None)?;
        for medication in &mut medications {
            medication.substances = links.remove(&medication.id).unwrap_or_default();
        }
        Ok(medications)
    }

    fn soft_delete_medication(&self, id: MedicationId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE medications
             SET
                is_deleted = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            [id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn list_substances(&self) -> RepoResult<Vec<Substance>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM active_substances ORDER BY id ASC;")?;
        let substances = stmt
            .query_map([], |row| Ok(Substance::new(row.get("id")?, row.get::<_, String>("name")?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(substances)
    }

    fn find_or_create_substance(&self, name: &str) -> RepoResult<SubstanceId> {
        find_or_create_substance_in(self.conn, name)
    }
}

fn find_or_create_substance_in(conn: &Connection, name: &str) -> RepoResult<SubstanceId> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RepoError::InvalidData(
            "substance name cannot be blank".to_string(),
        ));
    }

    // NOCASE only folds ASCII, so "Cafeină" vs "CAFEINĂ" is compared here.
    let key = trimmed.to_lowercase();
    let mut stmt = conn.prepare("SELECT id, name FROM active_substances ORDER BY id ASC;")?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let existing: String = row.get("name")?;
        if existing.to_lowercase() == key {
            return Ok(row.get("id")?);
        }
    }

    conn.execute(
        "INSERT INTO active_substances (name) VALUES (?1);",
        [trimmed],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Loads substance links grouped by medication, ordered by `position`.
fn load_links(
    conn: &Connection,
    medication_id: Option<MedicationId>,
) -> RepoResult<BTreeMap<MedicationId, Vec<SubstanceLink>>> {
    let mut stmt = conn.prepare(
        "SELECT medication_id, substance_id, concentration
         FROM medication_substances
         WHERE (?1 IS NULL OR medication_id = ?1)
         ORDER BY medication_id ASC, position ASC;",
    )?;
    let mut rows = stmt.query([medication_id])?;
    let mut grouped: BTreeMap<MedicationId, Vec<SubstanceLink>> = BTreeMap::new();
    while let Some(row) = rows.next()? {
        let owner: MedicationId = row.get("medication_id")?;
        grouped.entry(owner).or_default().push(SubstanceLink {
            substance_id: row.get("substance_id")?,
            concentration: row.get("concentration")?,
        });
    }
    Ok(grouped)
}

fn parse_medication_row(row: &Row<'_>) -> RepoResult<Medication> {
    let id: MedicationId = row.get("id")?;

    let presentation_text: String = row.get("presentation")?;
    let presentation = Presentation::parse(&presentation_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid presentation `{presentation_text}` in medications.presentation"
        ))
    })?;

    let expiration_month = match row.get::<_, i64>("expiration_month")? {
        month @ 1..=12 => month as u32,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid month `{other}` in medications.expiration_month"
            )));
        }
    };

    let medication = Medication {
        id,
        name: row.get("name")?,
        presentation,
        expiration_year: row.get("expiration_year")?,
        expiration_month,
        substances: Vec::new(),
    };
    medication.validate()?;
    Ok(medication)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
