//! Medication domain model.
//!
//! # Responsibility
//! - Define the canonical medication record and its presentation forms.
//! - Provide expiration helpers used by sorting and expiry reporting.
//!
//! # Invariants
//! - `expiration_year` is within `2000..=2100`.
//! - `expiration_month` is within `1..=12`.
//! - `name` is never blank once validated.
//! - `substances` keeps caller order; ids are back-references, not ownership.

use crate::model::substance::{ResolvedSubstance, Substance, SubstanceId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned identifier for a medication.
pub type MedicationId = i64;

pub const MIN_EXPIRATION_YEAR: i32 = 2000;
pub const MAX_EXPIRATION_YEAR: i32 = 2100;

/// Physical form of a medication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presentation {
    Pill,
    Syrup,
    Spray,
    Cream,
    Drops,
    Other,
}

impl Presentation {
    pub const ALL: [Presentation; 6] = [
        Presentation::Pill,
        Presentation::Syrup,
        Presentation::Spray,
        Presentation::Cream,
        Presentation::Drops,
        Presentation::Other,
    ];

    /// Stable lowercase name used by storage and request payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pill => "pill",
            Self::Syrup => "syrup",
            Self::Spray => "spray",
            Self::Cream => "cream",
            Self::Drops => "drops",
            Self::Other => "other",
        }
    }

    /// Parses the stable name. Surrounding whitespace and case are ignored.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pill" => Some(Self::Pill),
            "syrup" => Some(Self::Syrup),
            "spray" => Some(Self::Spray),
            "cream" => Some(Self::Cream),
            "drops" => Some(Self::Drops),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl Display for Presentation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar month used for expiration ordering.
///
/// Ordering is year-first, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Returns the following calendar month, rolling December into January.
    pub fn next(self) -> Self {
        if self.month >= 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// Parses `YYYY-MM`.
    pub fn parse(value: &str) -> Option<Self> {
        let (year, month) = value.trim().split_once('-')?;
        let year = year.parse::<i32>().ok()?;
        let month = month.parse::<u32>().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(Self::new(year, month))
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Link from a medication to one active substance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstanceLink {
    pub substance_id: SubstanceId,
    /// Free-text strength such as `500mg`.
    pub concentration: Option<String>,
}

impl SubstanceLink {
    pub fn new(substance_id: SubstanceId, concentration: Option<&str>) -> Self {
        Self {
            substance_id,
            concentration: concentration.map(str::to_string),
        }
    }
}

/// Validation failures for medication records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MedicationValidationError {
    BlankName,
    YearOutOfRange(i32),
    MonthOutOfRange(u32),
}

impl Display for MedicationValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "medication name is required"),
            Self::YearOutOfRange(year) => write!(
                f,
                "expiration year {year} must be between {MIN_EXPIRATION_YEAR} and {MAX_EXPIRATION_YEAR}"
            ),
            Self::MonthOutOfRange(month) => {
                write!(f, "expiration month {month} must be between 1 and 12")
            }
        }
    }
}

impl Error for MedicationValidationError {}

/// Canonical medication record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub id: MedicationId,
    pub name: String,
    pub presentation: Presentation,
    pub expiration_year: i32,
    pub expiration_month: u32,
    pub substances: Vec<SubstanceLink>,
}

impl Medication {
    pub fn new(
        id: MedicationId,
        name: impl Into<String>,
        presentation: Presentation,
        expiration: YearMonth,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            presentation,
            expiration_year: expiration.year,
            expiration_month: expiration.month,
            substances: Vec::new(),
        }
    }

    /// Appends a substance link, keeping insertion order.
    pub fn with_substance(
        mut self,
        substance_id: SubstanceId,
        concentration: Option<&str>,
    ) -> Self {
        self.substances
            .push(SubstanceLink::new(substance_id, concentration));
        self
    }

    /// Checks record-level invariants before persistence.
    pub fn validate(&self) -> Result<(), MedicationValidationError> {
        validate_fields(&self.name, self.expiration_year, self.expiration_month)
    }

    pub fn expiration(&self) -> YearMonth {
        YearMonth::new(self.expiration_year, self.expiration_month)
    }

    /// Returns whether the expiration month lies strictly before `today`.
    ///
    /// A medication expiring this month is still usable until the month ends.
    pub fn is_expired_at(&self, today: YearMonth) -> bool {
        self.expiration() < today
    }

    /// Compares by `(expiration_year, expiration_month)`.
    pub fn cmp_expiration(&self, other: &Self) -> Ordering {
        self.expiration().cmp(&other.expiration())
    }

    /// Resolves substance links against `substances`, keeping link order.
    ///
    /// Links whose id is unknown are omitted so one bad reference does not
    /// hide the rest of the record.
    pub fn resolve_substances(&self, substances: &[Substance]) -> Vec<ResolvedSubstance> {
        self.substances
            .iter()
            .filter_map(|link| {
                substances
                    .iter()
                    .find(|substance| substance.id == link.substance_id)
                    .map(|substance| {
                        ResolvedSubstance::new(
                            substance.name.as_str(),
                            link.concentration.as_deref(),
                        )
                    })
            })
            .collect()
    }
}

pub(crate) fn validate_fields(
    name: &str,
    year: i32,
    month: u32,
) -> Result<(), MedicationValidationError> {
    if name.trim().is_empty() {
        return Err(MedicationValidationError::BlankName);
    }
    if !(MIN_EXPIRATION_YEAR..=MAX_EXPIRATION_YEAR).contains(&year) {
        return Err(MedicationValidationError::YearOutOfRange(year));
    }
    if !(1..=12).contains(&month) {
        return Err(MedicationValidationError::MonthOutOfRange(month));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Medication, MedicationValidationError, Presentation, YearMonth};
    use crate::model::substance::Substance;

    #[test]
    fn year_month_orders_year_first() {
        assert!(YearMonth::new(2024, 12) < YearMonth::new(2025, 1));
        assert!(YearMonth::new(2025, 2) < YearMonth::new(2025, 10));
    }

    #[test]
    fn year_month_next_rolls_over_december() {
        assert_eq!(YearMonth::new(2025, 12).next(), YearMonth::new(2026, 1));
        assert_eq!(YearMonth::new(2025, 3).next(), YearMonth::new(2025, 4));
    }

    #[test]
    fn year_month_parse_rejects_bad_months() {
        assert_eq!(YearMonth::parse("2025-08"), Some(YearMonth::new(2025, 8)));
        assert_eq!(YearMonth::parse("2025-13"), None);
        assert_eq!(YearMonth::parse("2025"), None);
    }

    #[test]
    fn presentation_parse_is_case_insensitive() {
        assert_eq!(Presentation::parse(" Syrup "), Some(Presentation::Syrup));
        assert_eq!(Presentation::parse("bandage"), None);
        for presentation in Presentation::ALL {
            assert_eq!(Presentation::parse(presentation.as_str()), Some(presentation));
        }
    }

    #[test]
    fn validate_rejects_out_of_range_fields() {
        let mut medication =
            Medication::new(1, "Advil", Presentation::Pill, YearMonth::new(2025, 8));
        assert!(medication.validate().is_ok());

        medication.expiration_month = 13;
        assert_eq!(
            medication.validate(),
            Err(MedicationValidationError::MonthOutOfRange(13))
        );

        medication.expiration_month = 1;
        medication.expiration_year = 1999;
        assert_eq!(
            medication.validate(),
            Err(MedicationValidationError::YearOutOfRange(1999))
        );

        medication.expiration_year = 2025;
        medication.name = "   ".to_string();
        assert_eq!(medication.validate(), Err(MedicationValidationError::BlankName));
    }

    #[test]
    fn resolve_substances_skips_unknown_ids() {
        let medication = Medication::new(1, "NyQuil", Presentation::Syrup, YearMonth::new(2024, 11))
            .with_substance(2, Some("325mg"))
            .with_substance(99, None)
            .with_substance(4, Some("15mg"));
        let substances = vec![
            Substance::new(4, "Dextromethorphan"),
            Substance::new(2, "Acetaminophen"),
        ];

        let resolved = medication.resolve_substances(&substances);
        let names: Vec<_> = resolved.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Acetaminophen", "Dextromethorphan"]);
        assert_eq!(resolved[0].concentration.as_deref(), Some("325mg"));
    }

    #[test]
    fn expired_means_strictly_before_reference_month() {
        let medication =
            Medication::new(1, "Advil", Presentation::Pill, YearMonth::new(2025, 8));
        assert!(!medication.is_expired_at(YearMonth::new(2025, 8)));
        assert!(medication.is_expired_at(YearMonth::new(2025, 9)));
        assert!(!medication.is_expired_at(YearMonth::new(2024, 12)));
    }

    #[test]
    fn wire_shape_uses_snake_case_fields_and_lowercase_presentation() {
        let medication =
            Medication::new(3, "NyQuil", Presentation::Syrup, YearMonth::new(2024, 11))
                .with_substance(2, Some("325mg"));
        let value = serde_json::to_value(&medication).expect("medication should serialize");
        assert_eq!(value["presentation"], "syrup");
        assert_eq!(value["expiration_year"], 2024);
        assert_eq!(value["expiration_month"], 11);
        assert_eq!(value["substances"][0]["substance_id"], 2);
        assert_eq!(value["substances"][0]["concentration"], "325mg");

        let decoded: Medication =
            serde_json::from_value(value).expect("medication should deserialize");
        assert_eq!(decoded, medication);
    }
}
