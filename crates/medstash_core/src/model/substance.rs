//! Active substance records.

use serde::{Deserialize, Serialize};

/// Storage-assigned identifier for an active substance.
pub type SubstanceId = i64;

/// Active substance, immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substance {
    pub id: SubstanceId,
    pub name: String,
}

impl Substance {
    pub fn new(id: SubstanceId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Substance name paired with the concentration a medication links it with.
///
/// This is the resolved shape consumed by search and rendering; the
/// medication itself only stores [`SubstanceLink`](crate::model::medication::SubstanceLink).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSubstance {
    pub name: String,
    pub concentration: Option<String>,
}

impl ResolvedSubstance {
    pub fn new(name: impl Into<String>, concentration: Option<&str>) -> Self {
        Self {
            name: name.into(),
            concentration: concentration.map(str::to_string),
        }
    }
}
