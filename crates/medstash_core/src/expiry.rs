//! Expiration reporting.
//!
//! A medication is expired once its expiration month is strictly before the
//! reference month; the reference month is always supplied by the caller.

use crate::model::medication::{Medication, YearMonth};

/// Returns medications expired at `today`, oldest expiration first.
///
/// Ties keep input order.
pub fn expired_medications(medications: &[Medication], today: YearMonth) -> Vec<&Medication> {
    let mut expired: Vec<&Medication> = medications
        .iter()
        .filter(|medication| medication.is_expired_at(today))
        .collect();
    expired.sort_by(|a, b| a.cmp_expiration(b));
    expired
}

/// Returns medications that expire within `months` months from `today`,
/// including the current month, soonest first.
pub fn expiring_within(
    medications: &[Medication],
    today: YearMonth,
    months: u32,
) -> Vec<&Medication> {
    let mut horizon = today;
    for _ in 0..months {
        horizon = horizon.next();
    }

    let mut expiring: Vec<&Medication> = medications
        .iter()
        .filter(|medication| {
            let expiration = medication.expiration();
            expiration >= today && expiration < horizon
        })
        .collect();
    expiring.sort_by(|a, b| a.cmp_expiration(b));
    expiring
}
