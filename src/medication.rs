use chrono::{Datelike, NaiveDate};

use crate::models::{Medication, MedicationFrequency};

/// Whether `medication` should be taken on `date`.
///
/// As-needed medication is only ever logged manually. Frequencies this crate does not
/// recognise are treated as due.
pub fn is_medication_due(medication: &Medication, date: NaiveDate) -> bool {
    if date < medication.start_date {
        return false;
    }
    if medication.end_date.is_some_and(|end| date > end) {
        return false;
    }

    match &medication.frequency {
        MedicationFrequency::Daily => true,
        MedicationFrequency::Weekly => date.weekday() == medication.start_date.weekday(),
        MedicationFrequency::AsNeeded => false,
        MedicationFrequency::Other(_) => true,
    }
}
