use chrono::NaiveDate;

use crate::response::{LesionClass, LesionMeasurement};

/// First date a NEW lesion was recorded, if any.
pub fn first_new_lesion_date(rows: &[LesionMeasurement]) -> Option<NaiveDate> {
    rows.iter()
        .filter(|r| r.lesion_class == LesionClass::New)
        .map(|r| r.assessment_date)
        .min()
}

/// Per-assessment new-lesion flag. Sticky: true from the first assessment on
/// or after the first NEW lesion date onwards.
pub fn detect_new_lesions(assessment_dates: &[NaiveDate], rows: &[LesionMeasurement]) -> Vec<bool> {
    let Some(first) = first_new_lesion_date(rows) else {
        return vec![false; assessment_dates.len()];
    };
    let mut seen = false;
    assessment_dates
        .iter()
        .map(|date| {
            seen = seen || *date >= first;
            seen
        })
        .collect()
}
