use crate::response::{LesionClass, LesionMeasurement, LesionStatus, NonTargetCategory};

/// Qualitative status of a non-target row. A blank status is derived from the
/// diameter: 0 mm is ABSENT, anything else PRESENT.
pub fn lesion_status(row: &LesionMeasurement) -> LesionStatus {
    if let Some(status) = row.status {
        return status;
    }
    match row.diameter_mm {
        Some(d) if d <= 0.0 => LesionStatus::Absent,
        _ => LesionStatus::Present,
    }
}

/// Non-target category at one timepoint for the lesions followed since
/// baseline. A followed lesion with no row counts as NOT_DONE.
pub fn classify_nontarget(
    followed_ids: &[String],
    rows: &[LesionMeasurement],
) -> NonTargetCategory {
    if followed_ids.is_empty() {
        return NonTargetCategory::NotApplicable;
    }

    let statuses: Vec<LesionStatus> = followed_ids
        .iter()
        .map(|id| {
            rows.iter()
                .find(|r| &r.lesion_id == id && r.lesion_class != LesionClass::New)
                .map(lesion_status)
                .unwrap_or(LesionStatus::NotDone)
        })
        .collect();

    classify_statuses(&statuses)
}

/// PD wins over NE, NE over CR; CR needs every lesion ABSENT.
pub fn classify_statuses(statuses: &[LesionStatus]) -> NonTargetCategory {
    if statuses.is_empty() {
        return NonTargetCategory::NotApplicable;
    }
    if statuses.contains(&LesionStatus::Progression) {
        NonTargetCategory::Pd
    } else if statuses.contains(&LesionStatus::NotDone) {
        NonTargetCategory::Ne
    } else if statuses.iter().all(|s| *s == LesionStatus::Absent) {
        NonTargetCategory::Cr
    } else {
        NonTargetCategory::NonCrNonPd
    }
}
