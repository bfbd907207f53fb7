use std::collections::BTreeMap;

use crate::criteria::{ResponseCriteria, TargetSelection};
use crate::error::DataQualityError;
use crate::response::{
    LesionClass, LesionMeasurement, LesionStatus, SelectedLesion, THRESHOLD_EPS, TargetLesionSet,
};

/// Establishes the baseline target-lesion set for one subject.
///
/// Only TARGET rows measured at or above `measurable_min_mm` are candidates.
/// In `rank` mode candidates are ordered by diameter descending (ties by
/// lesion_id ascending) and taken until the total or per-organ cap is hit.
/// In `source` mode every candidate is kept and the caps are checked instead.
/// An empty set is not an error; the target category is NE downstream.
pub fn select_target_lesions(
    subject_id: &str,
    baseline: &[LesionMeasurement],
    criteria: &ResponseCriteria,
) -> Result<TargetLesionSet, DataQualityError> {
    let mut candidates: Vec<SelectedLesion> = baseline
        .iter()
        .filter(|m| m.lesion_class == LesionClass::Target)
        .filter(|m| !matches!(m.status, Some(LesionStatus::Absent | LesionStatus::NotDone)))
        .filter_map(|m| {
            let d = m.diameter_mm?;
            if d < criteria.measurable_min_mm - THRESHOLD_EPS {
                return None;
            }
            Some(SelectedLesion {
                lesion_id: m.lesion_id.clone(),
                organ: m.organ.clone(),
                baseline_diameter_mm: d,
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.baseline_diameter_mm
            .total_cmp(&a.baseline_diameter_mm)
            .then_with(|| a.lesion_id.cmp(&b.lesion_id))
    });

    let lesions = match criteria.target_selection {
        TargetSelection::Rank => rank_with_caps(candidates, criteria),
        TargetSelection::Source => {
            check_caps(subject_id, &candidates, criteria)?;
            candidates
        }
    };

    Ok(TargetLesionSet {
        subject_id: subject_id.to_string(),
        lesions,
    })
}

fn rank_with_caps(candidates: Vec<SelectedLesion>, criteria: &ResponseCriteria) -> Vec<SelectedLesion> {
    let mut per_organ: BTreeMap<String, usize> = BTreeMap::new();
    let mut out = Vec::with_capacity(criteria.max_targets);
    for lesion in candidates {
        if out.len() >= criteria.max_targets {
            break;
        }
        let count = per_organ.entry(organ_key(&lesion.organ)).or_insert(0);
        if *count >= criteria.max_targets_per_organ {
            continue;
        }
        *count += 1;
        out.push(lesion);
    }
    out
}

/// Validates a designated target set against the total and per-organ caps.
pub fn check_caps(
    subject_id: &str,
    lesions: &[SelectedLesion],
    criteria: &ResponseCriteria,
) -> Result<(), DataQualityError> {
    if lesions.len() > criteria.max_targets {
        return Err(DataQualityError::TargetCapExceeded {
            subject_id: subject_id.to_string(),
            detail: format!("{} lesions > {}", lesions.len(), criteria.max_targets),
        });
    }
    let mut per_organ: BTreeMap<String, usize> = BTreeMap::new();
    for lesion in lesions {
        *per_organ.entry(organ_key(&lesion.organ)).or_insert(0) += 1;
    }
    for (organ, count) in per_organ {
        if count > criteria.max_targets_per_organ {
            return Err(DataQualityError::TargetCapExceeded {
                subject_id: subject_id.to_string(),
                detail: format!(
                    "{} lesions in organ '{}' > {}",
                    count, organ, criteria.max_targets_per_organ
                ),
            });
        }
    }
    Ok(())
}

fn organ_key(organ: &str) -> String {
    organ.trim().to_ascii_lowercase()
}
