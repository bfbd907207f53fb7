use crate::criteria::{ResponseCriteria, SmallLesionPolicy};
use crate::response::{
    LesionClass, LesionMeasurement, LesionStatus, ResponseCategory, THRESHOLD_EPS, TargetLesionSet,
    TargetMeasures,
};

/// Accumulator carried across a subject's chronological assessments.
///
/// `nadir_sld` starts at the baseline SLD and only ever decreases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NadirState {
    pub baseline_sld: f64,
    pub nadir_sld: f64,
}

impl NadirState {
    pub fn at_baseline(baseline_sld: f64) -> Self {
        Self {
            baseline_sld,
            nadir_sld: baseline_sld,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetStep {
    pub measures: TargetMeasures,
    pub category: ResponseCategory,
    pub state: NadirState,
}

/// Contribution of one target lesion row to the SLD, or `None` when the
/// lesion was not assessed.
pub fn lesion_contribution(row: &LesionMeasurement, criteria: &ResponseCriteria) -> Option<f64> {
    match row.status {
        Some(LesionStatus::Absent) => return Some(0.0),
        Some(LesionStatus::NotDone) => return None,
        _ => {}
    }
    let d = row.diameter_mm?;
    if d <= 0.0 {
        return Some(0.0);
    }
    if d < criteria.measurable_min_mm - THRESHOLD_EPS {
        return Some(match criteria.small_lesion_policy {
            SmallLesionPolicy::Zero => 0.0,
            SmallLesionPolicy::Nominal => criteria.small_lesion_nominal_mm,
        });
    }
    Some(d)
}

/// Sum of diameters over the selected lesions at one timepoint. `None` if the
/// set is empty or any selected lesion is missing or not assessed.
pub fn sum_of_diameters(
    set: &TargetLesionSet,
    rows: &[LesionMeasurement],
    criteria: &ResponseCriteria,
) -> Option<f64> {
    if set.is_empty() {
        return None;
    }
    let mut sld = 0.0;
    for lesion in &set.lesions {
        let row = rows
            .iter()
            .find(|r| r.lesion_id == lesion.lesion_id && r.lesion_class != LesionClass::New)?;
        sld += lesion_contribution(row, criteria)?;
    }
    Some(sld)
}

/// Classifies one post-baseline timepoint and advances the nadir.
///
/// Order: CR (SLD 0), PD (both relative and absolute increase over the prior
/// nadir), PR (decrease from baseline), SD.
pub fn classify_target(
    state: NadirState,
    sld: Option<f64>,
    criteria: &ResponseCriteria,
) -> TargetStep {
    let Some(sld) = sld.filter(|_| state.baseline_sld > 0.0) else {
        return TargetStep {
            measures: TargetMeasures {
                nadir_mm: Some(state.nadir_sld),
                ..TargetMeasures::default()
            },
            category: ResponseCategory::Ne,
            state,
        };
    };

    let pchg_base = 100.0 * (sld - state.baseline_sld) / state.baseline_sld;
    let reference = state.nadir_sld;
    let (pchg_nadir, achg_nadir) = if sld >= reference {
        let achg = sld - reference;
        let pchg = (reference > 0.0).then(|| 100.0 * achg / reference);
        (pchg, Some(achg))
    } else {
        (None, None)
    };
    let next = NadirState {
        baseline_sld: state.baseline_sld,
        nadir_sld: reference.min(sld),
    };

    let category = if sld.abs() < THRESHOLD_EPS {
        ResponseCategory::Cr
    } else if is_progression(reference, pchg_nadir, achg_nadir, criteria) {
        ResponseCategory::Pd
    } else if pchg_base <= criteria.pr_threshold_pct + THRESHOLD_EPS {
        ResponseCategory::Pr
    } else {
        ResponseCategory::Sd
    };

    TargetStep {
        measures: TargetMeasures {
            sld_mm: Some(sld),
            pchg_base: Some(pchg_base),
            nadir_mm: Some(next.nadir_sld),
            pchg_nadir,
            achg_nadir,
        },
        category,
        state: next,
    }
}

fn is_progression(
    reference: f64,
    pchg_nadir: Option<f64>,
    achg_nadir: Option<f64>,
    criteria: &ResponseCriteria,
) -> bool {
    let Some(achg) = achg_nadir else {
        return false;
    };
    if achg < criteria.pd_threshold_abs_mm - THRESHOLD_EPS {
        return false;
    }
    // Relative change is undefined against a zero nadir; the absolute rule decides.
    if reference <= 0.0 {
        return true;
    }
    pchg_nadir.is_some_and(|p| p >= criteria.pd_threshold_pct - THRESHOLD_EPS)
}

/// Folds `classify_target` over post-baseline SLDs in chronological order.
pub fn classify_series(
    baseline_sld: f64,
    slds: &[Option<f64>],
    criteria: &ResponseCriteria,
) -> Vec<TargetStep> {
    slds.iter()
        .scan(NadirState::at_baseline(baseline_sld), |state, sld| {
            let step = classify_target(*state, *sld, criteria);
            *state = step.state;
            Some(step)
        })
        .collect()
}
