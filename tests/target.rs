use chrono::NaiveDate;

use kira_recist::criteria::{ResponseCriteria, SmallLesionPolicy};
use kira_recist::response::target::{
    NadirState, classify_series, classify_target, lesion_contribution, sum_of_diameters,
};
use kira_recist::response::{
    LesionClass, LesionMeasurement, LesionStatus, ResponseCategory, SelectedLesion,
    TargetLesionSet,
};

fn row(lesion_id: &str, diameter: Option<f64>, status: Option<LesionStatus>) -> LesionMeasurement {
    LesionMeasurement {
        subject_id: "S1".to_string(),
        lesion_id: lesion_id.to_string(),
        organ: "liver".to_string(),
        assessment_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        diameter_mm: diameter,
        lesion_class: LesionClass::Target,
        status,
    }
}

fn set(ids: &[&str]) -> TargetLesionSet {
    TargetLesionSet {
        subject_id: "S1".to_string(),
        lesions: ids
            .iter()
            .map(|id| SelectedLesion {
                lesion_id: id.to_string(),
                organ: "liver".to_string(),
                baseline_diameter_mm: 20.0,
            })
            .collect(),
    }
}

fn state(baseline: f64, nadir: f64) -> NadirState {
    NadirState {
        baseline_sld: baseline,
        nadir_sld: nadir,
    }
}

#[test]
fn partial_response_threshold_is_inclusive() {
    let c = ResponseCriteria::default();
    assert_eq!(classify_target(state(100.0, 100.0), Some(70.0), &c).category, ResponseCategory::Pr);
    assert_eq!(classify_target(state(100.0, 100.0), Some(65.0), &c).category, ResponseCategory::Pr);
    assert_eq!(classify_target(state(100.0, 100.0), Some(71.0), &c).category, ResponseCategory::Sd);
}

#[test]
fn progression_needs_both_relative_and_absolute_increase() {
    let c = ResponseCriteria::default();
    // +20% / +4mm
    let step = classify_target(state(20.0, 20.0), Some(24.0), &c);
    assert_eq!(step.category, ResponseCategory::Sd);
    // +10% / +10mm
    let step = classify_target(state(100.0, 100.0), Some(110.0), &c);
    assert_eq!(step.category, ResponseCategory::Sd);
    // +25% / +5mm
    let step = classify_target(state(20.0, 20.0), Some(25.0), &c);
    assert_eq!(step.category, ResponseCategory::Pd);
    // +19% / +19mm
    let step = classify_target(state(100.0, 100.0), Some(119.0), &c);
    assert_eq!(step.category, ResponseCategory::Sd);
}

#[test]
fn progression_bounds_are_inclusive() {
    let c = ResponseCriteria::default();
    let step = classify_target(state(40.0, 25.0), Some(30.0), &c);
    assert_eq!(step.category, ResponseCategory::Pd);
    assert_eq!(step.measures.achg_nadir, Some(5.0));
    assert!((step.measures.pchg_nadir.unwrap() - 20.0).abs() < 1e-9);
}

#[test]
fn progression_measured_from_nadir() {
    let c = ResponseCriteria::default();
    let step = classify_target(state(40.0, 30.0), Some(36.0), &c);
    assert_eq!(step.category, ResponseCategory::Pd);
    assert_eq!(step.measures.achg_nadir, Some(6.0));
    assert!((step.measures.pchg_nadir.unwrap() - 20.0).abs() < 1e-9);
    assert!((step.measures.pchg_base.unwrap() + 10.0).abs() < 1e-9);
    assert_eq!(step.state.nadir_sld, 30.0);
}

#[test]
fn zero_sld_is_complete_response() {
    let c = ResponseCriteria::default();
    let step = classify_target(state(80.0, 80.0), Some(0.0), &c);
    assert_eq!(step.category, ResponseCategory::Cr);
    assert_eq!(step.state.nadir_sld, 0.0);
}

#[test]
fn zero_nadir_uses_absolute_increase_only() {
    let c = ResponseCriteria::default();
    let steps = classify_series(50.0, &[Some(0.0), Some(4.0), Some(5.0)], &c);
    let cats: Vec<ResponseCategory> = steps.iter().map(|s| s.category).collect();
    assert_eq!(
        cats,
        vec![ResponseCategory::Cr, ResponseCategory::Pr, ResponseCategory::Pd]
    );
    assert_eq!(steps[1].measures.pchg_nadir, None);
}

#[test]
fn missing_sld_is_not_evaluable_and_keeps_nadir() {
    let c = ResponseCriteria::default();
    let step = classify_target(state(100.0, 60.0), None, &c);
    assert_eq!(step.category, ResponseCategory::Ne);
    assert_eq!(step.state, state(100.0, 60.0));
    assert_eq!(step.measures.sld_mm, None);
    assert_eq!(step.measures.nadir_mm, Some(60.0));
}

#[test]
fn zero_baseline_is_not_evaluable() {
    let c = ResponseCriteria::default();
    let step = classify_target(NadirState::at_baseline(0.0), Some(10.0), &c);
    assert_eq!(step.category, ResponseCategory::Ne);
}

#[test]
fn nadir_never_increases() {
    let c = ResponseCriteria::default();
    let slds = [Some(80.0), Some(60.0), Some(70.0), None, Some(65.0)];
    let steps = classify_series(100.0, &slds, &c);
    let nadirs: Vec<f64> = steps.iter().map(|s| s.state.nadir_sld).collect();
    assert_eq!(nadirs, vec![80.0, 60.0, 60.0, 60.0, 60.0]);
    assert!(nadirs.windows(2).all(|w| w[1] <= w[0]));
    // 70 vs nadir 60: +16.7% / +10mm, not PD; -30% from baseline.
    assert_eq!(steps[2].category, ResponseCategory::Pr);
}

#[test]
fn lesion_contribution_rules() {
    let zero = ResponseCriteria::default();
    let nominal = ResponseCriteria {
        small_lesion_policy: SmallLesionPolicy::Nominal,
        ..ResponseCriteria::default()
    };
    assert_eq!(lesion_contribution(&row("T1", Some(15.0), None), &zero), Some(15.0));
    assert_eq!(lesion_contribution(&row("T1", Some(4.0), None), &zero), Some(0.0));
    assert_eq!(lesion_contribution(&row("T1", Some(4.0), None), &nominal), Some(5.0));
    assert_eq!(lesion_contribution(&row("T1", Some(0.0), None), &nominal), Some(0.0));
    assert_eq!(
        lesion_contribution(&row("T1", None, Some(LesionStatus::Absent)), &zero),
        Some(0.0)
    );
    assert_eq!(
        lesion_contribution(&row("T1", Some(12.0), Some(LesionStatus::NotDone)), &zero),
        None
    );
    assert_eq!(lesion_contribution(&row("T1", None, None), &zero), None);
}

#[test]
fn sum_of_diameters_over_selected_lesions() {
    let c = ResponseCriteria::default();
    let rows = vec![
        row("T1", Some(20.0), None),
        row("T2", Some(15.5), None),
        row("T9", Some(99.0), None),
    ];
    assert_eq!(sum_of_diameters(&set(&["T1", "T2"]), &rows, &c), Some(35.5));
    assert_eq!(sum_of_diameters(&set(&["T1", "T3"]), &rows, &c), None);
    assert_eq!(sum_of_diameters(&set(&[]), &rows, &c), None);
}
