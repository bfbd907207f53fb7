use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::criteria::ResponseCriteria;
use crate::error::{DataQualityError, SubjectWarning};
use crate::response::bor::derive_bor;
use crate::response::new_lesion::detect_new_lesions;
use crate::response::nontarget::classify_nontarget;
use crate::response::overall::integrate;
use crate::response::select::select_target_lesions;
use crate::response::target::{NadirState, classify_target, sum_of_diameters};
use crate::response::{
    Assessment, BestOverallResponse, LesionClass, LesionMeasurement, TargetLesionSet,
    TargetMeasures,
};

/// Ordered assessments for one subject with the running baseline/nadir state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectTimeline {
    pub subject_id: String,
    pub reference_date: NaiveDate,
    pub baseline_date: NaiveDate,
    pub baseline_sld: Option<f64>,
    pub nadir_sld: Option<f64>,
    pub target_set: TargetLesionSet,
    pub nontarget_ids: Vec<String>,
    pub assessments: Vec<Assessment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineBuild {
    pub timeline: SubjectTimeline,
    pub warnings: Vec<SubjectWarning>,
}

/// Full per-subject result. Never fails: data-quality errors end up as an NE
/// BOR carrying the error text.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectEvaluation {
    pub subject_id: String,
    pub timeline: Option<SubjectTimeline>,
    pub bor: BestOverallResponse,
    pub errors: Vec<DataQualityError>,
    pub warnings: Vec<SubjectWarning>,
}

pub fn study_day(reference: NaiveDate, date: NaiveDate, origin: i64) -> i64 {
    let diff = (date - reference).num_days();
    if origin == 1 && diff >= 0 {
        diff + 1
    } else {
        diff
    }
}

/// Groups one subject's rows by assessment date. A lesion measured twice on
/// the same date is a data-quality error.
pub fn group_by_date(
    subject_id: &str,
    rows: &[LesionMeasurement],
) -> Result<BTreeMap<NaiveDate, Vec<LesionMeasurement>>, DataQualityError> {
    let mut seen: BTreeSet<(NaiveDate, &str)> = BTreeSet::new();
    let mut by_date: BTreeMap<NaiveDate, Vec<LesionMeasurement>> = BTreeMap::new();
    for row in rows {
        if !seen.insert((row.assessment_date, row.lesion_id.as_str())) {
            return Err(DataQualityError::DuplicateMeasurement {
                subject_id: subject_id.to_string(),
                lesion_id: row.lesion_id.clone(),
                date: row.assessment_date,
            });
        }
        by_date
            .entry(row.assessment_date)
            .or_default()
            .push(row.clone());
    }
    Ok(by_date)
}

/// Builds the classified timeline for one subject.
///
/// The baseline assessment is the latest one on or before `reference_date`
/// (the earliest assessment when no reference is given). Earlier scans are
/// ignored with a warning.
pub fn build_timeline(
    subject_id: &str,
    rows: &[LesionMeasurement],
    reference_date: Option<NaiveDate>,
    criteria: &ResponseCriteria,
) -> Result<TimelineBuild, DataQualityError> {
    let by_date = group_by_date(subject_id, rows)?;
    let Some(first_date) = by_date.keys().next().copied() else {
        return Err(DataQualityError::MissingBaseline {
            subject_id: subject_id.to_string(),
            reference_date: reference_date.unwrap_or_default(),
        });
    };
    let reference = reference_date.unwrap_or(first_date);
    let Some((&baseline_date, baseline_rows)) = by_date.range(..=reference).next_back() else {
        return Err(DataQualityError::MissingBaseline {
            subject_id: subject_id.to_string(),
            reference_date: reference,
        });
    };

    let mut warnings = Vec::new();
    for (_, pre) in by_date.range(..baseline_date) {
        for row in pre {
            warnings.push(ignored(row, "precedes baseline assessment"));
        }
    }

    let target_set = select_target_lesions(subject_id, baseline_rows, criteria)?;
    let nontarget_ids = followed_nontarget_ids(baseline_rows, &target_set);
    for row in baseline_rows.iter().filter(|r| r.lesion_class == LesionClass::New) {
        warnings.push(ignored(row, "new lesion at baseline"));
    }

    let baseline_sld = sum_of_diameters(&target_set, baseline_rows, criteria);
    let mut assessments = vec![Assessment {
        subject_id: subject_id.to_string(),
        assessment_date: baseline_date,
        study_day: study_day(reference, baseline_date, criteria.study_day_origin),
        is_baseline: true,
        target: TargetMeasures {
            sld_mm: baseline_sld,
            nadir_mm: baseline_sld,
            ..TargetMeasures::default()
        },
        target_category: None,
        nontarget_category: None,
        new_lesion: false,
        overall_response: None,
        ambiguity: None,
    }];

    let followups: Vec<(NaiveDate, &Vec<LesionMeasurement>)> = by_date
        .range(baseline_date..)
        .skip(1)
        .map(|(d, r)| (*d, r))
        .collect();
    let dates: Vec<NaiveDate> = followups.iter().map(|(d, _)| *d).collect();
    let new_rows: Vec<LesionMeasurement> = followups
        .iter()
        .flat_map(|(_, r)| r.iter())
        .filter(|r| r.lesion_class == LesionClass::New)
        .cloned()
        .collect();
    let new_flags = detect_new_lesions(&dates, &new_rows);

    let mut state = NadirState::at_baseline(baseline_sld.unwrap_or(0.0));
    for ((date, day_rows), new_lesion) in followups.iter().zip(new_flags) {
        for row in day_rows.iter() {
            let known = target_set.contains(&row.lesion_id)
                || nontarget_ids.contains(&row.lesion_id);
            if row.lesion_class != LesionClass::New && !known {
                warnings.push(ignored(row, "lesion not identified at baseline"));
            }
        }

        let sld = sum_of_diameters(&target_set, day_rows, criteria);
        let step = classify_target(state, sld, criteria);
        state = step.state;
        let nontarget = classify_nontarget(&nontarget_ids, day_rows);
        let overall = integrate(step.category, nontarget, new_lesion, criteria);

        assessments.push(Assessment {
            subject_id: subject_id.to_string(),
            assessment_date: *date,
            study_day: study_day(reference, *date, criteria.study_day_origin),
            is_baseline: false,
            target: step.measures,
            target_category: Some(step.category),
            nontarget_category: Some(nontarget),
            new_lesion,
            overall_response: Some(overall.response),
            ambiguity: overall.ambiguity.map(|rule| {
                format!("{} -> {}", rule.describe(), overall.response)
            }),
        });
    }

    Ok(TimelineBuild {
        timeline: SubjectTimeline {
            subject_id: subject_id.to_string(),
            reference_date: reference,
            baseline_date,
            baseline_sld,
            nadir_sld: baseline_sld.map(|_| state.nadir_sld),
            target_set,
            nontarget_ids,
            assessments,
        },
        warnings,
    })
}

/// Baseline NON_TARGET lesions plus TARGET lesions left out of the selection.
fn followed_nontarget_ids(baseline: &[LesionMeasurement], target_set: &TargetLesionSet) -> Vec<String> {
    let ids: BTreeSet<String> = baseline
        .iter()
        .filter(|r| match r.lesion_class {
            LesionClass::NonTarget => true,
            LesionClass::Target => !target_set.contains(&r.lesion_id),
            LesionClass::New => false,
        })
        .map(|r| r.lesion_id.clone())
        .collect();
    ids.into_iter().collect()
}

fn ignored(row: &LesionMeasurement, reason: &str) -> SubjectWarning {
    SubjectWarning::IgnoredRow {
        subject_id: row.subject_id.clone(),
        lesion_id: row.lesion_id.clone(),
        date: row.assessment_date,
        reason: reason.to_string(),
    }
}

/// Runs timeline building and BOR derivation for one subject.
pub fn evaluate_subject(
    subject_id: &str,
    rows: &[LesionMeasurement],
    reference_date: Option<NaiveDate>,
    criteria: &ResponseCriteria,
) -> SubjectEvaluation {
    let built = match build_timeline(subject_id, rows, reference_date, criteria) {
        Ok(built) => built,
        Err(err) => return failed(subject_id, None, Vec::new(), err),
    };
    let TimelineBuild {
        timeline,
        mut warnings,
    } = built;
    match derive_bor(
        subject_id,
        timeline.reference_date,
        &timeline.assessments,
        criteria,
    ) {
        Ok(outcome) => {
            warnings.extend(outcome.warnings);
            SubjectEvaluation {
                subject_id: subject_id.to_string(),
                timeline: Some(timeline),
                bor: outcome.bor,
                errors: Vec::new(),
                warnings,
            }
        }
        Err(err) => failed(subject_id, Some(timeline), warnings, err),
    }
}

fn failed(
    subject_id: &str,
    timeline: Option<SubjectTimeline>,
    warnings: Vec<SubjectWarning>,
    err: DataQualityError,
) -> SubjectEvaluation {
    SubjectEvaluation {
        subject_id: subject_id.to_string(),
        timeline,
        bor: BestOverallResponse::not_evaluable(subject_id, format!("data quality: {}", err)),
        errors: vec![err],
        warnings,
    }
}
