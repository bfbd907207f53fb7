use chrono::NaiveDate;

use crate::criteria::ResponseCriteria;
use crate::error::{DataQualityError, SubjectWarning};
use crate::response::{Assessment, BestOverallResponse, ResponseCategory};

#[derive(Debug, Clone, PartialEq)]
pub struct BorOutcome {
    pub bor: BestOverallResponse,
    pub warnings: Vec<SubjectWarning>,
}

#[derive(Debug, Clone)]
struct Candidate {
    response: ResponseCategory,
    date: NaiveDate,
    confirmed: bool,
    basis: String,
}

/// Checks that assessment dates are strictly increasing.
pub fn check_order(subject_id: &str, assessments: &[Assessment]) -> Result<(), DataQualityError> {
    for pair in assessments.windows(2) {
        let previous = pair[0].assessment_date;
        let current = pair[1].assessment_date;
        if current == previous {
            return Err(DataQualityError::DuplicateDate {
                subject_id: subject_id.to_string(),
                date: current,
            });
        }
        if current < previous {
            return Err(DataQualityError::UnsortedDates {
                subject_id: subject_id.to_string(),
                previous,
                current,
            });
        }
    }
    Ok(())
}

/// Derives the best overall response from a chronologically ordered timeline.
///
/// The first assessment must be the baseline. Walking forward:
/// - PD ends the walk; it becomes the BOR only if nothing better qualified before it.
/// - CR/PR count when confirmed by a same-or-better response `confirm_min_days`
///   to `confirm_max_days` later, with no PD in between. Unconfirmed, they can
///   still qualify as SD.
/// - SD counts from the first assessment at least `sd_min_days` after the
///   reference date.
///
/// The best candidate by CR > PR > SD > PD wins, earliest first on ties.
pub fn derive_bor(
    subject_id: &str,
    reference_date: NaiveDate,
    assessments: &[Assessment],
    criteria: &ResponseCriteria,
) -> Result<BorOutcome, DataQualityError> {
    check_order(subject_id, assessments)?;

    let Some(first) = assessments.first() else {
        return Ok(insufficient(subject_id, 0, criteria));
    };
    if !first.is_baseline {
        return Err(DataQualityError::MissingBaseline {
            subject_id: subject_id.to_string(),
            reference_date,
        });
    }

    let post: Vec<&Assessment> = assessments[1..].iter().filter(|a| !a.is_baseline).collect();
    let mut best: Option<Candidate> = None;
    let mut walked = 0usize;

    for (i, a) in post.iter().enumerate() {
        walked = i + 1;
        let response = a.overall_response.unwrap_or(ResponseCategory::Ne);
        let days = (a.assessment_date - reference_date).num_days();
        match response {
            ResponseCategory::Pd => {
                offer(
                    &mut best,
                    Candidate {
                        response,
                        date: a.assessment_date,
                        confirmed: false,
                        basis: format!("PD on {} (day {})", a.assessment_date, a.study_day),
                    },
                );
                break;
            }
            ResponseCategory::Cr | ResponseCategory::Pr => {
                if !criteria.confirmation_required {
                    offer(
                        &mut best,
                        Candidate {
                            response,
                            date: a.assessment_date,
                            confirmed: false,
                            basis: format!(
                                "{} on {} (day {}), confirmation not required",
                                response, a.assessment_date, a.study_day
                            ),
                        },
                    );
                } else if let Some((confirming, gap)) = find_confirmation(&post[i + 1..], a, criteria) {
                    offer(
                        &mut best,
                        Candidate {
                            response,
                            date: a.assessment_date,
                            confirmed: true,
                            basis: format!(
                                "{} on {} (day {}) confirmed by {} on {} after {} days",
                                response,
                                a.assessment_date,
                                a.study_day,
                                confirming.overall_response.unwrap_or(ResponseCategory::Ne),
                                confirming.assessment_date,
                                gap
                            ),
                        },
                    );
                } else if days >= criteria.sd_min_days {
                    offer(
                        &mut best,
                        Candidate {
                            response: ResponseCategory::Sd,
                            date: a.assessment_date,
                            confirmed: false,
                            basis: format!(
                                "unconfirmed {} on {} counted as SD ({} days >= {})",
                                response, a.assessment_date, days, criteria.sd_min_days
                            ),
                        },
                    );
                }
            }
            ResponseCategory::Sd => {
                if days >= criteria.sd_min_days {
                    offer(
                        &mut best,
                        Candidate {
                            response,
                            date: a.assessment_date,
                            confirmed: false,
                            basis: format!(
                                "SD on {} ({} days >= {})",
                                a.assessment_date, days, criteria.sd_min_days
                            ),
                        },
                    );
                }
            }
            ResponseCategory::Ne => {}
        }
    }

    let notes = ambiguity_notes(&post[..walked]);
    let warnings: Vec<SubjectWarning> = post[..walked]
        .iter()
        .filter_map(|a| {
            a.ambiguity.as_ref().map(|rule| SubjectWarning::AmbiguousRule {
                subject_id: subject_id.to_string(),
                date: a.assessment_date,
                rule: rule.clone(),
            })
        })
        .collect();

    let Some(best) = best else {
        let adequate = 1 + post
            .iter()
            .filter(|a| a.overall_response.is_some_and(|r| r != ResponseCategory::Ne))
            .count();
        if adequate < criteria.min_adequate_assessments {
            return Ok(insufficient(subject_id, adequate, criteria));
        }
        let mut bor = BestOverallResponse::not_evaluable(
            subject_id,
            format!(
                "no confirmed response and no SD at least {} days from {}",
                criteria.sd_min_days, reference_date
            ),
        );
        append_notes(&mut bor.basis, &notes);
        return Ok(BorOutcome { bor, warnings });
    };

    let mut basis = best.basis;
    append_notes(&mut basis, &notes);

    Ok(BorOutcome {
        bor: BestOverallResponse {
            subject_id: subject_id.to_string(),
            bor: best.response,
            bor_date: Some(best.date),
            confirmed: best.confirmed,
            basis,
        },
        warnings,
    })
}

/// Forward scan for a confirming assessment. Stops at PD or once the window
/// has passed.
fn find_confirmation<'a>(
    later: &[&'a Assessment],
    current: &Assessment,
    criteria: &ResponseCriteria,
) -> Option<(&'a Assessment, i64)> {
    let response = current.overall_response?;
    for next in later {
        let next_response = next.overall_response.unwrap_or(ResponseCategory::Ne);
        if next_response == ResponseCategory::Pd {
            return None;
        }
        let gap = (next.assessment_date - current.assessment_date).num_days();
        if gap > criteria.confirm_max_days {
            return None;
        }
        if gap >= criteria.confirm_min_days
            && next_response.is_response()
            && next_response.rank() >= response.rank()
        {
            return Some((*next, gap));
        }
    }
    None
}

fn offer(best: &mut Option<Candidate>, candidate: Candidate) {
    let replace = match best {
        Some(current) => candidate.response.rank() > current.response.rank(),
        None => true,
    };
    if replace {
        *best = Some(candidate);
    }
}

fn insufficient(subject_id: &str, adequate: usize, criteria: &ResponseCriteria) -> BorOutcome {
    BorOutcome {
        bor: BestOverallResponse::not_evaluable(
            subject_id,
            format!(
                "insufficient data: {} adequate assessments (< {})",
                adequate, criteria.min_adequate_assessments
            ),
        ),
        warnings: vec![SubjectWarning::InsufficientData {
            subject_id: subject_id.to_string(),
            adequate,
        }],
    }
}

fn ambiguity_notes(assessments: &[&Assessment]) -> Vec<String> {
    assessments
        .iter()
        .filter_map(|a| {
            a.ambiguity
                .as_ref()
                .map(|rule| format!("{} on {} resolved by convention", rule, a.assessment_date))
        })
        .collect()
}

fn append_notes(basis: &mut String, notes: &[String]) {
    for note in notes {
        basis.push_str("; ");
        basis.push_str(note);
    }
}
