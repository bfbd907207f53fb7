use chrono::NaiveDate;
use thiserror::Error;

/// Problems in one subject's data. Fatal to that subject only: the subject is
/// reported with BOR = NE and the batch continues.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataQualityError {
    #[error("subject {subject_id}: assessment dates out of order ({previous} then {current})")]
    UnsortedDates {
        subject_id: String,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("subject {subject_id}: duplicate assessment date {date}")]
    DuplicateDate { subject_id: String, date: NaiveDate },

    #[error("subject {subject_id}: lesion {lesion_id} measured twice on {date}")]
    DuplicateMeasurement {
        subject_id: String,
        lesion_id: String,
        date: NaiveDate,
    },

    #[error("subject {subject_id}: no baseline assessment on or before {reference_date}")]
    MissingBaseline {
        subject_id: String,
        reference_date: NaiveDate,
    },

    #[error("subject {subject_id}: target lesion set exceeds cap ({detail})")]
    TargetCapExceeded { subject_id: String, detail: String },
}

impl DataQualityError {
    pub fn subject_id(&self) -> &str {
        match self {
            Self::UnsortedDates { subject_id, .. }
            | Self::DuplicateDate { subject_id, .. }
            | Self::DuplicateMeasurement { subject_id, .. }
            | Self::MissingBaseline { subject_id, .. }
            | Self::TargetCapExceeded { subject_id, .. } => subject_id,
        }
    }
}

/// Non-fatal notes raised while evaluating a subject.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SubjectWarning {
    #[error("subject {subject_id}: insufficient data ({adequate} adequate assessments)")]
    InsufficientData { subject_id: String, adequate: usize },

    #[error("subject {subject_id}: ambiguous rule on {date}: {rule}")]
    AmbiguousRule {
        subject_id: String,
        date: NaiveDate,
        rule: String,
    },

    #[error("subject {subject_id}: ignored lesion {lesion_id} on {date}: {reason}")]
    IgnoredRow {
        subject_id: String,
        lesion_id: String,
        date: NaiveDate,
        reason: String,
    },
}
