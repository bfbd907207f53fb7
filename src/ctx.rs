use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::criteria::ResponseCriteria;
use crate::error::{DataQualityError, SubjectWarning};
use crate::response::timeline::SubjectTimeline;
use crate::response::{BestOverallResponse, LesionMeasurement};
use crate::schema::v1::RecistV1;

#[derive(Debug, Clone, Default)]
pub struct InputMeta {
    pub lesion_rows: Option<u64>,
    pub subjects: Option<u64>,
    pub assessments: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub out_dir: PathBuf,
    pub json_path: PathBuf,
    pub timepoints_path: PathBuf,
    pub bor_path: PathBuf,
    pub rs_path: PathBuf,
}

/// Per-subject working state carried between stages.
#[derive(Debug, Clone, Default)]
pub struct SubjectRecord {
    pub subject_id: String,
    pub reference_date: Option<NaiveDate>,
    pub rows: Vec<LesionMeasurement>,
    pub timeline: Option<SubjectTimeline>,
    pub bor: Option<BestOverallResponse>,
    pub errors: Vec<DataQualityError>,
    pub warnings: Vec<SubjectWarning>,
}

impl SubjectRecord {
    pub fn new(subject_id: &str, reference_date: Option<NaiveDate>) -> Self {
        Self {
            subject_id: subject_id.to_string(),
            reference_date,
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub struct Ctx {
    pub input: PathBuf,
    pub baseline_path: Option<PathBuf>,
    pub criteria_path: Option<PathBuf>,
    pub write_json: bool,
    pub write_tsv: bool,
    pub write_rs: bool,
    pub study_id: String,
    pub threads: usize,
    pub criteria: ResponseCriteria,
    pub measurements: Vec<LesionMeasurement>,
    pub baseline_dates: BTreeMap<String, NaiveDate>,
    pub subjects: Vec<SubjectRecord>,
    pub warnings: Vec<String>,
    pub input_meta: InputMeta,
    pub output: OutputPaths,
    pub report: RecistV1,
}

impl Ctx {
    pub fn new(
        input: PathBuf,
        out_dir: PathBuf,
        baseline_path: Option<PathBuf>,
        criteria_path: Option<PathBuf>,
        write_json: bool,
        write_tsv: bool,
        tool_version: &str,
    ) -> Self {
        let json_path = out_dir.join("recist.json");
        let timepoints_path = out_dir.join("timepoints.tsv");
        let bor_path = out_dir.join("bor.tsv");
        let rs_path = out_dir.join("rs.tsv");
        let criteria = ResponseCriteria::default();
        let report = RecistV1::empty(tool_version, criteria.clone());
        Self {
            input,
            baseline_path,
            criteria_path,
            write_json,
            write_tsv,
            write_rs: false,
            study_id: "STUDY".to_string(),
            threads: 0,
            criteria,
            measurements: Vec::new(),
            baseline_dates: BTreeMap::new(),
            subjects: Vec::new(),
            warnings: Vec::new(),
            input_meta: InputMeta::default(),
            output: OutputPaths {
                out_dir,
                json_path,
                timepoints_path,
                bor_path,
                rs_path,
            },
            report,
        }
    }

    pub fn error_count(&self) -> usize {
        self.subjects.iter().map(|s| s.errors.len()).sum()
    }
}
