use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::criteria::ResponseCriteria;
use crate::response::{NonTargetCategory, ResponseCategory};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputMeta {
    pub lesion_rows: Option<u64>,
    pub subjects: Option<u64>,
    pub assessments: Option<u64>,
    pub baseline_reference: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorCounts {
    #[serde(rename = "CR")]
    pub cr: u64,
    #[serde(rename = "PR")]
    pub pr: u64,
    #[serde(rename = "SD")]
    pub sd: u64,
    #[serde(rename = "PD")]
    pub pd: u64,
    #[serde(rename = "NE")]
    pub ne: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimepointRow {
    pub assessment_date: NaiveDate,
    pub study_day: i64,
    pub baseline: bool,
    pub sld_mm: Option<f64>,
    pub pchg_base: Option<f64>,
    pub nadir_mm: Option<f64>,
    pub pchg_nadir: Option<f64>,
    pub achg_nadir: Option<f64>,
    pub target_response: Option<ResponseCategory>,
    pub nontarget_response: Option<NonTargetCategory>,
    pub new_lesion: bool,
    pub overall_response: Option<ResponseCategory>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestResponse {
    pub bor: ResponseCategory,
    pub bor_date: Option<NaiveDate>,
    pub confirmed: bool,
    pub basis: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectReport {
    pub subject_id: String,
    pub reference_date: Option<NaiveDate>,
    pub baseline_date: Option<NaiveDate>,
    pub target_lesions: Vec<String>,
    pub nontarget_lesions: Vec<String>,
    pub best_response: BestResponse,
    pub timepoints: Vec<TimepointRow>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecistV1 {
    pub tool: String,
    pub version: String,
    pub schema_version: String,
    pub input_meta: InputMeta,
    pub criteria: ResponseCriteria,
    pub bor_counts: BorCounts,
    pub subjects: Vec<SubjectReport>,
    /// Data-quality errors across all subjects.
    #[serde(default)]
    pub errors: Vec<String>,
    /// Run-level and per-subject warnings, in the order they were raised.
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl RecistV1 {
    pub fn empty(tool_version: &str, criteria: ResponseCriteria) -> Self {
        Self {
            tool: "kira-recist".to_string(),
            version: tool_version.to_string(),
            schema_version: "v1".to_string(),
            input_meta: InputMeta::default(),
            criteria,
            bor_counts: BorCounts::default(),
            subjects: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}
