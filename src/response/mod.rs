pub mod bor;
pub mod new_lesion;
pub mod nontarget;
pub mod overall;
pub mod select;
pub mod target;
pub mod timeline;

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Tolerance for inclusive threshold comparisons on percent and mm values.
pub const THRESHOLD_EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LesionClass {
    Target,
    NonTarget,
    New,
}

impl LesionClass {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "TARGET" => Some(Self::Target),
            "NON_TARGET" | "NONTARGET" => Some(Self::NonTarget),
            "NEW" => Some(Self::New),
            _ => None,
        }
    }
}

/// Qualitative lesion status as recorded by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LesionStatus {
    Present,
    Absent,
    Progression,
    NotDone,
}

impl LesionStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "PRESENT" => Some(Self::Present),
            "ABSENT" => Some(Self::Absent),
            "PROGRESSION" | "UNEQUIVOCAL_PROGRESSION" => Some(Self::Progression),
            "NOT_DONE" | "ND" => Some(Self::NotDone),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LesionMeasurement {
    pub subject_id: String,
    pub lesion_id: String,
    pub organ: String,
    pub assessment_date: NaiveDate,
    pub diameter_mm: Option<f64>,
    pub lesion_class: LesionClass,
    pub status: Option<LesionStatus>,
}

/// Response category shared by target lesions, the overall timepoint response
/// and the best overall response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseCategory {
    #[serde(rename = "CR")]
    Cr,
    #[serde(rename = "PR")]
    Pr,
    #[serde(rename = "SD")]
    Sd,
    #[serde(rename = "PD")]
    Pd,
    #[serde(rename = "NE")]
    Ne,
}

impl ResponseCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cr => "CR",
            Self::Pr => "PR",
            Self::Sd => "SD",
            Self::Pd => "PD",
            Self::Ne => "NE",
        }
    }

    /// Best-response precedence: CR > PR > SD > PD > NE.
    pub fn rank(self) -> u8 {
        match self {
            Self::Cr => 4,
            Self::Pr => 3,
            Self::Sd => 2,
            Self::Pd => 1,
            Self::Ne => 0,
        }
    }

    pub fn is_response(self) -> bool {
        matches!(self, Self::Cr | Self::Pr)
    }
}

impl fmt::Display for ResponseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NonTargetCategory {
    #[serde(rename = "CR")]
    Cr,
    #[serde(rename = "NON-CR/NON-PD")]
    NonCrNonPd,
    #[serde(rename = "PD")]
    Pd,
    #[serde(rename = "NE")]
    Ne,
    /// No non-target lesions at baseline.
    #[serde(rename = "NA")]
    NotApplicable,
}

impl NonTargetCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cr => "CR",
            Self::NonCrNonPd => "NON-CR/NON-PD",
            Self::Pd => "PD",
            Self::Ne => "NE",
            Self::NotApplicable => "NA",
        }
    }
}

impl fmt::Display for NonTargetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedLesion {
    pub lesion_id: String,
    pub organ: String,
    pub baseline_diameter_mm: f64,
}

/// Target lesions fixed at baseline; never re-selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetLesionSet {
    pub subject_id: String,
    pub lesions: Vec<SelectedLesion>,
}

impl TargetLesionSet {
    pub fn contains(&self, lesion_id: &str) -> bool {
        self.lesions.iter().any(|l| l.lesion_id == lesion_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lesions.is_empty()
    }

    pub fn lesion_ids(&self) -> Vec<String> {
        self.lesions.iter().map(|l| l.lesion_id.clone()).collect()
    }
}

/// Target-lesion measures at one timepoint. `None` means not computable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetMeasures {
    pub sld_mm: Option<f64>,
    pub pchg_base: Option<f64>,
    pub nadir_mm: Option<f64>,
    pub pchg_nadir: Option<f64>,
    pub achg_nadir: Option<f64>,
}

/// One timepoint for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub subject_id: String,
    pub assessment_date: NaiveDate,
    pub study_day: i64,
    pub is_baseline: bool,
    pub target: TargetMeasures,
    pub target_category: Option<ResponseCategory>,
    pub nontarget_category: Option<NonTargetCategory>,
    pub new_lesion: bool,
    pub overall_response: Option<ResponseCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambiguity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestOverallResponse {
    pub subject_id: String,
    pub bor: ResponseCategory,
    pub bor_date: Option<NaiveDate>,
    pub confirmed: bool,
    pub basis: String,
}

impl BestOverallResponse {
    pub fn not_evaluable(subject_id: &str, basis: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.to_string(),
            bor: ResponseCategory::Ne,
            bor_date: None,
            confirmed: false,
            basis: basis.into(),
        }
    }
}
