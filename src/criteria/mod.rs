mod loader;

use std::fmt;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use loader::{CriteriaEntry, apply_entries, load_criteria_tsv, parse_criteria_tsv};

/// Contribution of a lesion measured below `measurable_min_mm` to the SLD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmallLesionPolicy {
    Zero,
    Nominal,
}

/// Overall response assigned to target CR combined with non-target NE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrWithNeNonTarget {
    Pr,
    Ne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSelection {
    /// Largest TARGET lesions first, capped per organ and in total.
    Rank,
    /// TARGET rows are taken as designated at source and checked against the caps.
    Source,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseCriteria {
    pub pr_threshold_pct: f64,
    pub pd_threshold_pct: f64,
    pub pd_threshold_abs_mm: f64,
    pub confirm_min_days: i64,
    pub confirm_max_days: i64,
    pub sd_min_days: i64,
    pub max_targets: usize,
    pub max_targets_per_organ: usize,
    pub measurable_min_mm: f64,
    pub small_lesion_policy: SmallLesionPolicy,
    pub small_lesion_nominal_mm: f64,
    pub cr_with_ne_nontarget: CrWithNeNonTarget,
    pub confirmation_required: bool,
    pub target_selection: TargetSelection,
    pub study_day_origin: i64,
    pub min_adequate_assessments: usize,
}

impl Default for ResponseCriteria {
    fn default() -> Self {
        Self {
            pr_threshold_pct: -30.0,
            pd_threshold_pct: 20.0,
            pd_threshold_abs_mm: 5.0,
            confirm_min_days: 28,
            confirm_max_days: 84,
            sd_min_days: 42,
            max_targets: 5,
            max_targets_per_organ: 2,
            measurable_min_mm: 10.0,
            small_lesion_policy: SmallLesionPolicy::Zero,
            small_lesion_nominal_mm: 5.0,
            cr_with_ne_nontarget: CrWithNeNonTarget::Pr,
            confirmation_required: true,
            target_selection: TargetSelection::Rank,
            study_day_origin: 0,
            min_adequate_assessments: 2,
        }
    }
}

impl ResponseCriteria {
    /// Key/value pairs in the order of the built-in TSV.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("pr_threshold_pct", self.pr_threshold_pct.to_string()),
            ("pd_threshold_pct", self.pd_threshold_pct.to_string()),
            ("pd_threshold_abs_mm", self.pd_threshold_abs_mm.to_string()),
            ("confirm_min_days", self.confirm_min_days.to_string()),
            ("confirm_max_days", self.confirm_max_days.to_string()),
            ("sd_min_days", self.sd_min_days.to_string()),
            ("max_targets", self.max_targets.to_string()),
            ("max_targets_per_organ", self.max_targets_per_organ.to_string()),
            ("measurable_min_mm", self.measurable_min_mm.to_string()),
            ("small_lesion_policy", self.small_lesion_policy.to_string()),
            (
                "small_lesion_nominal_mm",
                self.small_lesion_nominal_mm.to_string(),
            ),
            ("cr_with_ne_nontarget", self.cr_with_ne_nontarget.to_string()),
            ("confirmation_required", self.confirmation_required.to_string()),
            ("target_selection", self.target_selection.to_string()),
            ("study_day_origin", self.study_day_origin.to_string()),
            (
                "min_adequate_assessments",
                self.min_adequate_assessments.to_string(),
            ),
        ]
    }
}

impl fmt::Display for SmallLesionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => write!(f, "zero"),
            Self::Nominal => write!(f, "nominal"),
        }
    }
}

impl fmt::Display for CrWithNeNonTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pr => write!(f, "pr"),
            Self::Ne => write!(f, "ne"),
        }
    }
}

impl fmt::Display for TargetSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rank => write!(f, "rank"),
            Self::Source => write!(f, "source"),
        }
    }
}

pub fn load_builtin() -> Result<ResponseCriteria> {
    let content = include_str!("../../assets/criteria/recist11.tsv");
    let entries = parse_criteria_tsv(content, "built-in recist11")?;
    let mut criteria = ResponseCriteria::default();
    apply_entries(&mut criteria, &entries, "built-in recist11")?;
    Ok(criteria)
}

/// Built-in criteria with an optional user TSV applied on top.
pub fn load_criteria(user: Option<&Path>) -> Result<ResponseCriteria> {
    let mut criteria = load_builtin()?;
    if let Some(path) = user {
        let entries = load_criteria_tsv(path)?;
        apply_entries(&mut criteria, &entries, &path.display().to_string())?;
    }
    Ok(criteria)
}
