use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::criteria::{CrWithNeNonTarget, ResponseCriteria, SmallLesionPolicy, TargetSelection};

#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaEntry {
    pub key: String,
    pub value: String,
    pub line_no: usize,
}

pub fn load_criteria_tsv(path: &Path) -> Result<Vec<CriteriaEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read criteria TSV {}", path.display()))?;
    parse_criteria_tsv(&content, &path.display().to_string())
}

pub fn parse_criteria_tsv(content: &str, source: &str) -> Result<Vec<CriteriaEntry>> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = trimmed.split('\t').collect();
        if parts.len() != 2 {
            bail!("{}:{} malformed TSV (expected 2 columns)", source, line_no);
        }
        let key = parts[0].trim();
        let value = parts[1].trim();
        if key.is_empty() || value.is_empty() {
            bail!("{}:{} empty field in TSV", source, line_no);
        }
        if !seen.insert(key.to_string()) {
            bail!("{}:{} duplicate key '{}'", source, line_no, key);
        }
        out.push(CriteriaEntry {
            key: key.to_string(),
            value: value.to_string(),
            line_no,
        });
    }

    Ok(out)
}

pub fn apply_entries(
    criteria: &mut ResponseCriteria,
    entries: &[CriteriaEntry],
    source: &str,
) -> Result<()> {
    for entry in entries {
        let at = format!("{}:{}", source, entry.line_no);
        let v = entry.value.as_str();
        match entry.key.as_str() {
            "pr_threshold_pct" => criteria.pr_threshold_pct = parse_f64(v, &at)?,
            "pd_threshold_pct" => criteria.pd_threshold_pct = parse_f64(v, &at)?,
            "pd_threshold_abs_mm" => criteria.pd_threshold_abs_mm = parse_f64(v, &at)?,
            "confirm_min_days" => criteria.confirm_min_days = parse_i64(v, &at)?,
            "confirm_max_days" => criteria.confirm_max_days = parse_i64(v, &at)?,
            "sd_min_days" => criteria.sd_min_days = parse_i64(v, &at)?,
            "max_targets" => criteria.max_targets = parse_usize(v, &at)?,
            "max_targets_per_organ" => criteria.max_targets_per_organ = parse_usize(v, &at)?,
            "measurable_min_mm" => criteria.measurable_min_mm = parse_f64(v, &at)?,
            "small_lesion_policy" => {
                criteria.small_lesion_policy = match v {
                    "zero" => SmallLesionPolicy::Zero,
                    "nominal" => SmallLesionPolicy::Nominal,
                    _ => bail!("{} small_lesion_policy must be zero|nominal", at),
                }
            }
            "small_lesion_nominal_mm" => criteria.small_lesion_nominal_mm = parse_f64(v, &at)?,
            "cr_with_ne_nontarget" => {
                criteria.cr_with_ne_nontarget = match v {
                    "pr" => CrWithNeNonTarget::Pr,
                    "ne" => CrWithNeNonTarget::Ne,
                    _ => bail!("{} cr_with_ne_nontarget must be pr|ne", at),
                }
            }
            "confirmation_required" => {
                criteria.confirmation_required = match v {
                    "true" => true,
                    "false" => false,
                    _ => bail!("{} confirmation_required must be true|false", at),
                }
            }
            "target_selection" => {
                criteria.target_selection = match v {
                    "rank" => TargetSelection::Rank,
                    "source" => TargetSelection::Source,
                    _ => bail!("{} target_selection must be rank|source", at),
                }
            }
            "study_day_origin" => {
                let origin = parse_i64(v, &at)?;
                if origin != 0 && origin != 1 {
                    bail!("{} study_day_origin must be 0 or 1", at);
                }
                criteria.study_day_origin = origin;
            }
            "min_adequate_assessments" => {
                criteria.min_adequate_assessments = parse_usize(v, &at)?
            }
            other => bail!("{} unknown criteria key '{}'", at, other),
        }
    }

    if criteria.confirm_min_days > criteria.confirm_max_days {
        bail!(
            "{}: confirm_min_days ({}) exceeds confirm_max_days ({})",
            source,
            criteria.confirm_min_days,
            criteria.confirm_max_days
        );
    }
    if criteria.max_targets_per_organ == 0 || criteria.max_targets == 0 {
        bail!("{}: target caps must be positive", source);
    }
    Ok(())
}

fn parse_f64(v: &str, at: &str) -> Result<f64> {
    let parsed: f64 = v
        .parse()
        .with_context(|| format!("{} invalid number '{}'", at, v))?;
    if !parsed.is_finite() {
        bail!("{} non-finite number '{}'", at, v);
    }
    Ok(parsed)
}

fn parse_i64(v: &str, at: &str) -> Result<i64> {
    v.parse()
        .with_context(|| format!("{} invalid integer '{}'", at, v))
}

fn parse_usize(v: &str, at: &str) -> Result<usize> {
    v.parse()
        .with_context(|| format!("{} invalid count '{}'", at, v))
}
