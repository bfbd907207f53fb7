use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;

use crate::io::open_maybe_gz;
use crate::response::{LesionClass, LesionMeasurement, LesionStatus};

const DATE_FORMAT: &str = "%Y-%m-%d";
const REQUIRED_COLUMNS: [&str; 5] = [
    "subject_id",
    "lesion_id",
    "organ",
    "assessment_date",
    "lesion_class",
];

#[derive(Debug, Clone, Copy)]
struct Columns {
    subject_id: usize,
    lesion_id: usize,
    organ: usize,
    assessment_date: usize,
    lesion_class: usize,
    diameter_mm: Option<usize>,
    status: Option<usize>,
}

pub fn read_lesion_feed(path: &Path) -> Result<Vec<LesionMeasurement>> {
    let mut reader = open_maybe_gz(path)
        .with_context(|| format!("failed to open lesion feed {}", path.display()))?;
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_lesion_feed(&content, &path.display().to_string())
}

/// Parses the tab-separated lesion feed. Structural problems (missing
/// columns, bad dates, unknown classes) abort with `source:line`.
pub fn parse_lesion_feed(content: &str, source: &str) -> Result<Vec<LesionMeasurement>> {
    let mut columns: Option<Columns> = None;
    let mut out = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.trim().is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = trimmed.split('\t').map(str::trim).collect();
        let Some(cols) = columns else {
            columns = Some(parse_header(&fields, source, line_no)?);
            continue;
        };

        let get = |i: usize| fields.get(i).copied().unwrap_or("");
        let subject_id = get(cols.subject_id);
        let lesion_id = get(cols.lesion_id);
        if subject_id.is_empty() || lesion_id.is_empty() {
            bail!("{}:{} empty subject_id or lesion_id", source, line_no);
        }
        let date_str = get(cols.assessment_date);
        let assessment_date = NaiveDate::parse_from_str(date_str, DATE_FORMAT)
            .with_context(|| format!("{}:{} invalid assessment_date '{}'", source, line_no, date_str))?;
        let class_str = get(cols.lesion_class);
        let lesion_class = LesionClass::parse(class_str).ok_or_else(|| {
            anyhow::anyhow!("{}:{} invalid lesion_class '{}'", source, line_no, class_str)
        })?;
        let diameter_mm = match cols.diameter_mm.map(get).filter(|s| !s.is_empty()) {
            Some(s) => {
                let d: f64 = s
                    .parse()
                    .with_context(|| format!("{}:{} invalid diameter_mm '{}'", source, line_no, s))?;
                if !d.is_finite() || d < 0.0 {
                    bail!("{}:{} diameter_mm must be a non-negative number", source, line_no);
                }
                Some(d)
            }
            None => None,
        };
        let status = match cols.status.map(get).filter(|s| !s.is_empty()) {
            Some(s) => Some(LesionStatus::parse(s).ok_or_else(|| {
                anyhow::anyhow!("{}:{} invalid status '{}'", source, line_no, s)
            })?),
            None => None,
        };

        out.push(LesionMeasurement {
            subject_id: subject_id.to_string(),
            lesion_id: lesion_id.to_string(),
            organ: get(cols.organ).to_string(),
            assessment_date,
            diameter_mm,
            lesion_class,
            status,
        });
    }

    if columns.is_none() {
        bail!("{}: lesion feed has no header", source);
    }
    Ok(out)
}

fn parse_header(fields: &[&str], source: &str, line_no: usize) -> Result<Columns> {
    let find = |name: &str| {
        fields
            .iter()
            .position(|f| f.eq_ignore_ascii_case(name))
    };
    for name in REQUIRED_COLUMNS {
        if find(name).is_none() {
            bail!("{}:{} missing required column '{}'", source, line_no, name);
        }
    }
    let required = |name: &str| find(name).unwrap_or_default();
    Ok(Columns {
        subject_id: required("subject_id"),
        lesion_id: required("lesion_id"),
        organ: required("organ"),
        assessment_date: required("assessment_date"),
        lesion_class: required("lesion_class"),
        diameter_mm: find("diameter_mm"),
        status: find("status"),
    })
}

/// Reads `subject_id<TAB>reference_date` rows.
pub fn read_baseline_dates(path: &Path) -> Result<BTreeMap<String, NaiveDate>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read baseline dates {}", path.display()))?;
    parse_baseline_dates(&content, &path.display().to_string())
}

pub fn parse_baseline_dates(content: &str, source: &str) -> Result<BTreeMap<String, NaiveDate>> {
    let mut out = BTreeMap::new();
    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = trimmed.split('\t').map(str::trim).collect();
        if parts.len() != 2 {
            bail!("{}:{} malformed TSV (expected 2 columns)", source, line_no);
        }
        if parts[0].eq_ignore_ascii_case("subject_id") {
            continue;
        }
        let date = NaiveDate::parse_from_str(parts[1], DATE_FORMAT)
            .with_context(|| format!("{}:{} invalid reference_date '{}'", source, line_no, parts[1]))?;
        if out.insert(parts[0].to_string(), date).is_some() {
            bail!("{}:{} duplicate subject '{}'", source, line_no, parts[0]);
        }
    }
    Ok(out)
}
