use std::path::Path;

use anyhow::{Context, Result};

use crate::ctx::{Ctx, SubjectRecord};
use crate::response::{Assessment, ResponseCategory};
use crate::schema::v1::{
    BestResponse, BorCounts, InputMeta, RecistV1, SubjectReport, TimepointRow,
};

pub fn build_report(ctx: &Ctx) -> Result<RecistV1> {
    let input_meta = InputMeta {
        lesion_rows: ctx.input_meta.lesion_rows,
        subjects: ctx.input_meta.subjects,
        assessments: ctx.input_meta.assessments,
        baseline_reference: ctx.baseline_path.is_some(),
    };

    let mut subjects = Vec::with_capacity(ctx.subjects.len());
    for record in &ctx.subjects {
        subjects.push(subject_report(record)?);
    }

    Ok(RecistV1 {
        tool: "kira-recist".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        schema_version: "v1".to_string(),
        input_meta,
        criteria: ctx.criteria.clone(),
        bor_counts: bor_counts(&ctx.subjects),
        subjects,
        errors: ctx
            .subjects
            .iter()
            .flat_map(|s| s.errors.iter().map(|e| e.to_string()))
            .collect(),
        warnings: ctx.warnings.clone(),
    })
}

pub fn write_json(path: &Path, report: &RecistV1) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

pub fn bor_counts(subjects: &[SubjectRecord]) -> BorCounts {
    let mut counts = BorCounts::default();
    for s in subjects {
        match s.bor.as_ref().map(|b| b.bor) {
            Some(ResponseCategory::Cr) => counts.cr += 1,
            Some(ResponseCategory::Pr) => counts.pr += 1,
            Some(ResponseCategory::Sd) => counts.sd += 1,
            Some(ResponseCategory::Pd) => counts.pd += 1,
            Some(ResponseCategory::Ne) | None => counts.ne += 1,
        }
    }
    counts
}

fn subject_report(record: &SubjectRecord) -> Result<SubjectReport> {
    let bor = record
        .bor
        .as_ref()
        .with_context(|| format!("subject {}: best overall response missing", record.subject_id))?;
    let timeline = record.timeline.as_ref();

    Ok(SubjectReport {
        subject_id: record.subject_id.clone(),
        reference_date: timeline.map(|t| t.reference_date).or(record.reference_date),
        baseline_date: timeline.map(|t| t.baseline_date),
        target_lesions: timeline
            .map(|t| t.target_set.lesion_ids())
            .unwrap_or_default(),
        nontarget_lesions: timeline.map(|t| t.nontarget_ids.clone()).unwrap_or_default(),
        best_response: BestResponse {
            bor: bor.bor,
            bor_date: bor.bor_date,
            confirmed: bor.confirmed,
            basis: bor.basis.clone(),
        },
        timepoints: timeline
            .map(|t| t.assessments.iter().map(timepoint_row).collect())
            .unwrap_or_default(),
        errors: record.errors.iter().map(|e| e.to_string()).collect(),
        warnings: record.warnings.iter().map(|w| w.to_string()).collect(),
    })
}

fn timepoint_row(a: &Assessment) -> TimepointRow {
    TimepointRow {
        assessment_date: a.assessment_date,
        study_day: a.study_day,
        baseline: a.is_baseline,
        sld_mm: a.target.sld_mm,
        pchg_base: a.target.pchg_base,
        nadir_mm: a.target.nadir_mm,
        pchg_nadir: a.target.pchg_nadir,
        achg_nadir: a.target.achg_nadir,
        target_response: a.target_category,
        nontarget_response: a.nontarget_category,
        new_lesion: a.new_lesion,
        overall_response: a.overall_response,
        note: a.ambiguity.clone(),
    }
}
