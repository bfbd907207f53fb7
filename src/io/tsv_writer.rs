use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::ctx::Ctx;
use crate::io::fmt_opt;

pub fn write_timepoints_tsv(path: &Path, ctx: &Ctx) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);

    writeln!(
        w,
        "subject_id\tassessment_date\tstudy_day\tbaseline\tsld_mm\tpchg_base\tnadir_mm\tpchg_nadir\tachg_nadir\ttarget\tnontarget\tnew_lesion\toverall"
    )?;
    for record in &ctx.subjects {
        let Some(timeline) = &record.timeline else {
            continue;
        };
        for a in &timeline.assessments {
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                a.subject_id,
                a.assessment_date,
                a.study_day,
                if a.is_baseline { "Y" } else { "N" },
                fmt_opt(a.target.sld_mm),
                fmt_opt(a.target.pchg_base),
                fmt_opt(a.target.nadir_mm),
                fmt_opt(a.target.pchg_nadir),
                fmt_opt(a.target.achg_nadir),
                a.target_category.map(|c| c.as_str()).unwrap_or(""),
                a.nontarget_category.map(|c| c.as_str()).unwrap_or(""),
                if a.new_lesion { "Y" } else { "N" },
                a.overall_response.map(|c| c.as_str()).unwrap_or(""),
            )?;
        }
    }
    w.flush()?;
    Ok(())
}

pub fn write_bor_tsv(path: &Path, ctx: &Ctx) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);

    writeln!(w, "subject_id\tbor\tbor_date\tconfirmed\tbasis")?;
    for record in &ctx.subjects {
        let bor = record
            .bor
            .as_ref()
            .with_context(|| format!("subject {}: best overall response missing", record.subject_id))?;
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}",
            bor.subject_id,
            bor.bor,
            bor.bor_date.map(|d| d.to_string()).unwrap_or_default(),
            if bor.confirmed { "Y" } else { "N" },
            sanitize(&bor.basis)
        )?;
    }
    w.flush()?;
    Ok(())
}

pub(crate) fn sanitize(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}
