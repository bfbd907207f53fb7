use anyhow::Result;

use crate::ctx::Ctx;
use crate::io::json_writer::bor_counts;

pub fn format_summary(ctx: &Ctx) -> Result<String> {
    let version = env!("CARGO_PKG_VERSION");
    let subjects = ctx.input_meta.subjects.unwrap_or(0);
    let assessments = ctx.input_meta.assessments.unwrap_or(0);
    let rows = ctx.input_meta.lesion_rows.unwrap_or(0);
    let counts = bor_counts(&ctx.subjects);

    let mut out = String::new();
    out.push_str(&format!("kira-recist v{}\n", version));
    out.push_str(&format!(
        "Input: {} lesion rows, {} subjects, {} assessments\n",
        rows, subjects, assessments
    ));
    out.push_str(&format!(
        "BOR: CR={} PR={} SD={} PD={} NE={}\n",
        counts.cr, counts.pr, counts.sd, counts.pd, counts.ne
    ));

    let confirmed = ctx
        .subjects
        .iter()
        .filter(|s| s.bor.as_ref().is_some_and(|b| b.confirmed))
        .count();
    out.push_str(&format!("Confirmed responses: {}\n", confirmed));

    let failed: Vec<&str> = ctx
        .subjects
        .iter()
        .filter(|s| !s.errors.is_empty())
        .map(|s| s.subject_id.as_str())
        .collect();
    if failed.is_empty() {
        out.push_str("Data quality errors: none\n");
    } else {
        out.push_str(&format!(
            "Data quality errors: {} ({})\n",
            ctx.error_count(),
            failed.join(", ")
        ));
    }

    Ok(out)
}
