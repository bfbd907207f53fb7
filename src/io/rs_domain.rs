//! SDTM RS-domain style export of timepoint and best overall responses.

use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::ctx::{Ctx, SubjectRecord};
use crate::io::tsv_writer::sanitize;

const RS_CATEGORY: &str = "RECIST 1.1";
const RS_COLUMNS: [&str; 14] = [
    "STUDYID", "DOMAIN", "USUBJID", "RSSEQ", "RSTESTCD", "RSTEST", "RSCAT", "RSORRES",
    "RSSTRESC", "RSSTRESN", "VISITNUM", "VISIT", "RSDTC", "RSDY",
];

#[derive(Debug, Clone, PartialEq)]
pub struct RsRecord {
    pub studyid: String,
    pub usubjid: String,
    pub rsseq: u32,
    pub rstestcd: &'static str,
    pub rstest: &'static str,
    pub rsorres: String,
    /// 1-based position of the assessment in the subject timeline (baseline = 1).
    pub visitnum: Option<u32>,
    pub rsdtc: Option<NaiveDate>,
    pub rsdy: Option<i64>,
}

pub fn build_rs_records(study_id: &str, subjects: &[SubjectRecord]) -> Vec<RsRecord> {
    let mut out = Vec::new();
    for record in subjects {
        let mut seq = 0u32;
        let mut push = |testcd: &'static str,
                        test: &'static str,
                        value: String,
                        visitnum: Option<u32>,
                        date: Option<NaiveDate>,
                        day: Option<i64>| {
            seq += 1;
            out.push(RsRecord {
                studyid: study_id.to_string(),
                usubjid: record.subject_id.clone(),
                rsseq: seq,
                rstestcd: testcd,
                rstest: test,
                rsorres: value,
                visitnum,
                rsdtc: date,
                rsdy: day,
            });
        };

        if let Some(timeline) = &record.timeline {
            for (idx, a) in timeline.assessments.iter().enumerate() {
                if a.is_baseline {
                    continue;
                }
                let visit = Some(idx as u32 + 1);
                let date = Some(a.assessment_date);
                let day = Some(a.study_day);
                if let Some(target) = a.target_category {
                    push("TRGRESP", "Target Response", target.to_string(), visit, date, day);
                }
                if let Some(nontarget) = a.nontarget_category {
                    push("NTRGRESP", "Non-target Response", nontarget.to_string(), visit, date, day);
                }
                let new_lesion = if a.new_lesion { "Y" } else { "N" };
                push("NEWLIND", "New Lesion Indicator", new_lesion.to_string(), visit, date, day);
                if let Some(overall) = a.overall_response {
                    push("OVRLRESP", "Overall Response", overall.to_string(), visit, date, day);
                }
            }
        }

        if let Some(bor) = &record.bor {
            let day = match (&record.timeline, bor.bor_date) {
                (Some(t), Some(d)) => t
                    .assessments
                    .iter()
                    .find(|a| a.assessment_date == d)
                    .map(|a| a.study_day),
                _ => None,
            };
            push(
                "BESTRSP",
                "Best Overall Response",
                bor.bor.to_string(),
                None,
                bor.bor_date,
                day,
            );
        }
    }
    out
}

pub fn write_rs_tsv(path: &Path, ctx: &Ctx) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);

    writeln!(w, "{}", RS_COLUMNS.join("\t"))?;
    for r in build_rs_records(&ctx.study_id, &ctx.subjects) {
        writeln!(
            w,
            "{}\tRS\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t\t{}\t{}\t{}\t{}",
            sanitize(&r.studyid),
            sanitize(&r.usubjid),
            r.rsseq,
            r.rstestcd,
            r.rstest,
            RS_CATEGORY,
            r.rsorres,
            r.rsorres,
            r.visitnum.map(|v| v.to_string()).unwrap_or_default(),
            r.visitnum.map(|v| format!("ASSESSMENT {}", v)).unwrap_or_default(),
            r.rsdtc.map(|d| d.to_string()).unwrap_or_default(),
            r.rsdy.map(|d| d.to_string()).unwrap_or_default(),
        )?;
    }
    w.flush()?;
    Ok(())
}
