use std::collections::BTreeMap;

use anyhow::Result;
use tracing::{info, warn};

use crate::ctx::{Ctx, SubjectRecord};
use crate::pipeline::Stage;

pub struct Stage2Subjects;

impl Stage2Subjects {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage2Subjects {
    fn name(&self) -> &'static str {
        "stage2_subjects"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let mut by_subject: BTreeMap<String, SubjectRecord> = BTreeMap::new();
        for row in std::mem::take(&mut ctx.measurements) {
            let record = by_subject.entry(row.subject_id.clone()).or_insert_with(|| {
                SubjectRecord::new(&row.subject_id, ctx.baseline_dates.get(&row.subject_id).copied())
            });
            record.rows.push(row);
        }

        for subject_id in ctx.baseline_dates.keys() {
            if !by_subject.contains_key(subject_id) {
                warn!(subject_id = %subject_id, "baseline reference without lesion rows");
                ctx.warnings
                    .push(format!("subject {}: baseline reference without lesion rows", subject_id));
            }
        }

        ctx.subjects = by_subject.into_values().collect();
        ctx.input_meta.subjects = Some(ctx.subjects.len() as u64);
        ctx.report.input_meta.subjects = ctx.input_meta.subjects;
        info!(subjects = ctx.subjects.len(), "subjects_grouped");
        Ok(())
    }
}
