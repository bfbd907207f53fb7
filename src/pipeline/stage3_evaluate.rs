use anyhow::Result;
use tracing::{info, warn};

use crate::ctx::Ctx;
use crate::fanout::for_each_subject;
use crate::pipeline::Stage;
use crate::response::timeline::evaluate_subject;

pub struct Stage3Evaluate;

impl Stage3Evaluate {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage3Evaluate {
    fn name(&self) -> &'static str {
        "stage3_evaluate"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let criteria = ctx.criteria.clone();
        for_each_subject(&mut ctx.subjects, ctx.threads, |record| {
            let eval = evaluate_subject(
                &record.subject_id,
                &record.rows,
                record.reference_date,
                &criteria,
            );
            record.timeline = eval.timeline;
            record.bor = Some(eval.bor);
            record.errors = eval.errors;
            record.warnings = eval.warnings;
        })?;

        let mut assessments = 0u64;
        for record in &ctx.subjects {
            for err in &record.errors {
                warn!(subject_id = %record.subject_id, error = %err, "subject_data_quality");
            }
            for w in &record.warnings {
                warn!(subject_id = %record.subject_id, "{}", w);
                ctx.warnings.push(w.to_string());
            }
            if let Some(t) = &record.timeline {
                assessments += t.assessments.len() as u64;
            }
        }
        ctx.input_meta.assessments = Some(assessments);
        ctx.report.input_meta.assessments = ctx.input_meta.assessments;
        info!(assessments, subjects = ctx.subjects.len(), "subjects_evaluated");
        Ok(())
    }
}
