use anyhow::Result;
use tracing::{info, warn};

use crate::criteria::load_criteria;
use crate::ctx::Ctx;
use crate::io::lesions::{read_baseline_dates, read_lesion_feed};
use crate::pipeline::Stage;

pub struct Stage1Input;

impl Stage1Input {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Input {
    fn name(&self) -> &'static str {
        "stage1_input"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        ctx.criteria = load_criteria(ctx.criteria_path.as_deref())?;
        ctx.report.criteria = ctx.criteria.clone();

        let measurements = read_lesion_feed(&ctx.input)?;
        if measurements.is_empty() {
            warn!(input = %ctx.input.display(), "lesion feed has no rows");
            ctx.warnings.push("lesion feed has no rows".to_string());
        }
        if let Some(path) = &ctx.baseline_path {
            ctx.baseline_dates = read_baseline_dates(path)?;
        }

        ctx.input_meta.lesion_rows = Some(measurements.len() as u64);
        ctx.report.input_meta.lesion_rows = ctx.input_meta.lesion_rows;
        ctx.report.input_meta.baseline_reference = ctx.baseline_path.is_some();
        ctx.measurements = measurements;

        info!(
            rows = ctx.measurements.len(),
            baseline_refs = ctx.baseline_dates.len(),
            "lesion_feed_loaded"
        );
        Ok(())
    }
}
