use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::io::{json_writer, rs_domain, tsv_writer};
use crate::pipeline::Stage;

pub struct Stage4Output;

impl Stage4Output {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage4Output {
    fn name(&self) -> &'static str {
        "stage4_output"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let report = json_writer::build_report(ctx)?;
        ctx.report = report;

        if ctx.write_json {
            json_writer::write_json(&ctx.output.json_path, &ctx.report)?;
        }
        if ctx.write_tsv {
            tsv_writer::write_timepoints_tsv(&ctx.output.timepoints_path, ctx)?;
            tsv_writer::write_bor_tsv(&ctx.output.bor_path, ctx)?;
        }
        if ctx.write_rs {
            rs_domain::write_rs_tsv(&ctx.output.rs_path, ctx)?;
        }

        info!("stage4_output_ready");
        Ok(())
    }
}
