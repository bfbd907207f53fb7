use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use kira_recist::cli::{Cli, Commands, CriteriaCommand, CriteriaShowArgs};
use kira_recist::criteria;
use kira_recist::ctx::Ctx;
use kira_recist::io;
use kira_recist::pipeline::Pipeline;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let mut ctx = Ctx::new(
                args.input,
                args.out,
                args.baseline,
                args.criteria,
                args.json,
                args.tsv,
                env!("CARGO_PKG_VERSION"),
            );
            ctx.write_rs = args.rs;
            ctx.study_id = args.study_id;
            ctx.threads = args.threads;

            Pipeline::full().run(&mut ctx)?;
            print_summary(&ctx)?;
        }
        Commands::Validate(args) => {
            let mut ctx = Ctx::new(
                args.input,
                PathBuf::from("."),
                args.baseline,
                args.criteria,
                false,
                false,
                env!("CARGO_PKG_VERSION"),
            );

            Pipeline::validate().run(&mut ctx)?;
            print_validate_summary(&ctx);
        }
        Commands::Criteria(args) => match args.command {
            CriteriaCommand::Show(show) => handle_criteria_show(show)?,
        },
    }

    Ok(())
}

fn print_summary(ctx: &Ctx) -> Result<()> {
    let summary = io::summary::format_summary(ctx)?;
    print!("{}", summary);
    print_warnings(ctx);
    Ok(())
}

fn print_validate_summary(ctx: &Ctx) {
    println!("kira-recist validate ok");
    println!("lesion rows: {}", ctx.input_meta.lesion_rows.unwrap_or(0));
    println!("subjects: {}", ctx.subjects.len());
    println!("assessments: {}", ctx.input_meta.assessments.unwrap_or(0));
    println!("data quality errors: {}", ctx.error_count());
    for record in &ctx.subjects {
        for err in &record.errors {
            println!("- {}", err);
        }
    }
    print_warnings(ctx);
}

fn print_warnings(ctx: &Ctx) {
    if !ctx.warnings.is_empty() {
        println!("warnings:");
        for warning in &ctx.warnings {
            println!("- {}", warning);
        }
    }
}

fn handle_criteria_show(args: CriteriaShowArgs) -> Result<()> {
    let resolved = criteria::load_criteria(args.criteria.as_deref())?;
    println!("criteria:");
    for (key, value) in resolved.entries() {
        println!("{}\t{}", key, value);
    }
    Ok(())
}
