use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "kira-recist",
    version,
    about = "RECIST 1.1 tumor response classification"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Run(RunArgs),
    Validate(ValidateArgs),
    Criteria(CriteriaArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long, help = "Lesion measurement feed (TSV, optionally .gz)")]
    pub input: PathBuf,

    #[arg(long)]
    pub out: PathBuf,

    #[arg(long, help = "Per-subject baseline reference dates (subject_id<TAB>date)")]
    pub baseline: Option<PathBuf>,

    #[arg(long, help = "Criteria TSV to overlay on the built-in RECIST 1.1 table")]
    pub criteria: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long, default_value_t = false)]
    pub tsv: bool,

    #[arg(long, default_value_t = false, help = "Also write an RS-domain table")]
    pub rs: bool,

    #[arg(long, default_value = "STUDY", help = "STUDYID for the RS-domain table")]
    pub study_id: String,

    #[arg(long, default_value_t = 0, help = "Number of threads (0 = auto)")]
    pub threads: usize,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[arg(long, help = "Lesion measurement feed (TSV, optionally .gz)")]
    pub input: PathBuf,

    #[arg(long)]
    pub baseline: Option<PathBuf>,

    #[arg(long)]
    pub criteria: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CriteriaArgs {
    #[command(subcommand)]
    pub command: CriteriaCommand,
}

#[derive(Debug, Subcommand)]
pub enum CriteriaCommand {
    Show(CriteriaShowArgs),
}

#[derive(Debug, Args)]
pub struct CriteriaShowArgs {
    #[arg(long, help = "Optional criteria TSV to overlay on the built-in table")]
    pub criteria: Option<PathBuf>,
}
