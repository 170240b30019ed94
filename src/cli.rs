use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::extract::{DEFAULT_EU_THRESHOLD, DEFAULT_WIDTH, ExtractionConfig};
use crate::model::Intl;

#[derive(Parser, Debug)]
#[command(
    name = "last-sizing",
    version,
    about = "Extract shoe sizing reports from archived size-thread snapshots"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Extract(ExtractArgs),
    Query(QueryArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ExtractionOptions {
    #[arg(long, default_value_t = DEFAULT_EU_THRESHOLD)]
    pub eu_threshold: f64,

    #[arg(long, value_enum, ignore_case = true, default_value_t = Intl::Us)]
    pub default_intl: Intl,

    #[arg(long, default_value = DEFAULT_WIDTH)]
    pub default_width: String,
}

impl ExtractionOptions {
    pub fn to_config(&self) -> ExtractionConfig {
        ExtractionConfig {
            eu_threshold: self.eu_threshold,
            default_intl: self.default_intl,
            default_width: self.default_width.trim().to_ascii_uppercase(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long)]
    pub source: PathBuf,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    #[command(flatten)]
    pub extraction: ExtractionOptions,
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    #[arg(long = "source", required = true)]
    pub sources: Vec<PathBuf>,

    #[arg(long, conflicts_with = "mlast")]
    pub size: Option<String>,

    #[arg(long)]
    pub mlast: Option<String>,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[command(flatten)]
    pub extraction: ExtractionOptions,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long = "source", required = true)]
    pub sources: Vec<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[command(flatten)]
    pub extraction: ExtractionOptions,
}
