use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ldfusion",
    about = "Fuse RDF quads from several sources into one canonical dataset",
    version
)]
pub struct Cli {
    /// Path to the fusion config file (TOML, or JSON with a .json extension)
    pub config: PathBuf,

    /// Directory for temporary sort files (overrides [processing].work_dir)
    #[arg(long, env = "LDFUSION_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// In-memory sort budget in MiB (overrides [processing].memory_limit_mb)
    #[arg(long)]
    pub memory_limit_mb: Option<u64>,

    /// Only output resources whose subject is an explicit canonical URI
    #[arg(long)]
    pub mapped_subjects_only: bool,

    /// Output N-Quads file (overrides [output].path)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long)]
    pub no_color: bool,
}
