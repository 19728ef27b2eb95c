mod cli;
mod config_file;
mod error;
mod output;
mod resolve;
mod run;

use clap::Parser;
use cli::Cli;
use colored::Colorize;
use config_file::ConfigOverrides;
use error::exit_with_error;
use resolve::AllValuesResolver;

fn init_tracing(cli: &Cli) {
    // --quiet  → "off"
    // --verbose → RUST_LOG if set, otherwise "info"
    // default  → "warn", so failed temp-file cleanup still shows up
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    let ansi = !(cli.no_color || std::env::var_os("NO_COLOR").is_some());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    init_tracing(&cli);

    if let Err(e) = run(cli) {
        exit_with_error(e);
    }
}

fn run(cli: Cli) -> error::CliResult<()> {
    let overrides = ConfigOverrides {
        work_dir: cli.work_dir,
        memory_limit_mb: cli.memory_limit_mb,
        mapped_subjects_only: cli.mapped_subjects_only,
        output: cli.output,
    };
    let config = config_file::load_and_resolve(&cli.config, &overrides)?;
    let summary = run::run(&config, &AllValuesResolver)?;

    if !cli.quiet {
        eprintln!(
            "{} {} quads from {} resources written to {}",
            "fused:".green().bold(),
            summary.quads_written,
            summary.blocks,
            config.output.display()
        );
    }
    Ok(())
}
