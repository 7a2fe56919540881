use anyhow::{Context, Result};
use clap::Parser;
use mailmerge::cli::Cli;
use mailmerge::MailMerge;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    let report = MailMerge::new(cli.options())
        .run_path(&cli.table, &cli.template)
        .with_context(|| {
            format!(
                "failed to merge {} into {}",
                cli.table.display(),
                cli.template.display()
            )
        })?;

    if report.dry_run {
        for path in &report.files {
            println!("{}", path.display());
        }
    }
    info!(files = report.len(), "done");
    Ok(())
}

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
