use anyhow::Result;
use clap::Parser;
use mimalloc::MiMalloc;
use tendril_rs::{cli, pipeline};
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<()> {
    let args = cli::Args::parse();

    // Initialize tracing subscriber
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.quiet {
            EnvFilter::new("warn")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let stats = pipeline::run(&args)?;
    tracing::info!(
        contigs = stats.contigs,
        extended = stats.extended,
        failed = stats.failed,
        left_bases = stats.left_bases,
        right_bases = stats.right_bases,
        "tendril-rs: extension complete"
    );
    Ok(())
}
