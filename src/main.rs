use anyhow::{Context, Result};
use clap::Parser;
use parscale::cli::Cli;
use parscale::render::renderer_for;
use parscale::report::{Dataset, ReportBuilder};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; warnings by default, everything with --debug
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = args.analysis_config()?;
    let paths = args.input_paths();
    if paths.sequential.is_none() && paths.shared_memory.is_none() && paths.distributed.is_none() {
        anyhow::bail!(
            "No input tables. Use --sequential, --omp, --mpi or --data-dir DIR \
             (expects sequential_results.csv, omp_results.csv, mpi_results.csv)"
        );
    }

    let dataset = Dataset::load(&paths, config.invalid_timing);
    let report = ReportBuilder::new(&dataset, &config).build(&args.analyses());
    let renderer = renderer_for(args.format);

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            renderer.render(&report, &mut writer)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            renderer.render(&report, &mut lock)?;
            lock.flush()?;
        }
    }

    Ok(())
}
