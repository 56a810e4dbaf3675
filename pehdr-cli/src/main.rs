use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;

/// Dump the DOS, COFF and optional headers of a PE image
#[derive(Parser)]
#[command(
    name = "pehdr",
    about = "Print the DOS, COFF and optional headers of a Portable Executable",
    version,
    author
)]
struct Cli {
    /// Path to the image; defaults to this executable
    path: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let path = match cli.path {
        Some(path) => path,
        None => std::env::current_exe().context("cannot locate the running executable")?,
    };
    log::info!("inspecting {}", path.display());

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let result = pehdr_core::inspect_file(&path, &mut out);
    // flush whatever headers decoded before a failure
    out.flush()?;
    result.with_context(|| format!("failed to inspect {}", path.display()))?;

    Ok(())
}
