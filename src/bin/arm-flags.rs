//! Prints `-march`/`-mcpu`/`-mfpu` flags for the host ARM CPU

#![forbid(unsafe_code)]

use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

use kotki_front::cpuflags::{self, CPUINFO_PATH};

/// Determine ARM compiler flags from cpuinfo. Fails without NEON or on
/// CPUs missing from the lookup table.
#[derive(Parser, Debug)]
#[command(name = "arm-flags", version, about)]
struct Args {
    /// cpuinfo file to read
    #[arg(long, default_value = CPUINFO_PATH)]
    cpuinfo: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    kotki_front::logging::init(env!("CARGO_CRATE_NAME"), false);

    let target = cpuflags::detect_from_file(&args.cpuinfo)?;
    tracing::debug!("{:?}", target);

    let mut stdout = std::io::stdout();
    write!(stdout, "{}", target)?;
    stdout.flush()?;
    Ok(())
}
