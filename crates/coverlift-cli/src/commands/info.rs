//! Image info command.
//!
//! Reads only the container header, so it is cheap even for images the
//! size gate would reject.

use crate::InfoArgs;
use anyhow::{Context, Result};
use coverlift_io::decode::{detect_format, probe_dimensions};
use coverlift_worker::WorkerConfig;

pub fn run(args: InfoArgs, config: &WorkerConfig, verbose: bool) -> Result<()> {
    for path in &args.input {
        let bytes = super::read_input(path)?;
        let format = detect_format(&bytes)
            .with_context(|| format!("Unrecognised image: {}", path.display()))?;
        let (width, height) = probe_dimensions(&bytes)
            .with_context(|| format!("Failed to read header: {}", path.display()))?;

        println!("{}", path.display());
        println!("  Format:     {format:?}");
        println!("  Size:       {width}x{height}");
        if verbose {
            println!("  File size:  {} bytes", bytes.len());
        }
        if config.admits(width, height) {
            println!("  Accepted:   yes (limit {}px)", config.max_dimension);
        } else {
            println!("  Accepted:   no, exceeds the {}px limit", config.max_dimension);
        }

        if args.input.len() > 1 {
            println!();
        }
    }

    Ok(())
}
