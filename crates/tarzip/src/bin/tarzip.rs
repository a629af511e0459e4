use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use tarzip::{convert_to_zip, CompressionLevel, ExtractOptions, JobSource, JobSpec};

/// Convert a (gzipped) tar archive into a deterministic zip file.
#[derive(Parser)]
#[command(name = "tarzip", version)]
struct Args {
    /// Source archive (.tar or .tgz/.tar.gz, auto-detected).
    archive: PathBuf,

    /// Destination zip file.
    output: PathBuf,

    /// Drop this many leading path components from every entry.
    #[arg(long, default_value_t = 0)]
    strip_components: usize,

    /// Place entries under this directory inside the zip.
    #[arg(long, default_value = "")]
    prefix: PathBuf,

    /// "mixed" (store-vs-deflate per entry) or a fixed level 0..=9.
    #[arg(long, default_value_t = CompressionLevel::Mixed)]
    compression_level: CompressionLevel,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let spec = JobSpec {
        source: JobSource::Path(args.archive),
        dest: args.output,
        options: ExtractOptions {
            strip_components: args.strip_components,
            prefix_path: args.prefix,
            compression_level: args.compression_level,
        },
    };
    let dest = convert_to_zip(&spec)?;
    println!("{}", dest.display());
    Ok(())
}
