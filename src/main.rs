//! CLI entry point for the photo-mosaic generator

use clap::Parser;
use photomosaic::io::cli::{Cli, MosaicRunner};

fn main() -> photomosaic::Result<()> {
    let cli = Cli::parse();
    let runner = MosaicRunner::new(cli);
    runner.process()
}
