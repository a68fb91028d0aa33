//! # Sphaira
//!
//! Entry point for the sphairahedron viewer binary.
//!
//! By default the viewer renders headless on the CPU and writes a PNG; with
//! the `window` feature, `--window` opens an interactive window instead.

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = sphaira::app::Args::parse();
    sphaira::app::run(&args)
}
