//! docshift CLI: reorganize authored course content into a static-site docs tree.
//!
//! Copies content into the generator's layout, rewrites relative links so
//! they keep resolving after the move, and drives the site toolchain.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
