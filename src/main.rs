#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;

use a0_install::cli::{Cli, Mode};
use a0_install::config::Config;
use a0_install::procedures;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Everything the procedures need is resolved here, once. Nothing below
    // this point reads argv, $HOME or $USER again.
    let config = Config::resolve(&cli)?;

    match config.mode {
        Mode::Docker => procedures::docker::execute(&config)?,
        Mode::Native => procedures::native::execute(&config)?,
    }

    Ok(())
}
