//! josec version command

use clap::Args;
use josec::error::{BoxError, ErrorContext as _};

use std::io::Write as _;

#[derive(Debug, Args)]
/// print the version of josec
pub struct CliCommandVersion {}

/// run the josec version command
pub fn run() -> Result<(), BoxError> {
    let mut stdout = std::io::stdout().lock();
    writeln!(
        stdout,
        "{} version {} (under MIT LICENSE)",
        env!("CARGO_BIN_NAME"),
        env!("CARGO_PKG_VERSION"),
    )
    .context("write version")?;
    Ok(())
}
