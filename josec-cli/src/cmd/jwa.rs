//! josec jwa command

use clap::Args;
use josec::{
    error::BoxError,
    io::STD_STREAM,
    jwa::{self, ListConfig},
};

#[derive(Debug, Args)]
/// list the supported algorithms
pub struct CliCommandJwa {
    #[arg(long, short = 'k')]
    /// list key types
    key_type: bool,

    #[arg(long, short = 'e')]
    /// list elliptic curves
    elliptic_curve: bool,

    #[arg(long, short = 'K')]
    /// list key encryption algorithms
    key_encryption: bool,

    #[arg(long, short = 'c')]
    /// list content encryption algorithms
    content_encryption: bool,

    #[arg(long, short = 's')]
    /// list signature algorithms
    signature: bool,

    #[arg(long, short = 'o', default_value = STD_STREAM)]
    /// output file (- for stdout)
    output: String,
}

/// run the josec jwa command
pub fn run(cfg: CliCommandJwa) -> Result<(), BoxError> {
    jwa::run(&ListConfig {
        key_types: cfg.key_type,
        curves: cfg.elliptic_curve,
        key_encryption: cfg.key_encryption,
        content_encryption: cfg.content_encryption,
        signature: cfg.signature,
        output: cfg.output,
    })
}
