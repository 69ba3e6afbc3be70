//! entrypoint for josec-cli

#![cfg_attr(docsrs, feature(doc_cfg))]

use clap::{Parser, Subcommand};
use josec::error::BoxError;
use tracing::level_filters::LevelFilter;

pub mod cmd;
use self::cmd::{jwa, jwe, jwk, jws, version};

pub mod trace;

#[derive(Debug, Parser)]
#[command(name = "josec")]
#[command(bin_name = "josec")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmds: CliCommands,
}

#[derive(Debug, Subcommand)]
enum CliCommands {
    Jwk(jwk::CliCommandJwk),
    Jwe(jwe::CliCommandJwe),
    Jws(jws::CliCommandJws),
    Jwa(jwa::CliCommandJwa),
    Version(version::CliCommandVersion),
}

fn main() {
    let cli = Cli::parse();

    #[expect(clippy::exit)]
    if let Err(err) = run(cli) {
        eprintln!("🚩 exit with error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), BoxError> {
    trace::init_tracing(LevelFilter::WARN)?;

    match cli.cmds {
        CliCommands::Jwk(cfg) => jwk::run(cfg),
        CliCommands::Jwe(cfg) => jwe::run(cfg),
        CliCommands::Jws(cfg) => jws::run(cfg),
        CliCommands::Jwa(cfg) => jwa::run(cfg),
        CliCommands::Version(_) => version::run(),
    }
}
