//! josec jws command

use clap::{Args, Subcommand};
use josec::{
    error::BoxError,
    io::STD_STREAM,
    jws::{self, ParseConfig, SignConfig, VerifyConfig},
};

#[derive(Debug, Args)]
/// sign, verify and inspect JSON Web Signatures
pub struct CliCommandJws {
    #[command(subcommand)]
    cmd: JwsCommand,
}

#[derive(Debug, Subcommand)]
enum JwsCommand {
    Sign(CliCommandSign),
    Verify(CliCommandVerify),
    Parse(CliCommandParse),
}

#[derive(Debug, Args)]
/// sign a payload into a compact JWS
struct CliCommandSign {
    /// payload file (- for stdin)
    #[arg(default_value = STD_STREAM)]
    input: String,

    #[arg(long, short = 'a', default_value = "")]
    /// signature algorithm (e.g. HS256, RS256, ES256, EdDSA, none)
    algorithm: String,

    #[arg(long, short = 'k')]
    /// key file holding exactly one key
    key: String,

    #[arg(long, short = 'F', default_value = "json")]
    /// key file format (json or pem)
    key_format: String,

    #[arg(long, short = 'H', default_value = "")]
    /// extra protected header members, as a JSON object
    header: String,

    #[arg(long, short = 'o', default_value = STD_STREAM)]
    /// output file (- for stdout)
    output: String,
}

impl From<CliCommandSign> for SignConfig {
    fn from(cmd: CliCommandSign) -> Self {
        Self {
            algorithm: cmd.algorithm,
            key: cmd.key,
            key_format: cmd.key_format,
            header: cmd.header,
            input: cmd.input,
            output: cmd.output,
        }
    }
}

#[derive(Debug, Args)]
/// verify a JWS and output its payload
struct CliCommandVerify {
    /// message file (- for stdin)
    #[arg(default_value = STD_STREAM)]
    input: String,

    #[arg(long, short = 'a', default_value = "")]
    /// signature algorithm every key is tried with
    algorithm: String,

    #[arg(long, short = 'k')]
    /// key file, may hold a set of keys
    key: String,

    #[arg(long, short = 'F', default_value = "json")]
    /// key file format (json or pem)
    key_format: String,

    #[arg(long, short = 'm')]
    /// select keys by the kid and alg of the message instead
    match_kid: bool,

    #[arg(long, short = 'o', default_value = STD_STREAM)]
    /// output file (- for stdout)
    output: String,
}

impl From<CliCommandVerify> for VerifyConfig {
    fn from(cmd: CliCommandVerify) -> Self {
        Self {
            algorithm: cmd.algorithm,
            key: cmd.key,
            key_format: cmd.key_format,
            match_kid: cmd.match_kid,
            input: cmd.input,
            output: cmd.output,
        }
    }
}

#[derive(Debug, Args)]
/// print the payload and headers of a JWS without verifying it
struct CliCommandParse {
    /// message file, - for stdin, or the message itself
    #[arg(default_value = STD_STREAM)]
    input: String,

    #[arg(long, short = 'o', default_value = STD_STREAM)]
    /// output file (- for stdout)
    output: String,
}

impl From<CliCommandParse> for ParseConfig {
    fn from(cmd: CliCommandParse) -> Self {
        Self {
            input: cmd.input,
            output: cmd.output,
        }
    }
}

/// run the josec jws command
pub fn run(cfg: CliCommandJws) -> Result<(), BoxError> {
    match cfg.cmd {
        JwsCommand::Sign(cmd) => jws::run_sign(&cmd.into()),
        JwsCommand::Verify(cmd) => jws::run_verify(&cmd.into()),
        JwsCommand::Parse(cmd) => jws::run_parse(&cmd.into()),
    }
}
