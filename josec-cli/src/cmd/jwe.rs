//! josec jwe command

use clap::{Args, Subcommand};
use josec::{
    error::BoxError,
    io::STD_STREAM,
    jwe::{self, DecryptConfig, EncryptConfig},
};

#[derive(Debug, Args)]
/// encrypt and decrypt JSON Web Encryption messages
pub struct CliCommandJwe {
    #[command(subcommand)]
    cmd: JweCommand,
}

#[derive(Debug, Subcommand)]
enum JweCommand {
    #[command(visible_alias = "enc")]
    Encrypt(CliCommandEncrypt),
    #[command(visible_alias = "dec")]
    Decrypt(CliCommandDecrypt),
}

#[derive(Debug, Args)]
/// encrypt a payload into a compact JWE
struct CliCommandEncrypt {
    /// payload file (- for stdin)
    #[arg(default_value = STD_STREAM)]
    input: String,

    #[arg(long, short = 'k')]
    /// key file holding exactly one key
    key: String,

    #[arg(long, short = 'F', default_value = "json")]
    /// key file format (json or pem)
    key_format: String,

    #[arg(long, short = 'K')]
    /// key encryption algorithm (e.g. RSA-OAEP-256, ECDH-ES+A128KW, dir)
    key_encryption: String,

    #[arg(long, short = 'c', default_value = "A256GCM")]
    /// content encryption algorithm
    content_encryption: String,

    #[arg(long, short = 'z')]
    /// compress the payload with DEFLATE before encryption
    compress: bool,

    #[arg(long, short = 'o', default_value = STD_STREAM)]
    /// output file (- for stdout)
    output: String,
}

impl From<CliCommandEncrypt> for EncryptConfig {
    fn from(cmd: CliCommandEncrypt) -> Self {
        Self {
            key: cmd.key,
            key_format: cmd.key_format,
            key_encryption: cmd.key_encryption,
            content_encryption: cmd.content_encryption,
            compress: cmd.compress,
            input: cmd.input,
            output: cmd.output,
        }
    }
}

#[derive(Debug, Args)]
/// decrypt a JWE and output its payload
struct CliCommandDecrypt {
    /// message file (- for stdin)
    #[arg(default_value = STD_STREAM)]
    input: String,

    #[arg(long, short = 'k')]
    /// key file holding exactly one key
    key: String,

    #[arg(long, short = 'F', default_value = "json")]
    /// key file format (json or pem)
    key_format: String,

    #[arg(long, short = 'K', default_value = "")]
    /// expected key encryption algorithm
    ///
    /// When omitted the algorithm is taken from the message header.
    key_encryption: String,

    #[arg(long, short = 'o', default_value = STD_STREAM)]
    /// output file (- for stdout)
    output: String,
}

impl From<CliCommandDecrypt> for DecryptConfig {
    fn from(cmd: CliCommandDecrypt) -> Self {
        Self {
            key: cmd.key,
            key_format: cmd.key_format,
            key_encryption: cmd.key_encryption,
            input: cmd.input,
            output: cmd.output,
        }
    }
}

/// run the josec jwe command
pub fn run(cfg: CliCommandJwe) -> Result<(), BoxError> {
    match cfg.cmd {
        JweCommand::Encrypt(cmd) => jwe::run_encrypt(&cmd.into()),
        JweCommand::Decrypt(cmd) => jwe::run_decrypt(&cmd.into()),
    }
}
