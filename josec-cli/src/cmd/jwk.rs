//! josec jwk command

use clap::{Args, Subcommand};
use josec::{
    error::BoxError,
    io::STD_STREAM,
    jwk::{self, DEFAULT_KEY_SIZE, GenerateConfig},
};

#[derive(Debug, Args)]
/// generate JSON Web Keys
pub struct CliCommandJwk {
    #[command(subcommand)]
    cmd: JwkCommand,
}

#[derive(Debug, Subcommand)]
enum JwkCommand {
    Generate(CliCommandGenerate),
}

#[derive(Debug, Args)]
/// generate a new key
struct CliCommandGenerate {
    #[arg(long = "type", short = 't')]
    /// key type (RSA, EC, OKP or oct)
    key_type: String,

    #[arg(long, short = 'c', default_value = "")]
    /// curve of an EC or OKP key (e.g. P-256, Ed25519, X25519)
    curve: String,

    #[arg(long, short = 's', default_value_t = DEFAULT_KEY_SIZE)]
    /// key size, in bits for RSA and in bytes for oct
    ///
    /// Must be a multiple of 256 and at least 256.
    size: usize,

    #[arg(long, short = 'O', default_value = "json")]
    /// output format (json or pem)
    output_format: String,

    #[arg(long, short = 'o', default_value = STD_STREAM)]
    /// output file (- for stdout)
    output: String,

    #[arg(long, short = 'p')]
    /// only output the public key
    public_key: bool,

    #[arg(long, default_value = "")]
    /// key id to stamp on the generated key
    kid: String,

    #[arg(long, default_value = "")]
    /// intended algorithm to stamp on the generated key
    alg: String,
}

impl From<CliCommandGenerate> for GenerateConfig {
    fn from(cmd: CliCommandGenerate) -> Self {
        Self {
            curve: cmd.curve,
            key_type: cmd.key_type,
            key_size: cmd.size,
            output_format: cmd.output_format,
            output: cmd.output,
            public_key: cmd.public_key,
            kid: cmd.kid,
            algorithm: cmd.alg,
        }
    }
}

/// run the josec jwk command
pub fn run(cfg: CliCommandJwk) -> Result<(), BoxError> {
    match cfg.cmd {
        JwkCommand::Generate(cmd) => jwk::run(&cmd.into()),
    }
}
