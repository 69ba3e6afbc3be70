//! Encryption and decryption of JWE messages.
//!
//! JWE is strictly single recipient here: the key file of both
//! operations has to hold exactly one key.

use crate::{
    crypto::jose::{
        CompressionAlgorithm, ContentEncryptionAlgorithm, JWEEncrypter, JWK,
        KeyEncryptionAlgorithm, ParsedJWE,
    },
    error::{BoxError, ErrorKind, ErrorKindExt, JoseError},
    io::{STD_STREAM, read_input, with_output},
    key::{self, KeyFormat},
    output::write_bytes,
    validate::{Check, FieldRule, Validate},
};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Config of the encrypt operation.
pub struct EncryptConfig {
    /// Path of the key file.
    pub key: String,
    pub key_format: String,
    pub key_encryption: String,
    pub content_encryption: String,
    /// Deflate the payload before encryption.
    pub compress: bool,
    /// Path of the payload, `-` for stdin.
    pub input: String,
    pub output: String,
}

impl Default for EncryptConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            key_format: KeyFormat::Json.as_str().to_owned(),
            key_encryption: String::new(),
            content_encryption: ContentEncryptionAlgorithm::A256Gcm.as_str().to_owned(),
            compress: false,
            input: STD_STREAM.to_owned(),
            output: STD_STREAM.to_owned(),
        }
    }
}

impl Validate for EncryptConfig {
    fn rules(&self) -> Vec<FieldRule<'_>> {
        vec![
            FieldRule::new("key", &self.key, &[Check::Required], ErrorKind::RequireKeyFile),
            FieldRule::new(
                "key_encryption",
                &self.key_encryption,
                &[
                    Check::Required,
                    Check::OneOf(&[KeyEncryptionAlgorithm::NAMES]),
                ],
                ErrorKind::InvalidKeyEncryption,
            ),
            FieldRule::new(
                "content_encryption",
                &self.content_encryption,
                &[
                    Check::Required,
                    Check::OneOf(&[ContentEncryptionAlgorithm::NAMES]),
                ],
                ErrorKind::InvalidContentEncryption,
            ),
            FieldRule::new(
                "key_format",
                &self.key_format,
                &[Check::OneOf(&[KeyFormat::NAMES])],
                ErrorKind::InvalidKeyFormat,
            ),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Config of the decrypt operation.
pub struct DecryptConfig {
    /// Path of the key file.
    pub key: String,
    pub key_format: String,
    /// Expected key encryption algorithm.
    ///
    /// If empty the algorithm declared by the message is used.
    pub key_encryption: String,
    /// Path of the message, `-` for stdin.
    pub input: String,
    pub output: String,
}

impl Default for DecryptConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            key_format: KeyFormat::Json.as_str().to_owned(),
            key_encryption: String::new(),
            input: STD_STREAM.to_owned(),
            output: STD_STREAM.to_owned(),
        }
    }
}

impl Validate for DecryptConfig {
    fn rules(&self) -> Vec<FieldRule<'_>> {
        vec![
            FieldRule::new("key", &self.key, &[Check::Required], ErrorKind::RequireKeyFile),
            FieldRule::new(
                "key_encryption",
                &self.key_encryption,
                &[Check::OptionalOneOf(&[KeyEncryptionAlgorithm::NAMES])],
                ErrorKind::InvalidKeyEncryption,
            ),
            FieldRule::new(
                "key_format",
                &self.key_format,
                &[Check::OneOf(&[KeyFormat::NAMES])],
                ErrorKind::InvalidKeyFormat,
            ),
        ]
    }
}

/// Encrypt `payload` for `key`, returning the compact serialization.
///
/// Asymmetric keys are projected onto their public members first,
/// so a private key file can be used to encrypt as well.
pub fn encrypt(
    payload: &[u8],
    key: &JWK,
    alg: KeyEncryptionAlgorithm,
    enc: ContentEncryptionAlgorithm,
    compress: bool,
) -> Result<String, JoseError> {
    tracing::debug!(%alg, %enc, compress, "encrypt payload");
    let public_key;
    let key = if key.is_symmetric() {
        key
    } else {
        public_key = key.to_public().or_kind(ErrorKind::RetrieveKeyFailed)?;
        &public_key
    };

    let mut encrypter = JWEEncrypter::new(alg, enc);
    if compress {
        encrypter = encrypter.with_compression(CompressionAlgorithm::Deflate);
    }
    encrypter
        .encrypt(key, payload)
        .or_kind(ErrorKind::EncryptFailed)
}

/// Decrypt `message` with `key`.
///
/// With an explicit `alg` only recipients using that algorithm are
/// considered. Without one, the algorithm declared by the message is
/// trusted, as the key is the only one that can be used anyway.
pub fn decrypt(
    message: &[u8],
    key: &JWK,
    alg: Option<KeyEncryptionAlgorithm>,
) -> Result<Vec<u8>, JoseError> {
    let jwe = ParsedJWE::parse(message).or_kind(ErrorKind::DecryptFailed)?;
    let result = match alg {
        Some(alg) => {
            tracing::debug!(%alg, "decrypt jwe with explicit algorithm");
            jwe.decrypt_with_algorithm(alg, key)
        }
        None => {
            tracing::debug!("decrypt jwe with algorithm from header");
            jwe.decrypt_with_resolver(key)
        }
    };
    result.or_kind(ErrorKind::DecryptFailed)
}

/// Encrypt the payload found at [`EncryptConfig::input`].
pub fn run_encrypt(cfg: &EncryptConfig) -> Result<(), BoxError> {
    cfg.validate()?;
    let alg: KeyEncryptionAlgorithm = cfg
        .key_encryption
        .parse()
        .or_kind(ErrorKind::InvalidKeyEncryption)?;
    let enc: ContentEncryptionAlgorithm = cfg
        .content_encryption
        .parse()
        .or_kind(ErrorKind::InvalidContentEncryption)?;

    let payload = read_input(&cfg.input)?;
    let keys = key::load(&cfg.key, &cfg.key_format)?;
    let key = key::single_key(&keys)?;
    let message = encrypt(&payload, key, alg, enc, cfg.compress)?;

    with_output(&cfg.output, |w| write_bytes(w, message.as_bytes()))
}

/// Decrypt the message found at [`DecryptConfig::input`].
pub fn run_decrypt(cfg: &DecryptConfig) -> Result<(), BoxError> {
    cfg.validate()?;
    let alg = match cfg.key_encryption.as_str() {
        "" => None,
        alg => Some(
            alg.parse::<KeyEncryptionAlgorithm>()
                .or_kind(ErrorKind::InvalidKeyEncryption)?,
        ),
    };

    let message = read_input(&cfg.input)?;
    let keys = key::load(&cfg.key, &cfg.key_format)?;
    let key = key::single_key(&keys)?;
    let payload = decrypt(&message, key, alg)?;

    with_output(&cfg.output, |w| write_bytes(w, &payload))
}
