//! Signing, verification and parsing of JWS messages.
//!
//! Verification never trusts the `alg` header of a message on its own.
//! Either the operator chooses the algorithm, which is then tried with
//! every key of the key set, or a key is matched by its `kid` and has to
//! declare the algorithm itself.

use std::io::Write;

use serde_json::{Map, Value};

use crate::{
    crypto::jose::{
        Headers, JWK, JWKSet, JWSBuilder, JwkSigner, JwkVerifier, ParsedJWS, SignatureAlgorithm,
    },
    error::{BoxError, ErrorKind, ErrorKindExt, JoseError, OpaqueError, ValidationError},
    io::{STD_STREAM, read_input, read_message, with_output},
    key::{self, KeyFormat},
    output::{to_pretty_json, write_bytes},
    validate::{Check, FieldRule, Validate},
};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Config of the sign operation.
pub struct SignConfig {
    pub algorithm: String,
    /// Path of the key file.
    pub key: String,
    pub key_format: String,
    /// JSON object merged into the protected header, empty for none.
    pub header: String,
    /// Path of the payload, `-` for stdin.
    pub input: String,
    pub output: String,
}

impl Default for SignConfig {
    fn default() -> Self {
        Self {
            algorithm: String::new(),
            key: String::new(),
            key_format: KeyFormat::Json.as_str().to_owned(),
            header: String::new(),
            input: STD_STREAM.to_owned(),
            output: STD_STREAM.to_owned(),
        }
    }
}

impl Validate for SignConfig {
    fn rules(&self) -> Vec<FieldRule<'_>> {
        vec![
            FieldRule::new(
                "algorithm",
                &self.algorithm,
                &[
                    Check::Required,
                    Check::OneOf(&[SignatureAlgorithm::NAMES]),
                ],
                ErrorKind::InvalidAlgorithm,
            ),
            FieldRule::new("key", &self.key, &[Check::Required], ErrorKind::RequireKeyFile),
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
/// Config of the verify operation.
pub struct VerifyConfig {
    /// Algorithm to verify with, required unless `match_kid` is set.
    pub algorithm: String,
    /// Path of the key set file.
    pub key: String,
    pub key_format: String,
    /// Select keys by the `kid` of the message instead of by algorithm.
    pub match_kid: bool,
    /// Path of the message, `-` for stdin.
    pub input: String,
    pub output: String,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            algorithm: String::new(),
            key: String::new(),
            key_format: KeyFormat::Json.as_str().to_owned(),
            match_kid: false,
            input: STD_STREAM.to_owned(),
            output: STD_STREAM.to_owned(),
        }
    }
}

impl Validate for VerifyConfig {
    fn rules(&self) -> Vec<FieldRule<'_>> {
        vec![
            FieldRule::new(
                "algorithm",
                &self.algorithm,
                &[Check::OptionalOneOf(&[SignatureAlgorithm::NAMES])],
                ErrorKind::InvalidAlgorithm,
            ),
            FieldRule::new("key", &self.key, &[Check::Required], ErrorKind::RequireKeyFile),
            FieldRule::new(
                "key_format",
                &self.key_format,
                &[Check::OneOf(&[KeyFormat::NAMES])],
                ErrorKind::InvalidKeyFormat,
            ),
        ]
    }

    fn post_validate(&self) -> Result<(), ValidationError> {
        if !self.match_kid && self.algorithm.is_empty() {
            return Err(ValidationError::single(
                "algorithm",
                ErrorKind::EmptyAlgorithm,
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Config of the parse operation.
pub struct ParseConfig {
    /// Path of the message, `-` for stdin, or the message itself.
    pub input: String,
    pub output: String,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            input: STD_STREAM.to_owned(),
            output: STD_STREAM.to_owned(),
        }
    }
}

impl Validate for ParseConfig {
    fn rules(&self) -> Vec<FieldRule<'_>> {
        vec![
            FieldRule::new(
                "input",
                &self.input,
                &[Check::Required],
                ErrorKind::RequireFileName,
            ),
            FieldRule::new(
                "output",
                &self.output,
                &[Check::Required],
                ErrorKind::RequireFileName,
            ),
        ]
    }
}

/// Sign `payload` with `key`, returning the compact serialization.
///
/// `header` is an optional JSON object merged into the protected header.
/// The `alg` header, and `kid` if the key has one, are always set from the key.
pub fn sign(
    payload: &[u8],
    key: &JWK,
    alg: SignatureAlgorithm,
    header: Option<&str>,
) -> Result<String, JoseError> {
    tracing::debug!(%alg, kid = ?key.kid(), "sign payload");
    let mut builder = JWSBuilder::new().with_payload(payload);
    if let Some(header) = header {
        let header: Map<String, Value> =
            serde_json::from_str(header).or_kind(ErrorKind::ParseHeaderFailed)?;
        builder = builder
            .try_with_protected_headers(header)
            .or_kind(ErrorKind::ParseHeaderFailed)?;
    }

    let signer = JwkSigner::new(key, alg).or_kind(ErrorKind::SignFailed)?;
    let jws = builder
        .build_compact(&signer)
        .or_kind(ErrorKind::SignFailed)?;
    Ok(jws.into_string())
}

/// Verify `message` with the keys of `keys`.
///
/// With `match_kid` set, only keys which carry both the `kid` and the `alg`
/// of the message are considered, and the first one to verify wins.
/// Otherwise every key is tried with the explicit `alg`, and the payload is
/// returned once for each key which verifies.
///
/// Fails if no key verifies the message.
pub fn verify(
    message: &[u8],
    keys: &JWKSet,
    alg: Option<SignatureAlgorithm>,
    match_kid: bool,
) -> Result<Vec<Vec<u8>>, JoseError> {
    let jws = ParsedJWS::parse(message).or_kind(ErrorKind::VerifyFailed)?;

    if match_kid {
        tracing::debug!(keys = keys.len(), "verify jws by matching kid");
        for (index, key) in keys.keys().iter().enumerate() {
            let Some(verifier) = JwkVerifier::matching_kid(key) else {
                tracing::trace!(index, "skip key without kid or signature alg");
                continue;
            };
            match jws.verify(&verifier) {
                Ok(payload) => return Ok(vec![payload]),
                Err(err) => tracing::debug!(index, %err, "key did not verify jws"),
            }
        }
        return Err(
            JoseError::new(ErrorKind::VerifyFailed).with_cause(OpaqueError::from_display(
                "no key with matching kid and alg verified the message",
            )),
        );
    }

    let alg = alg.ok_or_else(|| JoseError::new(ErrorKind::EmptyAlgorithm))?;
    tracing::debug!(%alg, keys = keys.len(), "verify jws with explicit algorithm");
    let mut payloads = Vec::new();
    for (index, key) in keys.keys().iter().enumerate() {
        match jws.verify(&JwkVerifier::new(key, alg)) {
            Ok(payload) => payloads.push(payload),
            Err(err) => tracing::debug!(index, %err, "key did not verify jws"),
        }
    }
    if payloads.is_empty() {
        return Err(JoseError::new(ErrorKind::VerifyFailed)
            .with_cause(OpaqueError::from_display("no key verified the message")));
    }
    Ok(payloads)
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A parsed JWS message, for display only.
///
/// Nothing about the message is verified.
pub struct ParsedView {
    payload: Vec<u8>,
    message: ParsedJWS,
    headers: Vec<Headers>,
}

impl ParsedView {
    /// The decoded payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The message in general serialization.
    pub fn message(&self) -> &ParsedJWS {
        &self.message
    }

    /// The decoded protected header of each signature.
    pub fn protected_headers(&self) -> &[Headers] {
        &self.headers
    }

    /// Write the human readable form of this view.
    pub fn write_to(&self, w: &mut impl Write) -> Result<(), JoseError> {
        w.write_all(b"Payload: ")
            .and_then(|()| w.write_all(&self.payload))
            .and_then(|()| w.write_all(b"\nJWS: "))
            .or_kind(ErrorKind::WriteOutputFailed)?;
        let json = to_pretty_json(&self.message)?;
        w.write_all(&json).or_kind(ErrorKind::WriteJsonFailed)?;
        for (index, headers) in self.headers.iter().enumerate() {
            write!(w, "Signature {index}: ").or_kind(ErrorKind::WriteOutputFailed)?;
            let json = to_pretty_json(headers)?;
            w.write_all(&json).or_kind(ErrorKind::WriteJsonFailed)?;
        }
        Ok(())
    }
}

/// Parse a compact or JSON serialized JWS message.
pub fn parse(message: &[u8]) -> Result<ParsedView, JoseError> {
    let jws = ParsedJWS::parse(message).or_kind(ErrorKind::ParseMessageFailed)?;
    let payload = jws.payload().or_kind(ErrorKind::ParseMessageFailed)?;
    let headers = jws
        .protected_headers()
        .or_kind(ErrorKind::ParseMessageFailed)?;
    tracing::debug!(signatures = headers.len(), "parsed jws");
    Ok(ParsedView {
        payload,
        message: jws,
        headers,
    })
}

/// Sign the payload found at [`SignConfig::input`].
pub fn run_sign(cfg: &SignConfig) -> Result<(), BoxError> {
    cfg.validate()?;
    let alg: SignatureAlgorithm = cfg
        .algorithm
        .parse()
        .or_kind(ErrorKind::InvalidAlgorithm)?;

    let payload = read_input(&cfg.input)?;
    let keys = key::load(&cfg.key, &cfg.key_format)?;
    let key = key::single_key(&keys)?;
    let header = (!cfg.header.is_empty()).then_some(cfg.header.as_str());
    let message = sign(&payload, key, alg, header)?;

    with_output(&cfg.output, |w| write_bytes(w, message.as_bytes()))
}

/// Verify the message found at [`VerifyConfig::input`], writing its payload.
pub fn run_verify(cfg: &VerifyConfig) -> Result<(), BoxError> {
    cfg.validate()?;
    let alg = match cfg.algorithm.as_str() {
        "" => None,
        alg => Some(
            alg.parse::<SignatureAlgorithm>()
                .or_kind(ErrorKind::InvalidAlgorithm)?,
        ),
    };

    let message = read_input(&cfg.input)?;
    let keys = key::load(&cfg.key, &cfg.key_format)?;
    let payloads = verify(&message, &keys, alg, cfg.match_kid)?;

    with_output(&cfg.output, |w| {
        payloads
            .iter()
            .try_for_each(|payload| write_bytes(w, payload))
    })
}

/// Parse the message found at [`ParseConfig::input`] and describe it.
pub fn run_parse(cfg: &ParseConfig) -> Result<(), BoxError> {
    cfg.validate()?;
    let message = read_message(&cfg.input)?;
    let view = parse(&message)?;
    with_output(&cfg.output, |w| view.write_to(w))
}
