//! JSON Web Encryption as defined in [`rfc7516`].
//!
//! Encryption always produces the compact serialization with a single
//! recipient. [`ParsedJWE`] reads the compact serialization as well as
//! the general and flattened JSON serializations.
//!
//! [`rfc7516`]: https://datatracker.ietf.org/doc/html/rfc7516

use std::io::{Read as _, Write as _};

use base64::{Engine as _, prelude::BASE64_URL_SAFE_NO_PAD};
use flate2::{Compression, read::DeflateDecoder, write::DeflateEncoder};
use josec_error::{ErrorContext as _, OpaqueError};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::jose::{
    CompressionAlgorithm, ContentEncryptionAlgorithm, Headers, JWK, JWKSet,
    KeyEncryptionAlgorithm,
};

mod aes_kw;
mod content;
mod key_mgmt;

/// Maximum size of an inflated plaintext.
const MAX_INFLATED_LEN: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// [`JWEEncrypter`] encrypts payloads for a single recipient key.
pub struct JWEEncrypter {
    alg: KeyEncryptionAlgorithm,
    enc: ContentEncryptionAlgorithm,
    zip: Option<CompressionAlgorithm>,
}

impl JWEEncrypter {
    /// Create a new [`JWEEncrypter`] without compression.
    pub fn new(alg: KeyEncryptionAlgorithm, enc: ContentEncryptionAlgorithm) -> Self {
        Self {
            alg,
            enc,
            zip: None,
        }
    }

    #[must_use]
    /// Compress the plaintext before encrypting it.
    pub fn with_compression(mut self, zip: CompressionAlgorithm) -> Self {
        self.zip = Some(zip);
        self
    }

    /// Encrypt `payload` for `key` into the compact serialization.
    ///
    /// Symmetric keys are used as is, asymmetric keys are expected to
    /// be the public key of the recipient.
    pub fn encrypt(&self, key: &JWK, payload: &[u8]) -> Result<String, OpaqueError> {
        let material = key.material()?;

        let mut headers = Headers::default();
        headers
            .try_set_header("alg", self.alg)?
            .try_set_header("enc", self.enc)?;
        if let Some(zip) = self.zip {
            headers.try_set_header("zip", zip)?;
        }
        if let Some(kid) = key.kid() {
            headers.try_set_header("kid", kid)?;
        }

        let wrapped = key_mgmt::encrypt_cek(self.alg, self.enc, &material, &mut headers)?;
        let protected = headers.as_encoded_string()?;

        let plaintext = match self.zip {
            Some(CompressionAlgorithm::Deflate) => deflate(payload)?,
            None => payload.to_vec(),
        };
        let sealed = content::encrypt(self.enc, &wrapped.cek, protected.as_bytes(), &plaintext)?;

        tracing::trace!(alg = %self.alg, enc = %self.enc, "encrypted jwe");
        Ok([
            protected,
            BASE64_URL_SAFE_NO_PAD.encode(&wrapped.encrypted_key),
            BASE64_URL_SAFE_NO_PAD.encode(&sealed.iv),
            BASE64_URL_SAFE_NO_PAD.encode(&sealed.ciphertext),
            BASE64_URL_SAFE_NO_PAD.encode(&sealed.tag),
        ]
        .join("."))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single recipient of a [`ParsedJWE`].
pub struct Recipient {
    header: Headers,
    encrypted_key: Vec<u8>,
}

impl Recipient {
    /// Union of the protected, shared unprotected and per-recipient headers.
    pub fn header(&self) -> &Headers {
        &self.header
    }

    /// Key encryption algorithm declared for this recipient.
    pub fn algorithm(&self) -> Result<KeyEncryptionAlgorithm, OpaqueError> {
        self.header
            .get_str("alg")
            .context("recipient header without 'alg'")?
            .parse()
            .context("parse recipient 'alg' header")
    }

    /// Key ID declared for this recipient.
    pub fn kid(&self) -> Option<&str> {
        self.header.get_str("kid")
    }
}

/// Selects the key used to decrypt a [`Recipient`].
pub trait KeyResolver {
    /// Key for `recipient`, if any is known.
    fn resolve(&self, recipient: &Recipient) -> Option<&JWK>;
}

/// A single key resolves for every recipient.
impl KeyResolver for JWK {
    fn resolve(&self, _recipient: &Recipient) -> Option<&JWK> {
        Some(self)
    }
}

/// Keys are matched on `kid`, a set of one also serves recipients without one.
impl KeyResolver for JWKSet {
    fn resolve(&self, recipient: &Recipient) -> Option<&JWK> {
        match recipient.kid() {
            Some(kid) => self.keys().iter().find(|key| key.kid() == Some(kid)),
            None => self.single(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// [`ParsedJWE`] is a JWE message ready to be decrypted.
pub struct ParsedJWE {
    protected: Headers,
    aad: Vec<u8>,
    recipients: Vec<Recipient>,
    iv: Vec<u8>,
    ciphertext: Vec<u8>,
    tag: Vec<u8>,
}

#[derive(Deserialize)]
struct JsonJWE {
    #[serde(default)]
    protected: Option<String>,
    #[serde(default)]
    unprotected: Option<Map<String, Value>>,
    #[serde(default)]
    recipients: Option<Vec<JsonRecipient>>,
    #[serde(flatten)]
    flattened: JsonRecipient,
    #[serde(default)]
    aad: Option<String>,
    #[serde(default)]
    iv: String,
    ciphertext: String,
    #[serde(default)]
    tag: String,
}

#[derive(Deserialize)]
struct JsonRecipient {
    #[serde(default)]
    header: Option<Map<String, Value>>,
    #[serde(default)]
    encrypted_key: Option<String>,
}

impl ParsedJWE {
    /// Parse a JWE in compact or JSON serialization.
    pub fn parse(input: &[u8]) -> Result<Self, OpaqueError> {
        let input = std::str::from_utf8(input).context("jwe is not valid utf-8")?;
        let input = input.trim();
        if input.starts_with('{') {
            Self::parse_json(input)
        } else {
            Self::parse_compact(input)
        }
    }

    fn parse_compact(input: &str) -> Result<Self, OpaqueError> {
        let parts: Vec<&str> = input.split('.').collect();
        let [protected, encrypted_key, iv, ciphertext, tag] = parts.as_slice() else {
            return Err(OpaqueError::from_display(format!(
                "compact jwe must have 5 parts, found {}",
                parts.len()
            )));
        };

        let protected_headers = Headers::from_encoded_str(protected)?;
        let recipient = Recipient {
            header: protected_headers.clone(),
            encrypted_key: decode_part("encrypted key", encrypted_key)?,
        };
        Ok(Self {
            protected: protected_headers,
            aad: protected.as_bytes().to_vec(),
            recipients: vec![recipient],
            iv: decode_part("iv", iv)?,
            ciphertext: decode_part("ciphertext", ciphertext)?,
            tag: decode_part("tag", tag)?,
        })
    }

    fn parse_json(input: &str) -> Result<Self, OpaqueError> {
        let message: JsonJWE = serde_json::from_str(input).context("parse jwe json")?;

        let encoded_protected = message.protected.unwrap_or_default();
        let protected = Headers::from_encoded_str(&encoded_protected)?;
        let shared = message.unprotected.unwrap_or_default();

        let recipients = match message.recipients {
            Some(recipients) => recipients,
            None => vec![message.flattened],
        };
        if recipients.is_empty() {
            return Err(OpaqueError::from_display("jwe without recipients"));
        }
        let recipients = recipients
            .into_iter()
            .map(|recipient| {
                let header = joint_header(
                    protected.header_map(),
                    &shared,
                    recipient.header.as_ref(),
                )?;
                let encrypted_key = match recipient.encrypted_key {
                    Some(encrypted_key) => decode_part("encrypted key", &encrypted_key)?,
                    None => Vec::new(),
                };
                Ok(Recipient {
                    header,
                    encrypted_key,
                })
            })
            .collect::<Result<Vec<_>, OpaqueError>>()?;

        let mut aad = encoded_protected.into_bytes();
        if let Some(extra) = message.aad {
            aad.push(b'.');
            aad.extend_from_slice(extra.as_bytes());
        }

        Ok(Self {
            protected,
            aad,
            recipients,
            iv: decode_part("iv", &message.iv)?,
            ciphertext: decode_part("ciphertext", &message.ciphertext)?,
            tag: decode_part("tag", &message.tag)?,
        })
    }

    /// Recipients of this message, in message order.
    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    /// Headers protected by the authentication tag.
    pub fn protected_headers(&self) -> &Headers {
        &self.protected
    }

    /// Decrypt with `key`, considering only recipients which declare `alg`.
    pub fn decrypt_with_algorithm(
        &self,
        alg: KeyEncryptionAlgorithm,
        key: &JWK,
    ) -> Result<Vec<u8>, OpaqueError> {
        let mut last_error = None;
        for recipient in &self.recipients {
            if recipient.algorithm().ok() != Some(alg) {
                tracing::trace!(expected = %alg, "skip recipient with other algorithm");
                continue;
            }
            match self.decrypt_recipient(recipient, alg, key) {
                Ok(plaintext) => return Ok(plaintext),
                Err(err) => {
                    tracing::trace!(%err, "failed to decrypt recipient");
                    last_error = Some(err);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| {
            OpaqueError::from_display(format!("no recipient uses algorithm {alg}"))
        }))
    }

    /// Decrypt with the key `resolver` selects for each recipient.
    ///
    /// The algorithm is read from the recipient's header.
    pub fn decrypt_with_resolver(
        &self,
        resolver: &impl KeyResolver,
    ) -> Result<Vec<u8>, OpaqueError> {
        let mut last_error = None;
        for recipient in &self.recipients {
            let Some(key) = resolver.resolve(recipient) else {
                tracing::trace!(kid = ?recipient.kid(), "no key resolved for recipient");
                continue;
            };
            let result = recipient
                .algorithm()
                .and_then(|alg| self.decrypt_recipient(recipient, alg, key));
            match result {
                Ok(plaintext) => return Ok(plaintext),
                Err(err) => {
                    tracing::trace!(%err, "failed to decrypt recipient");
                    last_error = Some(err);
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| OpaqueError::from_display("no key resolved for any recipient")))
    }

    fn decrypt_recipient(
        &self,
        recipient: &Recipient,
        alg: KeyEncryptionAlgorithm,
        key: &JWK,
    ) -> Result<Vec<u8>, OpaqueError> {
        let enc: ContentEncryptionAlgorithm = recipient
            .header
            .get_str("enc")
            .context("jwe header without 'enc'")?
            .parse()
            .context("parse 'enc' header")?;
        let zip = self
            .protected
            .get_str("zip")
            .map(str::parse::<CompressionAlgorithm>)
            .transpose()
            .context("parse 'zip' header")?;

        let material = key.material()?;
        let cek = key_mgmt::decrypt_cek(
            alg,
            enc,
            &material,
            &recipient.header,
            &recipient.encrypted_key,
        )?;
        let plaintext = content::decrypt(enc, &cek, &self.aad, &self.iv, &self.ciphertext, &self.tag)?;

        match zip {
            Some(CompressionAlgorithm::Deflate) => inflate(&plaintext),
            None => Ok(plaintext),
        }
    }
}

fn decode_part(name: &'static str, value: &str) -> Result<Vec<u8>, OpaqueError> {
    BASE64_URL_SAFE_NO_PAD
        .decode(value)
        .with_context(|| format!("decode jwe {name}"))
}

/// Header names must be disjoint across the three header locations.
fn joint_header(
    protected: Option<&Map<String, Value>>,
    shared: &Map<String, Value>,
    recipient: Option<&Map<String, Value>>,
) -> Result<Headers, OpaqueError> {
    let mut joint = Map::new();
    for (name, value) in protected
        .into_iter()
        .chain(Some(shared))
        .chain(recipient)
        .flatten()
    {
        if joint.insert(name.clone(), value.clone()).is_some() {
            return Err(OpaqueError::from_display(format!(
                "duplicate jwe header '{name}'"
            )));
        }
    }
    Ok(Headers::from(joint))
}

fn deflate(input: &[u8]) -> Result<Vec<u8>, OpaqueError> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(input).context("deflate plaintext")?;
    encoder.finish().context("finish deflate")
}

fn inflate(input: &[u8]) -> Result<Vec<u8>, OpaqueError> {
    let limit = MAX_INFLATED_LEN;
    let mut output = Vec::new();
    DeflateDecoder::new(input)
        .take(limit + 1)
        .read_to_end(&mut output)
        .context("inflate plaintext")?;
    if output.len() as u64 > limit {
        return Err(OpaqueError::from_display(format!(
            "inflated plaintext exceeds {limit} bytes"
        )));
    }
    Ok(output)
}
