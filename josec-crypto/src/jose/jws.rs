use aws_lc_rs::{
    hmac,
    rand::SystemRandom,
    signature::{self, EcdsaKeyPair, Ed25519KeyPair, RsaEncoding, RsaKeyPair, UnparsedPublicKey},
};
use base64::{Engine as _, prelude::BASE64_URL_SAFE_NO_PAD};
use josec_error::{BoxError, ErrorContext as _, OpaqueError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::jose::{
    EllipticCurve, JWK, SignatureAlgorithm,
    jwk::KeyMaterial,
    pem::material_to_pkcs8,
};

#[derive(Default, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
/// [`Headers`] store protected or unprotected headers and already
/// serializes them to correct JSON values.
pub struct Headers(Option<Map<String, Value>>);

impl Headers {
    /// Set provided header in the header map
    ///
    /// Warning: this function will replace already existing headers
    pub fn try_set_header(
        &mut self,
        name: impl Into<String>,
        value: impl Serialize,
    ) -> Result<&mut Self, OpaqueError> {
        let headers = self.0.get_or_insert_default();
        let value = serde_json::to_value(value).context("convert to value")?;
        headers.insert(name.into(), value);
        Ok(self)
    }

    /// Set provided headers in the header map
    ///
    /// Warning: this function will replace already existing headers
    pub fn try_set_headers(&mut self, headers: impl Serialize) -> Result<&mut Self, OpaqueError> {
        let headers =
            serde_json::to_value(headers).context("convert headers to serde json value")?;

        let Value::Object(mut headers) = headers else {
            return Err(OpaqueError::from_display(
                "Can only set multiple headers if input is key value object",
            ));
        };

        match &mut self.0 {
            Some(existing_headers) => existing_headers.append(&mut headers),
            None => self.0 = Some(headers),
        };

        Ok(self)
    }

    /// Get the raw value of a single header
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.as_ref().and_then(|headers| headers.get(name))
    }

    /// Get a single header which holds a string value
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Reference to the underlying header map, if any header is set
    pub fn header_map(&self) -> Option<&Map<String, Value>> {
        self.0.as_ref()
    }

    /// Encode headers to a base64 url safe representation
    pub(crate) fn as_encoded_string(&self) -> Result<String, OpaqueError> {
        let encoded = match &self.0 {
            Some(headers) => {
                let headers = serde_json::to_vec(headers).context("convert to bytes")?;
                BASE64_URL_SAFE_NO_PAD.encode(headers)
            }
            None => String::new(),
        };
        Ok(encoded)
    }

    /// Decode headers from their base64 url safe representation
    pub(crate) fn from_encoded_str(encoded: &str) -> Result<Self, OpaqueError> {
        if encoded.is_empty() {
            return Ok(Self::default());
        }
        let raw = BASE64_URL_SAFE_NO_PAD
            .decode(encoded)
            .context("decode protected header")?;
        let headers = serde_json::from_slice::<Map<String, Value>>(&raw)
            .context("deserialize protected headers")?;
        Ok(Self(Some(headers)))
    }

    fn is_none(&self) -> bool {
        self.0.is_none()
    }

    /// Try decode headers to the provided `T`
    pub fn decode<'de, 'a: 'de, T>(&'a self) -> Result<T, OpaqueError>
    where
        T: Deserialize<'de>,
    {
        match &self.0 {
            Some(headers) => Ok(T::deserialize(headers).context("deserialize headers into T")?),
            None => Err(OpaqueError::from_display(
                "headers are None, deserialize not supported",
            )),
        }
    }
}

impl From<Map<String, Value>> for Headers {
    fn from(headers: Map<String, Value>) -> Self {
        Self(Some(headers))
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
/// [`JWSBuilder`] should be used when manually creating a [`JWSCompact`]
pub struct JWSBuilder {
    protected_headers: Headers,
    payload: String,
}

impl JWSBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    /// Add the provided payload to this [`JWSBuilder`]
    pub fn with_payload(mut self, payload: impl AsRef<[u8]>) -> Self {
        self.payload = BASE64_URL_SAFE_NO_PAD.encode(payload);
        self
    }

    /// Set provided headers in the protected header map
    ///
    /// Warning: this function will replace already existing headers
    pub fn try_with_protected_headers(
        mut self,
        headers: impl Serialize,
    ) -> Result<Self, OpaqueError> {
        self.protected_headers.try_set_headers(headers)?;
        Ok(self)
    }

    /// Set provided header in the protected header map
    ///
    /// Warning: this function will replace already existing headers
    pub fn try_with_protected_header(
        mut self,
        name: impl Into<String>,
        value: impl Serialize,
    ) -> Result<Self, OpaqueError> {
        self.protected_headers.try_set_header(name, value)?;
        Ok(self)
    }

    /// Get mutable reference to the underlying protected header store
    ///
    /// This can be used in cases where more granual control is needed
    pub fn protected_headers_mut(&mut self) -> &mut Headers {
        &mut self.protected_headers
    }

    /// Generate compact serialization of this `JWS`
    ///
    /// Headers set by the [`Signer`] take precedence over the headers of this builder.
    pub fn build_compact(mut self, signer: &impl Signer) -> Result<JWSCompact, OpaqueError> {
        signer
            .set_headers(&mut self.protected_headers)
            .map_err(|err| OpaqueError::from_boxed(err.into()))
            .context("signer set headers")?;
        let protected = self.protected_headers.as_encoded_string()?;
        let signing_input = format!("{}.{}", protected, self.payload);

        let signature = signer
            .sign(&signing_input)
            .map_err(|err| OpaqueError::from_boxed(err.into()))
            .context("signer sign protected data")?;
        let signature = BASE64_URL_SAFE_NO_PAD.encode(signature.as_ref());

        Ok(JWSCompact(format!("{signing_input}.{signature}")))
    }
}

/// [`Signer`] implements all methods which are needed to sign our JWS requests,
/// and add the needed info to our protected JOSE headers
pub trait Signer {
    type Signature: AsRef<[u8]>;
    type Error: Into<BoxError>;

    /// Set headers which are needed to verify the final `Signature`
    ///
    /// Example headers are: `alg`, `kid`
    fn set_headers(&self, protected_headers: &mut Headers) -> Result<(), Self::Error>;

    /// Sign the str encoded payload
    fn sign(&self, data: &str) -> Result<Self::Signature, Self::Error>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// [`JWSCompact`] is a compact `JWS` representation as defined in [`rfc7515, section 7.1`]
///
/// [`rfc7515, section 7.1`]: https://datatracker.ietf.org/doc/html/rfc7515#section-7.1
pub struct JWSCompact(String);

impl JWSCompact {
    /// Create a builder which can be used to create a [`JWSCompact`]
    pub fn builder() -> JWSBuilder {
        JWSBuilder::new()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
/// A single signature entry of a `JWS` in its encoded form
pub struct JWSSignature {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    protected: String,
    #[serde(default, skip_serializing_if = "Headers::is_none", rename = "header")]
    unprotected: Headers,
    #[serde(default)]
    signature: String,
}

#[derive(Deserialize)]
struct JWSFlattened {
    #[serde(default)]
    payload: String,
    #[serde(flatten)]
    signature: JWSSignature,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// [`ParsedJWS`] is a received `JWS` normalized to the general
/// serialization format as defined in [`rfc7515, section 7.2.1`]
///
/// Nothing is verified while parsing, see [`ParsedJWS::verify`].
///
/// [`rfc7515, section 7.2.1`]: https://datatracker.ietf.org/doc/html/rfc7515#section-7.2.1
pub struct ParsedJWS {
    payload: String,
    signatures: Vec<JWSSignature>,
}

impl ParsedJWS {
    /// Parse a `JWS` in compact, flattened or general serialization
    pub fn parse(input: &[u8]) -> Result<Self, OpaqueError> {
        let input = input.trim_ascii();
        if input.first() == Some(&b'{') {
            let value: Value = serde_json::from_slice(input).context("parse JWS JSON")?;
            let is_general = value
                .as_object()
                .is_some_and(|obj| obj.contains_key("signatures"));
            if is_general {
                let jws = Self::deserialize(value).context("parse general JWS")?;
                if jws.signatures.is_empty() {
                    return Err(OpaqueError::from_display("JWS without signatures"));
                }
                Ok(jws)
            } else {
                let flattened =
                    JWSFlattened::deserialize(value).context("parse flattened JWS")?;
                Ok(Self {
                    payload: flattened.payload,
                    signatures: vec![flattened.signature],
                })
            }
        } else {
            let input = std::str::from_utf8(input).context("compact JWS is not utf-8")?;
            let mut parts = input.split('.');
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(protected), Some(payload), Some(signature), None) => Ok(Self {
                    payload: payload.to_owned(),
                    signatures: vec![JWSSignature {
                        protected: protected.to_owned(),
                        unprotected: Headers::default(),
                        signature: signature.to_owned(),
                    }],
                }),
                _ => Err(OpaqueError::from_display(
                    "compact JWS must consist of three parts",
                )),
            }
        }
    }

    /// Decoded payload, which has not been verified
    pub fn payload(&self) -> Result<Vec<u8>, OpaqueError> {
        BASE64_URL_SAFE_NO_PAD
            .decode(&self.payload)
            .context("decode payload")
    }

    /// Decoded protected headers, one per signature
    pub fn protected_headers(&self) -> Result<Vec<Headers>, OpaqueError> {
        self.signatures
            .iter()
            .map(|signature| Headers::from_encoded_str(&signature.protected))
            .collect()
    }

    /// Decode all signatures and check with [`Verifier`] if they are correct,
    /// returning the decoded payload on success
    pub fn verify(&self, verifier: &impl Verifier) -> Result<Vec<u8>, OpaqueError> {
        let signatures = self
            .signatures
            .iter()
            .map(|signature| {
                let protected = Headers::from_encoded_str(&signature.protected)?;
                let signature_bytes = BASE64_URL_SAFE_NO_PAD
                    .decode(&signature.signature)
                    .context("decode signature")?;
                Ok(ToVerifySignature {
                    signed_data: format!("{}.{}", signature.protected, self.payload),
                    protected,
                    unprotected: signature.unprotected.clone(),
                    signature: signature_bytes,
                })
            })
            .collect::<Result<Vec<_>, OpaqueError>>()?;

        let payload = self.payload()?;

        verifier
            .verify(&payload, &signatures)
            .map_err(|err| OpaqueError::from_boxed(err.into()))
            .context("verifier verify signatures")?;

        Ok(payload)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A `Signature` which still needs to be checked
///
/// It included a String representation of the signed data
/// so this doesn't need to be re-encoded
pub struct ToVerifySignature {
    signed_data: String,
    protected: Headers,
    unprotected: Headers,
    signature: Vec<u8>,
}

impl ToVerifySignature {
    /// Encoded String representation of protected + payload before it was decoded
    /// again. This should be used instead of re-encoding everything for efficiency
    pub fn signed_data(&self) -> &str {
        &self.signed_data
    }

    /// Reference to the protected [`Headers`]
    pub fn protected_headers(&self) -> &Headers {
        &self.protected
    }

    /// Reference to the unprotected [`Headers`]
    pub fn unprotected_headers(&self) -> &Headers {
        &self.unprotected
    }

    /// Header value from the protected headers, falling back to the unprotected ones
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.protected
            .get_str(name)
            .or_else(|| self.unprotected.get_str(name))
    }

    /// Decoded signature bytes
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}

/// [`Verifier`] will be called to confirm if the received data is valid
///
/// For some algorithms all signatures need to be valid, but there are also
/// cases when only one or some need to be valid.
pub trait Verifier {
    type Error: Into<BoxError>;
    /// Verify if data is valid
    fn verify(&self, payload: &[u8], signatures: &[ToVerifySignature]) -> Result<(), Self::Error>;
}

enum SigningKey {
    Hmac(hmac::Key),
    Rsa(RsaKeyPair, &'static dyn RsaEncoding),
    Ecdsa(EcdsaKeyPair),
    Ed25519(Ed25519KeyPair),
    Unsecured,
}

/// [`Signer`] backed by a private [`JWK`]
pub struct JwkSigner {
    alg: SignatureAlgorithm,
    kid: Option<String>,
    key: SigningKey,
    rng: SystemRandom,
}

impl std::fmt::Debug for JwkSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwkSigner")
            .field("alg", &self.alg)
            .field("kid", &self.kid)
            .finish_non_exhaustive()
    }
}

impl JwkSigner {
    /// Load the given [`JWK`] for signing with `alg`.
    ///
    /// Fails if the key cannot be used with the algorithm
    /// or does not hold private material.
    pub fn new(jwk: &JWK, alg: SignatureAlgorithm) -> Result<Self, OpaqueError> {
        let key = match alg {
            SignatureAlgorithm::Unsecured => SigningKey::Unsecured,
            SignatureAlgorithm::ES256K => {
                return Err(OpaqueError::from_display("ES256K is not supported"));
            }
            _ => {
                check_key_type(jwk, alg)?;
                signing_key(jwk, alg)?
            }
        };
        Ok(Self {
            alg,
            kid: jwk.kid().map(ToOwned::to_owned),
            key,
            rng: SystemRandom::new(),
        })
    }
}

fn check_key_type(jwk: &JWK, alg: SignatureAlgorithm) -> Result<(), OpaqueError> {
    if alg.key_type() == Some(jwk.kty()) {
        Ok(())
    } else {
        Err(OpaqueError::from_display(format!(
            "key type {} cannot be used with {alg}",
            jwk.kty()
        )))
    }
}

fn signing_key(jwk: &JWK, alg: SignatureAlgorithm) -> Result<SigningKey, OpaqueError> {
    match jwk.material()? {
        KeyMaterial::Oct { k } => Ok(SigningKey::Hmac(hmac::Key::new(hmac_algorithm(alg)?, &k))),
        material @ KeyMaterial::Rsa { .. } => {
            let der = zeroize::Zeroizing::new(material_to_pkcs8(&material)?);
            let key_pair = RsaKeyPair::from_pkcs8(&der).context("load RSA private key")?;
            Ok(SigningKey::Rsa(key_pair, rsa_encoding(alg)?))
        }
        KeyMaterial::Ec { crv, x, y, d } => {
            let d = d.ok_or_else(|| OpaqueError::from_display("EC key holds no private key"))?;
            let point = KeyMaterial::ec_point(&x, &y);
            let key_pair = EcdsaKeyPair::from_private_key_and_public_key(
                ecdsa_signing_algorithm(crv, alg)?,
                &d,
                &point,
            )
            .context("load EC private key")?;
            Ok(SigningKey::Ecdsa(key_pair))
        }
        KeyMaterial::Okp { crv, x, d } => {
            if crv != EllipticCurve::Ed25519 {
                return Err(OpaqueError::from_display(format!(
                    "EdDSA requires an Ed25519 key, not {crv}"
                )));
            }
            let d = d.ok_or_else(|| OpaqueError::from_display("OKP key holds no private key"))?;
            let key_pair =
                Ed25519KeyPair::from_seed_and_public_key(&d, &x).context("load Ed25519 key")?;
            Ok(SigningKey::Ed25519(key_pair))
        }
    }
}

fn hmac_algorithm(alg: SignatureAlgorithm) -> Result<hmac::Algorithm, OpaqueError> {
    match alg {
        SignatureAlgorithm::HS256 => Ok(hmac::HMAC_SHA256),
        SignatureAlgorithm::HS384 => Ok(hmac::HMAC_SHA384),
        SignatureAlgorithm::HS512 => Ok(hmac::HMAC_SHA512),
        _ => Err(unsupported_algorithm(alg)),
    }
}

fn rsa_encoding(alg: SignatureAlgorithm) -> Result<&'static dyn RsaEncoding, OpaqueError> {
    match alg {
        SignatureAlgorithm::RS256 => Ok(&signature::RSA_PKCS1_SHA256),
        SignatureAlgorithm::RS384 => Ok(&signature::RSA_PKCS1_SHA384),
        SignatureAlgorithm::RS512 => Ok(&signature::RSA_PKCS1_SHA512),
        SignatureAlgorithm::PS256 => Ok(&signature::RSA_PSS_SHA256),
        SignatureAlgorithm::PS384 => Ok(&signature::RSA_PSS_SHA384),
        SignatureAlgorithm::PS512 => Ok(&signature::RSA_PSS_SHA512),
        _ => Err(unsupported_algorithm(alg)),
    }
}

fn rsa_parameters(
    alg: SignatureAlgorithm,
) -> Result<&'static signature::RsaParameters, OpaqueError> {
    match alg {
        SignatureAlgorithm::RS256 => Ok(&signature::RSA_PKCS1_2048_8192_SHA256),
        SignatureAlgorithm::RS384 => Ok(&signature::RSA_PKCS1_2048_8192_SHA384),
        SignatureAlgorithm::RS512 => Ok(&signature::RSA_PKCS1_2048_8192_SHA512),
        SignatureAlgorithm::PS256 => Ok(&signature::RSA_PSS_2048_8192_SHA256),
        SignatureAlgorithm::PS384 => Ok(&signature::RSA_PSS_2048_8192_SHA384),
        SignatureAlgorithm::PS512 => Ok(&signature::RSA_PSS_2048_8192_SHA512),
        _ => Err(unsupported_algorithm(alg)),
    }
}

fn ecdsa_signing_algorithm(
    crv: EllipticCurve,
    alg: SignatureAlgorithm,
) -> Result<&'static signature::EcdsaSigningAlgorithm, OpaqueError> {
    match (crv, alg) {
        (EllipticCurve::P256, SignatureAlgorithm::ES256) => {
            Ok(&signature::ECDSA_P256_SHA256_FIXED_SIGNING)
        }
        (EllipticCurve::P384, SignatureAlgorithm::ES384) => {
            Ok(&signature::ECDSA_P384_SHA384_FIXED_SIGNING)
        }
        (EllipticCurve::P521, SignatureAlgorithm::ES512) => {
            Ok(&signature::ECDSA_P521_SHA512_FIXED_SIGNING)
        }
        _ => Err(curve_mismatch(crv, alg)),
    }
}

fn ecdsa_verification_algorithm(
    crv: EllipticCurve,
    alg: SignatureAlgorithm,
) -> Result<&'static signature::EcdsaVerificationAlgorithm, OpaqueError> {
    match (crv, alg) {
        (EllipticCurve::P256, SignatureAlgorithm::ES256) => Ok(&signature::ECDSA_P256_SHA256_FIXED),
        (EllipticCurve::P384, SignatureAlgorithm::ES384) => Ok(&signature::ECDSA_P384_SHA384_FIXED),
        (EllipticCurve::P521, SignatureAlgorithm::ES512) => Ok(&signature::ECDSA_P521_SHA512_FIXED),
        _ => Err(curve_mismatch(crv, alg)),
    }
}

fn unsupported_algorithm(alg: SignatureAlgorithm) -> OpaqueError {
    OpaqueError::from_display(format!("{alg} is not supported for this key"))
}

fn curve_mismatch(crv: EllipticCurve, alg: SignatureAlgorithm) -> OpaqueError {
    OpaqueError::from_display(format!("curve {crv} cannot be used with {alg}"))
}

impl Signer for JwkSigner {
    type Signature = Vec<u8>;
    type Error = OpaqueError;

    fn set_headers(&self, protected_headers: &mut Headers) -> Result<(), Self::Error> {
        protected_headers.try_set_header("alg", self.alg.as_str())?;
        if let Some(kid) = &self.kid {
            protected_headers.try_set_header("kid", kid)?;
        }
        Ok(())
    }

    fn sign(&self, data: &str) -> Result<Self::Signature, Self::Error> {
        let data = data.as_bytes();
        match &self.key {
            SigningKey::Hmac(key) => Ok(hmac::sign(key, data).as_ref().to_vec()),
            SigningKey::Rsa(key_pair, encoding) => {
                let mut signature = vec![0; key_pair.public_modulus_len()];
                key_pair
                    .sign(*encoding, &self.rng, data, &mut signature)
                    .context("RSA sign")?;
                Ok(signature)
            }
            SigningKey::Ecdsa(key_pair) => Ok(key_pair
                .sign(&self.rng, data)
                .context("ECDSA sign")?
                .as_ref()
                .to_vec()),
            SigningKey::Ed25519(key_pair) => Ok(key_pair.sign(data).as_ref().to_vec()),
            SigningKey::Unsecured => Ok(Vec::new()),
        }
    }
}

#[derive(Debug)]
/// [`Verifier`] backed by a single [`JWK`]
///
/// A signature is accepted if its `alg` header equals the algorithm of this
/// verifier and the signature checks out, at least one signature has to be valid.
/// The unsecured `none` algorithm is never accepted.
pub struct JwkVerifier<'a> {
    key: &'a JWK,
    alg: SignatureAlgorithm,
    match_kid: bool,
}

impl<'a> JwkVerifier<'a> {
    /// Verify with an algorithm chosen by the caller
    pub fn new(key: &'a JWK, alg: SignatureAlgorithm) -> Self {
        Self {
            key,
            alg,
            match_kid: false,
        }
    }

    /// Verify with the algorithm the key itself declares, only considering
    /// signatures which refer to this key by its `kid`.
    ///
    /// Returns `None` if the key lacks either a `kid` or a signature `alg`.
    pub fn matching_kid(key: &'a JWK) -> Option<Self> {
        key.kid()?;
        let alg = SignatureAlgorithm::strict_parse(key.alg()?)?;
        Some(Self {
            key,
            alg,
            match_kid: true,
        })
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.alg
    }

    fn verify_signature(&self, signature: &ToVerifySignature) -> Result<(), OpaqueError> {
        if signature.header_str("alg") != Some(self.alg.as_str()) {
            return Err(OpaqueError::from_display(format!(
                "signature algorithm does not match {}",
                self.alg
            )));
        }
        if self.match_kid && signature.header_str("kid") != self.key.kid() {
            return Err(OpaqueError::from_display("signature kid does not match key"));
        }

        let alg = self.alg;
        let data = signature.signed_data().as_bytes();
        let sig = signature.signature();
        match alg {
            SignatureAlgorithm::Unsecured => Err(OpaqueError::from_display(
                "unsecured JWS cannot be verified",
            )),
            SignatureAlgorithm::ES256K => Err(OpaqueError::from_display("ES256K is not supported")),
            _ => {
                check_key_type(self.key, alg)?;
                match self.key.material()? {
                    KeyMaterial::Oct { k } => {
                        let key = hmac::Key::new(hmac_algorithm(alg)?, &k);
                        hmac::verify(&key, data, sig).context("HMAC verify")
                    }
                    KeyMaterial::Rsa { n, e, .. } => signature::RsaPublicKeyComponents { n, e }
                        .verify(rsa_parameters(alg)?, data, sig)
                        .context("RSA verify"),
                    KeyMaterial::Ec { crv, x, y, .. } => UnparsedPublicKey::new(
                        ecdsa_verification_algorithm(crv, alg)?,
                        KeyMaterial::ec_point(&x, &y),
                    )
                    .verify(data, sig)
                    .context("ECDSA verify"),
                    KeyMaterial::Okp { crv, x, .. } => {
                        if crv != EllipticCurve::Ed25519 {
                            return Err(OpaqueError::from_display(format!(
                                "EdDSA requires an Ed25519 key, not {crv}"
                            )));
                        }
                        UnparsedPublicKey::new(&signature::ED25519, x)
                            .verify(data, sig)
                            .context("Ed25519 verify")
                    }
                }
            }
        }
    }
}

impl Verifier for JwkVerifier<'_> {
    type Error = OpaqueError;

    fn verify(&self, _payload: &[u8], signatures: &[ToVerifySignature]) -> Result<(), OpaqueError> {
        let mut last_error = None;
        for (index, signature) in signatures.iter().enumerate() {
            match self.verify_signature(signature) {
                Ok(()) => return Ok(()),
                Err(err) => {
                    tracing::trace!(index, "signature rejected: {err}");
                    last_error = Some(err);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| OpaqueError::from_display("no signature to verify")))
    }
}
