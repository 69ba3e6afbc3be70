//! Generation of JSON Web Keys.

use crate::{
    crypto::jose::{
        EllipticCurve, JWKSet, KeyEncryptionAlgorithm, KeyType, SignatureAlgorithm, generate_key,
    },
    error::{BoxError, ErrorKind, ErrorKindExt, JoseError, ValidationError},
    io::{STD_STREAM, with_output},
    key::KeyFormat,
    output::write_keys,
    validate::{Check, FieldRule, Validate},
};

/// Key size used when none is specified.
pub const DEFAULT_KEY_SIZE: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Config of the generate operation.
pub struct GenerateConfig {
    /// Curve of an EC or OKP key.
    pub curve: String,
    pub key_type: String,
    /// Modulus size in bits for RSA, secret size in bytes for `oct`.
    pub key_size: usize,
    pub output_format: String,
    pub output: String,
    /// Only output the public projection of the key.
    pub public_key: bool,
    /// Key ID to stamp on the key, empty for none.
    pub kid: String,
    /// Intended algorithm to stamp on the key, empty for none.
    pub algorithm: String,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            curve: String::new(),
            key_type: String::new(),
            key_size: DEFAULT_KEY_SIZE,
            output_format: KeyFormat::Json.as_str().to_owned(),
            output: STD_STREAM.to_owned(),
            public_key: false,
            kid: String::new(),
            algorithm: String::new(),
        }
    }
}

impl GenerateConfig {
    /// The curve, if the key type needs one.
    ///
    /// Only meaningful for a validated config.
    fn curve_for(&self, key_type: KeyType) -> Option<EllipticCurve> {
        match key_type {
            KeyType::Ec | KeyType::Okp => EllipticCurve::strict_parse(&self.curve),
            KeyType::Rsa | KeyType::Oct => None,
        }
    }
}

impl Validate for GenerateConfig {
    fn rules(&self) -> Vec<FieldRule<'_>> {
        vec![
            FieldRule::new(
                "curve",
                &self.curve,
                &[Check::OptionalOneOf(&[EllipticCurve::NAMES])],
                ErrorKind::InvalidCurve,
            ),
            FieldRule::new(
                "key_type",
                &self.key_type,
                &[Check::Required, Check::OneOf(&[KeyType::NAMES])],
                ErrorKind::InvalidKeyType,
            ),
            FieldRule::new(
                "key_size",
                self.key_size,
                &[Check::AtLeast(256)],
                ErrorKind::InvalidKeySize,
            ),
            FieldRule::new(
                "output_format",
                &self.output_format,
                &[Check::OneOf(&[KeyFormat::NAMES])],
                ErrorKind::InvalidOutputFormat,
            ),
            FieldRule::new(
                "output",
                &self.output,
                &[Check::Required],
                ErrorKind::RequireFileName,
            ),
            FieldRule::new(
                "algorithm",
                &self.algorithm,
                &[Check::OptionalOneOf(&[
                    SignatureAlgorithm::NAMES,
                    KeyEncryptionAlgorithm::NAMES,
                ])],
                ErrorKind::InvalidAlgorithm,
            ),
        ]
    }

    fn post_validate(&self) -> Result<(), ValidationError> {
        if self.key_size % 256 != 0 {
            return Err(ValidationError::single(
                "key_size",
                ErrorKind::InvalidKeySize,
            ));
        }

        let Some(key_type) = KeyType::strict_parse(&self.key_type) else {
            return Err(ValidationError::single(
                "key_type",
                ErrorKind::InvalidKeyType,
            ));
        };
        if matches!(key_type, KeyType::Ec | KeyType::Okp) {
            match self.curve_for(key_type) {
                Some(curve) if curve.key_type() != key_type => {
                    return Err(ValidationError::single("curve", ErrorKind::InvalidCurve));
                }
                Some(curve) if !curve.is_supported() => {
                    return Err(ValidationError::single(
                        "curve",
                        ErrorKind::UnsupportedCurve,
                    ));
                }
                Some(_) => (),
                None => return Err(ValidationError::single("curve", ErrorKind::InvalidCurve)),
            }
        }
        Ok(())
    }
}

/// Validate `cfg` and generate the key it describes.
///
/// The returned set holds the single generated key, or its public
/// projection if [`GenerateConfig::public_key`] is set.
pub fn generate(cfg: &GenerateConfig) -> Result<JWKSet, BoxError> {
    cfg.validate()?;
    let key_type = KeyType::strict_parse(&cfg.key_type)
        .ok_or_else(|| JoseError::new(ErrorKind::InvalidKeyType))?;
    let curve = cfg.curve_for(key_type);
    tracing::debug!(%key_type, ?curve, size = cfg.key_size, "generate key");

    let mut key =
        generate_key(key_type, curve, cfg.key_size).or_kind(ErrorKind::KeyGenerationFailed)?;
    if !cfg.kid.is_empty() {
        key = key.with_kid(cfg.kid.as_str());
    }
    if !cfg.algorithm.is_empty() {
        key = key.with_alg(cfg.algorithm.as_str());
    }

    let mut keys = JWKSet::from(key);
    if cfg.public_key {
        keys = keys
            .to_public()
            .or_kind(ErrorKind::PublicProjectionFailed)?;
    }
    if keys.is_empty() {
        return Err(JoseError::new(ErrorKind::EmptyKey).into());
    }
    Ok(keys)
}

/// Generate a key and write it to [`GenerateConfig::output`].
pub fn run(cfg: &GenerateConfig) -> Result<(), BoxError> {
    let keys = generate(cfg)?;
    let format = cfg
        .output_format
        .parse::<KeyFormat>()
        .or_kind(ErrorKind::InvalidOutputFormat)?;
    with_output(&cfg.output, |w| write_keys(w, &keys, format))
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::{error::error_kinds, key};

    fn config(key_type: &str, curve: &str, key_size: usize) -> GenerateConfig {
        GenerateConfig {
            key_type: key_type.to_owned(),
            curve: curve.to_owned(),
            key_size,
            ..Default::default()
        }
    }

    fn kinds_of(cfg: &GenerateConfig) -> Vec<ErrorKind> {
        let err = assert_err!(generate(cfg));
        error_kinds(&*err)
    }

    #[test]
    fn generate_every_supported_key_type() {
        for (key_type, curve, size) in [
            ("RSA", "", 2048),
            ("EC", "P-256", 2048),
            ("EC", "P-384", 2048),
            ("EC", "P-521", 2048),
            ("OKP", "Ed25519", 2048),
            ("OKP", "X25519", 2048),
            ("oct", "", 256),
        ] {
            let keys = assert_ok!(generate(&config(key_type, curve, size)));
            let key = assert_ok!(key::single_key(&keys));
            assert_eq!(key.kty().as_str(), key_type);
            assert!(key.is_private());
            if !curve.is_empty() {
                assert_eq!(key.curve().map(|crv| crv.as_str()), Some(curve));
            }
        }
    }

    #[test]
    fn oct_size_is_in_bytes() {
        let keys = assert_ok!(generate(&config("oct", "", 512)));
        let value = serde_json::to_value(&keys.keys()[0]).unwrap();
        let k = value["k"].as_str().unwrap();
        // 512 bytes encode to 683 unpadded base64url characters
        assert_eq!(k.len(), 683);
    }

    #[test]
    fn invalid_combinations_fail_validation() {
        assert_eq!(
            kinds_of(&config("EC", "Ed25519", 2048)),
            vec![ErrorKind::InvalidCurve]
        );
        assert_eq!(
            kinds_of(&config("OKP", "P-256", 2048)),
            vec![ErrorKind::InvalidCurve]
        );
        assert_eq!(kinds_of(&config("EC", "", 2048)), vec![ErrorKind::InvalidCurve]);
        assert_eq!(
            kinds_of(&config("OKP", "Ed448", 2048)),
            vec![ErrorKind::UnsupportedCurve]
        );
        assert_eq!(
            kinds_of(&config("OKP", "X448", 2048)),
            vec![ErrorKind::UnsupportedCurve]
        );
        assert_eq!(
            kinds_of(&config("EC", "p-256", 2048)),
            vec![ErrorKind::InvalidCurve]
        );
    }

    #[test]
    fn key_size_must_be_multiple_of_256() {
        for key_type in ["RSA", "EC", "oct"] {
            for size in [300, 1000] {
                let curve = if key_type == "EC" { "P-256" } else { "" };
                assert_eq!(
                    kinds_of(&config(key_type, curve, size)),
                    vec![ErrorKind::InvalidKeySize]
                );
            }
        }
        assert_eq!(kinds_of(&config("oct", "", 128)), vec![ErrorKind::InvalidKeySize]);
    }

    #[test]
    fn unsupported_rsa_size_fails_generation() {
        assert_eq!(
            kinds_of(&config("RSA", "", 2304)),
            vec![ErrorKind::KeyGenerationFailed]
        );
    }

    #[test]
    fn every_violation_is_reported() {
        let cfg = GenerateConfig {
            key_type: "DSA".to_owned(),
            key_size: 128,
            output_format: "yaml".to_owned(),
            algorithm: "HS1".to_owned(),
            ..Default::default()
        };
        assert_eq!(
            kinds_of(&cfg),
            vec![
                ErrorKind::InvalidKeyType,
                ErrorKind::InvalidKeySize,
                ErrorKind::InvalidOutputFormat,
                ErrorKind::InvalidAlgorithm,
            ]
        );
    }

    #[test]
    fn public_projection() {
        let mut cfg = config("EC", "P-384", 2048);
        cfg.public_key = true;
        let keys = assert_ok!(generate(&cfg));
        assert!(!keys.keys()[0].is_private());

        let mut cfg = config("oct", "", 256);
        cfg.public_key = true;
        assert_eq!(kinds_of(&cfg), vec![ErrorKind::PublicProjectionFailed]);
    }

    #[test]
    fn kid_and_algorithm_are_stamped() {
        let mut cfg = config("OKP", "Ed25519", 2048);
        cfg.kid = "signing-1".to_owned();
        cfg.algorithm = "EdDSA".to_owned();
        let keys = assert_ok!(generate(&cfg));
        assert_eq!(keys.keys()[0].kid(), Some("signing-1"));
        assert_eq!(keys.keys()[0].alg(), Some("EdDSA"));
    }

    #[test]
    fn run_round_trips_through_key_file() {
        let dir = tempfile::tempdir().unwrap();
        for (key_type, curve, size, format) in [
            ("RSA", "", 2048, "pem"),
            ("EC", "P-256", 2048, "json"),
            ("EC", "P-521", 2048, "pem"),
            ("OKP", "Ed25519", 2048, "json"),
            ("OKP", "X25519", 2048, "pem"),
            ("oct", "", 256, "json"),
        ] {
            let path = dir.path().join(format!("{key_type}-{curve}.{format}"));
            let path = path.to_str().unwrap();
            let cfg = GenerateConfig {
                output_format: format.to_owned(),
                output: path.to_owned(),
                ..config(key_type, curve, size)
            };
            assert_ok!(run(&cfg));

            let keys = assert_ok!(key::load(path, format));
            let key = assert_ok!(key::single_key(&keys));
            assert_eq!(key.kty().as_str(), key_type);
        }
    }

    #[test]
    fn invalid_config_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.json");
        let cfg = GenerateConfig {
            output: path.to_str().unwrap().to_owned(),
            ..config("EC", "X25519", 2048)
        };
        assert_err!(run(&cfg));
        assert!(!path.exists());
    }
}
