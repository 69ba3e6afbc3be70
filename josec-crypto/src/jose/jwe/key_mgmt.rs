//! Key management as defined in section 4 of [`rfc7518`].
//!
//! Every algorithm produces a content encryption key (CEK) and the
//! encrypted key to transmit next to it. Header parameters needed to
//! recover the CEK are written into the protected header.
//!
//! [`rfc7518`]: https://datatracker.ietf.org/doc/html/rfc7518#section-4

use std::num::NonZeroU32;

use aws_lc_rs::{
    agreement::{self, UnparsedPublicKey},
    kdf, pbkdf2, rand,
    rsa::{
        OAEP_SHA1_MGF1SHA1, OAEP_SHA256_MGF1SHA256, OaepPrivateDecryptingKey,
        OaepPublicEncryptingKey, Pkcs1PrivateDecryptingKey, Pkcs1PublicEncryptingKey,
        PrivateDecryptingKey, PublicEncryptingKey,
    },
};
use base64::{Engine as _, prelude::BASE64_URL_SAFE_NO_PAD};
use josec_error::{ErrorContext, OpaqueError};
use zeroize::Zeroizing;

use super::{aes_kw, content};
use crate::jose::{
    ContentEncryptionAlgorithm, EllipticCurve, Headers, JWK, KeyEncryptionAlgorithm, KeyType,
    jwk::KeyMaterial,
    pem::{left_pad, material_to_pkcs8, material_to_spki, split_ec_point},
};

const PBES2_SALT_INPUT_LEN: usize = 16;
const PBES2_DEFAULT_ITERATIONS: u32 = 100_000;
const PBES2_MAX_ITERATIONS: u64 = 2_000_000;
const PBES2_MIN_SALT_LEN: usize = 8;

/// CEK together with its encrypted form for a single recipient.
pub(crate) struct WrappedKey {
    pub(crate) cek: Zeroizing<Vec<u8>>,
    pub(crate) encrypted_key: Vec<u8>,
}

/// Produce a CEK for `enc` and protect it with `alg` under `key`.
pub(crate) fn encrypt_cek(
    alg: KeyEncryptionAlgorithm,
    enc: ContentEncryptionAlgorithm,
    key: &KeyMaterial,
    headers: &mut Headers,
) -> Result<WrappedKey, OpaqueError> {
    match alg {
        KeyEncryptionAlgorithm::Dir => {
            let secret = symmetric_key(key, enc.key_len())?;
            Ok(WrappedKey {
                cek: Zeroizing::new(secret.to_vec()),
                encrypted_key: Vec::new(),
            })
        }
        KeyEncryptionAlgorithm::A128KW
        | KeyEncryptionAlgorithm::A192KW
        | KeyEncryptionAlgorithm::A256KW => {
            let kek = symmetric_key(key, wrap_key_len(alg)?)?;
            let cek = random_cek(enc)?;
            let encrypted_key = aes_kw::wrap(kek, &cek)?;
            Ok(WrappedKey { cek, encrypted_key })
        }
        KeyEncryptionAlgorithm::A128GCMKW
        | KeyEncryptionAlgorithm::A192GCMKW
        | KeyEncryptionAlgorithm::A256GCMKW => {
            let kek = symmetric_key(key, wrap_key_len(alg)?)?;
            let cek = random_cek(enc)?;
            let mut iv = [0u8; content::GCM_IV_LEN];
            rand::fill(&mut iv).context("generate key wrap IV")?;
            let (encrypted_key, tag) = content::gcm_seal(kek, iv, &[], &cek)?;
            headers.try_set_header("iv", BASE64_URL_SAFE_NO_PAD.encode(iv))?;
            headers.try_set_header("tag", BASE64_URL_SAFE_NO_PAD.encode(tag))?;
            Ok(WrappedKey { cek, encrypted_key })
        }
        KeyEncryptionAlgorithm::Pbes2Hs256A128KW
        | KeyEncryptionAlgorithm::Pbes2Hs384A192KW
        | KeyEncryptionAlgorithm::Pbes2Hs512A256KW => {
            let password = password(key)?;
            let mut salt_input = [0u8; PBES2_SALT_INPUT_LEN];
            rand::fill(&mut salt_input).context("generate PBES2 salt")?;
            let kek = pbes2_key(alg, password, &salt_input, PBES2_DEFAULT_ITERATIONS)?;
            let cek = random_cek(enc)?;
            let encrypted_key = aes_kw::wrap(&kek, &cek)?;
            headers.try_set_header("p2s", BASE64_URL_SAFE_NO_PAD.encode(salt_input))?;
            headers.try_set_header("p2c", PBES2_DEFAULT_ITERATIONS)?;
            Ok(WrappedKey { cek, encrypted_key })
        }
        KeyEncryptionAlgorithm::EcdhEs => {
            let (z, epk) = ecdh_sender(key)?;
            headers.try_set_header("epk", &epk)?;
            let cek = concat_kdf(&z, enc.as_str(), headers, enc.key_len())?;
            Ok(WrappedKey {
                cek,
                encrypted_key: Vec::new(),
            })
        }
        KeyEncryptionAlgorithm::EcdhEsA128KW
        | KeyEncryptionAlgorithm::EcdhEsA192KW
        | KeyEncryptionAlgorithm::EcdhEsA256KW => {
            let (z, epk) = ecdh_sender(key)?;
            headers.try_set_header("epk", &epk)?;
            let kek = concat_kdf(&z, alg.as_str(), headers, wrap_key_len(alg)?)?;
            let cek = random_cek(enc)?;
            let encrypted_key = aes_kw::wrap(&kek, &cek)?;
            Ok(WrappedKey { cek, encrypted_key })
        }
        KeyEncryptionAlgorithm::RsaOaep | KeyEncryptionAlgorithm::RsaOaep256 => {
            let public_key = rsa_public_key(key)?;
            let oaep = OaepPublicEncryptingKey::new(public_key).context("create RSA-OAEP key")?;
            let padding = if alg == KeyEncryptionAlgorithm::RsaOaep {
                &OAEP_SHA1_MGF1SHA1
            } else {
                &OAEP_SHA256_MGF1SHA256
            };
            let cek = random_cek(enc)?;
            let mut out = vec![0u8; oaep.ciphertext_size()];
            let encrypted_key = oaep
                .encrypt(padding, &cek, &mut out, None)
                .context("RSA-OAEP encrypt")?
                .to_vec();
            Ok(WrappedKey { cek, encrypted_key })
        }
        KeyEncryptionAlgorithm::Rsa15 => {
            let public_key = rsa_public_key(key)?;
            let pkcs1 =
                Pkcs1PublicEncryptingKey::new(public_key).context("create RSA1_5 key")?;
            let cek = random_cek(enc)?;
            let mut out = vec![0u8; pkcs1.ciphertext_size()];
            let encrypted_key = pkcs1
                .encrypt(&cek, &mut out)
                .context("RSA1_5 encrypt")?
                .to_vec();
            Ok(WrappedKey { cek, encrypted_key })
        }
    }
}

/// Recover the CEK for `enc` from `encrypted_key`.
///
/// `headers` is the complete header of the recipient.
pub(crate) fn decrypt_cek(
    alg: KeyEncryptionAlgorithm,
    enc: ContentEncryptionAlgorithm,
    key: &KeyMaterial,
    headers: &Headers,
    encrypted_key: &[u8],
) -> Result<Zeroizing<Vec<u8>>, OpaqueError> {
    match alg {
        KeyEncryptionAlgorithm::Dir => {
            if !encrypted_key.is_empty() {
                return Err(OpaqueError::from_display(
                    "encrypted key must be empty for direct encryption",
                ));
            }
            let secret = symmetric_key(key, enc.key_len())?;
            Ok(Zeroizing::new(secret.to_vec()))
        }
        KeyEncryptionAlgorithm::A128KW
        | KeyEncryptionAlgorithm::A192KW
        | KeyEncryptionAlgorithm::A256KW => {
            let kek = symmetric_key(key, wrap_key_len(alg)?)?;
            aes_kw::unwrap(kek, encrypted_key)
        }
        KeyEncryptionAlgorithm::A128GCMKW
        | KeyEncryptionAlgorithm::A192GCMKW
        | KeyEncryptionAlgorithm::A256GCMKW => {
            let kek = symmetric_key(key, wrap_key_len(alg)?)?;
            let iv = header_bytes(headers, "iv")?;
            let tag = header_bytes(headers, "tag")?;
            content::gcm_open(kek, &iv, &[], encrypted_key, &tag).map(Zeroizing::new)
        }
        KeyEncryptionAlgorithm::Pbes2Hs256A128KW
        | KeyEncryptionAlgorithm::Pbes2Hs384A192KW
        | KeyEncryptionAlgorithm::Pbes2Hs512A256KW => {
            let password = password(key)?;
            let salt_input = header_bytes(headers, "p2s")?;
            if salt_input.len() < PBES2_MIN_SALT_LEN {
                return Err(OpaqueError::from_display(format!(
                    "PBES2 salt input must be at least {PBES2_MIN_SALT_LEN} bytes"
                )));
            }
            let iterations = headers
                .get("p2c")
                .and_then(serde_json::Value::as_u64)
                .context("missing or invalid 'p2c' header")?;
            if iterations > PBES2_MAX_ITERATIONS {
                return Err(OpaqueError::from_display(format!(
                    "PBES2 iteration count {iterations} exceeds the maximum of {PBES2_MAX_ITERATIONS}"
                )));
            }
            let iterations = u32::try_from(iterations).context("PBES2 iteration count")?;
            let kek = pbes2_key(alg, password, &salt_input, iterations)?;
            aes_kw::unwrap(&kek, encrypted_key)
        }
        KeyEncryptionAlgorithm::EcdhEs => {
            if !encrypted_key.is_empty() {
                return Err(OpaqueError::from_display(
                    "encrypted key must be empty for ECDH-ES",
                ));
            }
            let z = ecdh_recipient(key, headers)?;
            concat_kdf(&z, enc.as_str(), headers, enc.key_len())
        }
        KeyEncryptionAlgorithm::EcdhEsA128KW
        | KeyEncryptionAlgorithm::EcdhEsA192KW
        | KeyEncryptionAlgorithm::EcdhEsA256KW => {
            let z = ecdh_recipient(key, headers)?;
            let kek = concat_kdf(&z, alg.as_str(), headers, wrap_key_len(alg)?)?;
            aes_kw::unwrap(&kek, encrypted_key)
        }
        KeyEncryptionAlgorithm::RsaOaep | KeyEncryptionAlgorithm::RsaOaep256 => {
            let private_key = rsa_private_key(key)?;
            let oaep =
                OaepPrivateDecryptingKey::new(private_key).context("create RSA-OAEP key")?;
            let padding = if alg == KeyEncryptionAlgorithm::RsaOaep {
                &OAEP_SHA1_MGF1SHA1
            } else {
                &OAEP_SHA256_MGF1SHA256
            };
            let mut out = Zeroizing::new(vec![0u8; oaep.min_output_size()]);
            let cek = oaep
                .decrypt(padding, encrypted_key, &mut out, None)
                .context("RSA-OAEP decrypt")?;
            Ok(Zeroizing::new(cek.to_vec()))
        }
        KeyEncryptionAlgorithm::Rsa15 => {
            let private_key = rsa_private_key(key)?;
            let pkcs1 =
                Pkcs1PrivateDecryptingKey::new(private_key).context("create RSA1_5 key")?;
            // a random CEK on failure moves the error to the content
            // decryption, so padding oracles see a single failure mode
            let random = random_cek(enc)?;
            let mut out = Zeroizing::new(vec![0u8; pkcs1.min_output_size()]);
            match pkcs1.decrypt(encrypted_key, &mut out) {
                Ok(cek) if cek.len() == enc.key_len() => Ok(Zeroizing::new(cek.to_vec())),
                _ => {
                    tracing::trace!("RSA1_5 key decryption failed, continue with random CEK");
                    Ok(random)
                }
            }
        }
    }
}

fn wrap_key_len(alg: KeyEncryptionAlgorithm) -> Result<usize, OpaqueError> {
    alg.wrap_key_len()
        .with_context(|| format!("{alg} does not wrap keys"))
}

fn random_cek(enc: ContentEncryptionAlgorithm) -> Result<Zeroizing<Vec<u8>>, OpaqueError> {
    let mut cek = Zeroizing::new(vec![0u8; enc.key_len()]);
    rand::fill(cek.as_mut_slice()).context("generate content encryption key")?;
    Ok(cek)
}

fn symmetric_key(key: &KeyMaterial, len: usize) -> Result<&[u8], OpaqueError> {
    match key {
        KeyMaterial::Oct { k } if k.len() == len => Ok(k.as_slice()),
        KeyMaterial::Oct { k } => Err(OpaqueError::from_display(format!(
            "symmetric key must be {len} bytes, got {}",
            k.len()
        ))),
        _ => Err(OpaqueError::from_display("algorithm requires a symmetric key")),
    }
}

fn password(key: &KeyMaterial) -> Result<&[u8], OpaqueError> {
    match key {
        KeyMaterial::Oct { k } if !k.is_empty() => Ok(k.as_slice()),
        KeyMaterial::Oct { .. } => Err(OpaqueError::from_display("PBES2 password is empty")),
        _ => Err(OpaqueError::from_display(
            "PBES2 requires a symmetric key holding the password",
        )),
    }
}

fn header_bytes(headers: &Headers, name: &str) -> Result<Vec<u8>, OpaqueError> {
    let value = headers
        .get_str(name)
        .with_context(|| format!("missing '{name}' header"))?;
    BASE64_URL_SAFE_NO_PAD
        .decode(value)
        .with_context(|| format!("decode '{name}' header"))
}

fn pbes2_key(
    alg: KeyEncryptionAlgorithm,
    password: &[u8],
    salt_input: &[u8],
    iterations: u32,
) -> Result<Zeroizing<Vec<u8>>, OpaqueError> {
    let prf = match alg {
        KeyEncryptionAlgorithm::Pbes2Hs256A128KW => pbkdf2::PBKDF2_HMAC_SHA256,
        KeyEncryptionAlgorithm::Pbes2Hs384A192KW => pbkdf2::PBKDF2_HMAC_SHA384,
        KeyEncryptionAlgorithm::Pbes2Hs512A256KW => pbkdf2::PBKDF2_HMAC_SHA512,
        _ => {
            return Err(OpaqueError::from_display(format!(
                "{alg} is not a PBES2 algorithm"
            )));
        }
    };
    let iterations = NonZeroU32::new(iterations).context("PBES2 iteration count is zero")?;

    let mut salt = Vec::with_capacity(alg.as_str().len() + 1 + salt_input.len());
    salt.extend_from_slice(alg.as_str().as_bytes());
    salt.push(0);
    salt.extend_from_slice(salt_input);

    let mut kek = Zeroizing::new(vec![0u8; wrap_key_len(alg)?]);
    pbkdf2::derive(prf, iterations, &salt, password, kek.as_mut_slice());
    Ok(kek)
}

fn agreement_algorithm(
    curve: EllipticCurve,
) -> Result<&'static agreement::Algorithm, OpaqueError> {
    match curve {
        EllipticCurve::P256 => Ok(&agreement::ECDH_P256),
        EllipticCurve::P384 => Ok(&agreement::ECDH_P384),
        EllipticCurve::P521 => Ok(&agreement::ECDH_P521),
        EllipticCurve::X25519 => Ok(&agreement::X25519),
        curve => Err(OpaqueError::from_display(format!(
            "curve {curve} cannot be used for key agreement"
        ))),
    }
}

/// Public key of a recipient in the encoding expected by [`UnparsedPublicKey`].
fn agreement_public_key(key: &KeyMaterial) -> Result<(EllipticCurve, Vec<u8>), OpaqueError> {
    match key {
        KeyMaterial::Ec { crv, x, y, .. } => {
            let len = crv.coordinate_len();
            Ok((
                *crv,
                KeyMaterial::ec_point(&left_pad(x, len), &left_pad(y, len)),
            ))
        }
        KeyMaterial::Okp { crv, x, .. } => Ok((*crv, x.clone())),
        _ => Err(OpaqueError::from_display(
            "ECDH-ES requires an EC or OKP key",
        )),
    }
}

/// Ephemeral-static agreement on the sender side, returns `Z` and the `epk` header.
fn ecdh_sender(key: &KeyMaterial) -> Result<(Zeroizing<Vec<u8>>, JWK), OpaqueError> {
    let (curve, peer) = agreement_public_key(key)?;
    let algorithm = agreement_algorithm(curve)?;

    let ephemeral =
        agreement::PrivateKey::generate(algorithm).context("generate ephemeral key")?;
    let ephemeral_public = ephemeral
        .compute_public_key()
        .context("compute ephemeral public key")?;
    let epk = match curve.key_type() {
        KeyType::Ec => {
            let (x, y) = split_ec_point(curve, ephemeral_public.as_ref())?;
            KeyMaterial::Ec {
                crv: curve,
                x,
                y,
                d: None,
            }
        }
        _ => KeyMaterial::Okp {
            crv: curve,
            x: ephemeral_public.as_ref().to_vec(),
            d: None,
        },
    };

    let z = agree(&ephemeral, algorithm, &peer)?;
    Ok((z, JWK::from_material(&epk)))
}

/// Ephemeral-static agreement on the recipient side, returns `Z`.
fn ecdh_recipient(key: &KeyMaterial, headers: &Headers) -> Result<Zeroizing<Vec<u8>>, OpaqueError> {
    let (curve, d) = match key {
        KeyMaterial::Ec { crv, d: Some(d), .. } => {
            (*crv, Zeroizing::new(left_pad(d, crv.coordinate_len())))
        }
        KeyMaterial::Okp { crv, d: Some(d), .. } => (*crv, d.clone()),
        _ => {
            return Err(OpaqueError::from_display(
                "ECDH-ES decryption requires a private EC or OKP key",
            ));
        }
    };
    let algorithm = agreement_algorithm(curve)?;

    let epk: JWK = serde_json::from_value(
        headers
            .get("epk")
            .cloned()
            .context("missing 'epk' header")?,
    )
    .context("parse 'epk' header")?;
    let (epk_curve, peer) = agreement_public_key(&epk.material()?)?;
    if epk_curve != curve {
        return Err(OpaqueError::from_display(format!(
            "ephemeral key on {epk_curve} does not match recipient key on {curve}"
        )));
    }

    let private_key = agreement::PrivateKey::from_private_key(algorithm, &d)
        .context("load agreement private key")?;
    agree(&private_key, algorithm, &peer)
}

fn agree(
    private_key: &agreement::PrivateKey,
    algorithm: &'static agreement::Algorithm,
    peer: &[u8],
) -> Result<Zeroizing<Vec<u8>>, OpaqueError> {
    agreement::agree(
        private_key,
        &UnparsedPublicKey::new(algorithm, peer),
        OpaqueError::from_display("ECDH key agreement failed"),
        |z| Ok(Zeroizing::new(z.to_vec())),
    )
}

/// Concat KDF over SHA-256 as used by ECDH-ES, see section 4.6.2 of RFC 7518.
fn concat_kdf(
    z: &[u8],
    algorithm_id: &str,
    headers: &Headers,
    key_len: usize,
) -> Result<Zeroizing<Vec<u8>>, OpaqueError> {
    let party_u = optional_header_bytes(headers, "apu")?;
    let party_v = optional_header_bytes(headers, "apv")?;
    let key_bits = u32::try_from(key_len * 8).context("derived key length")?;

    let mut other_info = Vec::new();
    for field in [
        algorithm_id.as_bytes(),
        party_u.as_slice(),
        party_v.as_slice(),
    ] {
        let len = u32::try_from(field.len()).context("concat KDF field length")?;
        other_info.extend_from_slice(&len.to_be_bytes());
        other_info.extend_from_slice(field);
    }
    other_info.extend_from_slice(&key_bits.to_be_bytes());

    let algorithm = kdf::get_sskdf_digest_algorithm(kdf::SskdfDigestAlgorithmId::Sha256)
        .context("concat KDF over SHA-256")?;
    let mut derived = Zeroizing::new(vec![0u8; key_len]);
    kdf::sskdf_digest(algorithm, z, &other_info, derived.as_mut_slice())
        .context("derive concat KDF key")?;
    Ok(derived)
}

fn optional_header_bytes(headers: &Headers, name: &str) -> Result<Vec<u8>, OpaqueError> {
    match headers.get_str(name) {
        Some(_) => header_bytes(headers, name),
        None => Ok(Vec::new()),
    }
}

fn rsa_public_key(key: &KeyMaterial) -> Result<PublicEncryptingKey, OpaqueError> {
    if !matches!(key, KeyMaterial::Rsa { .. }) {
        return Err(OpaqueError::from_display("algorithm requires an RSA key"));
    }
    let spki = material_to_spki(key)?;
    PublicEncryptingKey::from_der(&spki).context("load RSA public key")
}

fn rsa_private_key(key: &KeyMaterial) -> Result<PrivateDecryptingKey, OpaqueError> {
    match key {
        KeyMaterial::Rsa {
            private: Some(_), ..
        } => {
            let pkcs8 = Zeroizing::new(material_to_pkcs8(key)?);
            PrivateDecryptingKey::from_pkcs8(&pkcs8).context("load RSA private key")
        }
        _ => Err(OpaqueError::from_display(
            "algorithm requires a private RSA key",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jose::generate_key;

    fn material(jwk: &JWK) -> KeyMaterial {
        jwk.material().unwrap()
    }

    #[test]
    fn concat_kdf_rfc7518_appendix_c() {
        let z = [
            158, 86, 217, 29, 129, 113, 53, 211, 114, 131, 66, 131, 191, 132, 38, 156, 251, 49,
            110, 163, 218, 128, 106, 72, 246, 218, 167, 121, 140, 254, 144, 196,
        ];
        let mut headers = Headers::default();
        headers
            .try_set_header("apu", "QWxpY2U")
            .unwrap()
            .try_set_header("apv", "Qm9i")
            .unwrap();
        let derived = concat_kdf(&z, "A128GCM", &headers, 16).unwrap();
        assert_eq!(
            BASE64_URL_SAFE_NO_PAD.encode(derived.as_slice()),
            "VqqN6vgjbSBcIijNcacQGg"
        );
    }

    #[test]
    fn symmetric_algorithms_round_trip() {
        let enc = ContentEncryptionAlgorithm::A256Gcm;
        for alg in [
            KeyEncryptionAlgorithm::Dir,
            KeyEncryptionAlgorithm::A128KW,
            KeyEncryptionAlgorithm::A192KW,
            KeyEncryptionAlgorithm::A256KW,
            KeyEncryptionAlgorithm::A192GCMKW,
            KeyEncryptionAlgorithm::Pbes2Hs384A192KW,
        ] {
            let len = alg.wrap_key_len().unwrap_or(enc.key_len());
            let key = material(&generate_key(KeyType::Oct, None, len).unwrap());
            let mut headers = Headers::default();
            let wrapped = encrypt_cek(alg, enc, &key, &mut headers).unwrap();
            let cek = decrypt_cek(alg, enc, &key, &headers, &wrapped.encrypted_key).unwrap();
            assert_eq!(cek.as_slice(), wrapped.cek.as_slice(), "{alg}");
        }
    }

    #[test]
    fn pbes2_refuses_excessive_iterations() {
        let alg = KeyEncryptionAlgorithm::Pbes2Hs256A128KW;
        let enc = ContentEncryptionAlgorithm::A128Gcm;
        let key = material(&JWK::new_oct(b"secret"));
        let mut headers = Headers::default();
        let wrapped = encrypt_cek(alg, enc, &key, &mut headers).unwrap();
        assert_eq!(
            headers.get("p2c").and_then(serde_json::Value::as_u64),
            Some(u64::from(PBES2_DEFAULT_ITERATIONS))
        );
        headers.try_set_header("p2c", 2_000_001).unwrap();
        assert!(decrypt_cek(alg, enc, &key, &headers, &wrapped.encrypted_key).is_err());
    }

    #[test]
    fn pbes2_refuses_short_salt_input() {
        let alg = KeyEncryptionAlgorithm::Pbes2Hs512A256KW;
        let enc = ContentEncryptionAlgorithm::A256Gcm;
        let key = material(&JWK::new_oct(b"secret"));
        let mut headers = Headers::default();
        let wrapped = encrypt_cek(alg, enc, &key, &mut headers).unwrap();
        assert_eq!(
            header_bytes(&headers, "p2s").unwrap().len(),
            PBES2_SALT_INPUT_LEN
        );

        headers
            .try_set_header("p2s", BASE64_URL_SAFE_NO_PAD.encode([0u8; 7]))
            .unwrap();
        let err = decrypt_cek(alg, enc, &key, &headers, &wrapped.encrypted_key).unwrap_err();
        assert!(err.to_string().contains("salt input"), "{err}");
    }

    #[test]
    fn ecdh_es_agrees_on_every_curve() {
        let enc = ContentEncryptionAlgorithm::A128CbcHs256;
        for (key_type, curve) in [
            (KeyType::Ec, EllipticCurve::P256),
            (KeyType::Ec, EllipticCurve::P384),
            (KeyType::Ec, EllipticCurve::P521),
            (KeyType::Okp, EllipticCurve::X25519),
        ] {
            let private = generate_key(key_type, Some(curve), 0).unwrap();
            let public = private.to_public().unwrap();
            for alg in [
                KeyEncryptionAlgorithm::EcdhEs,
                KeyEncryptionAlgorithm::EcdhEsA256KW,
            ] {
                let mut headers = Headers::default();
                let wrapped = encrypt_cek(alg, enc, &material(&public), &mut headers).unwrap();
                let epk = headers.get("epk").unwrap();
                assert!(epk.get("d").is_none(), "{curve}: epk must be public");
                let cek = decrypt_cek(
                    alg,
                    enc,
                    &material(&private),
                    &headers,
                    &wrapped.encrypted_key,
                )
                .unwrap();
                assert_eq!(cek.as_slice(), wrapped.cek.as_slice(), "{alg} on {curve}");
            }
        }
    }

    #[test]
    fn ecdh_es_rejects_signing_curve() {
        let key = generate_key(KeyType::Okp, Some(EllipticCurve::Ed25519), 0).unwrap();
        let mut headers = Headers::default();
        assert!(
            encrypt_cek(
                KeyEncryptionAlgorithm::EcdhEs,
                ContentEncryptionAlgorithm::A128Gcm,
                &material(&key),
                &mut headers,
            )
            .is_err()
        );
    }

    #[test]
    fn rsa_algorithms_round_trip() {
        let private = generate_key(KeyType::Rsa, None, 2048).unwrap();
        let public = private.to_public().unwrap();
        let enc = ContentEncryptionAlgorithm::A192CbcHs384;
        for alg in [
            KeyEncryptionAlgorithm::RsaOaep,
            KeyEncryptionAlgorithm::RsaOaep256,
            KeyEncryptionAlgorithm::Rsa15,
        ] {
            let mut headers = Headers::default();
            let wrapped = encrypt_cek(alg, enc, &material(&public), &mut headers).unwrap();
            let cek = decrypt_cek(
                alg,
                enc,
                &material(&private),
                &headers,
                &wrapped.encrypted_key,
            )
            .unwrap();
            assert_eq!(cek.as_slice(), wrapped.cek.as_slice(), "{alg}");

            assert!(
                decrypt_cek(alg, enc, &material(&public), &headers, &wrapped.encrypted_key)
                    .is_err(),
                "{alg}: public key cannot decrypt"
            );
        }
    }

    #[test]
    fn rsa1_5_failure_yields_random_cek() {
        let private = generate_key(KeyType::Rsa, None, 2048).unwrap();
        let enc = ContentEncryptionAlgorithm::A128Gcm;
        let cek = decrypt_cek(
            KeyEncryptionAlgorithm::Rsa15,
            enc,
            &material(&private),
            &Headers::default(),
            &[0u8; 256],
        )
        .unwrap();
        assert_eq!(cek.len(), enc.key_len());
    }

    #[test]
    fn key_type_mismatch_is_rejected() {
        let oct = material(&JWK::new_oct(&[0u8; 16]));
        let ec = material(&generate_key(KeyType::Ec, Some(EllipticCurve::P256), 0).unwrap());
        let enc = ContentEncryptionAlgorithm::A128Gcm;
        let mut headers = Headers::default();
        assert!(encrypt_cek(KeyEncryptionAlgorithm::RsaOaep, enc, &oct, &mut headers).is_err());
        assert!(encrypt_cek(KeyEncryptionAlgorithm::A128KW, enc, &ec, &mut headers).is_err());
        assert!(encrypt_cek(KeyEncryptionAlgorithm::A256KW, enc, &oct, &mut headers).is_err());
        assert!(encrypt_cek(KeyEncryptionAlgorithm::Dir, enc, &oct, &mut headers).is_ok());
    }
}
