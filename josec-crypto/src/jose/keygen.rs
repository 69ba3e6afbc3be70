use aws_lc_rs::{
    encoding::AsDer,
    rand::{SecureRandom as _, SystemRandom},
    rsa::{KeyPair as RsaKeyPair, KeySize},
    signature::{
        ECDSA_P256_SHA256_FIXED_SIGNING, ECDSA_P384_SHA384_FIXED_SIGNING,
        ECDSA_P521_SHA512_FIXED_SIGNING, EcdsaKeyPair,
    },
};
use josec_error::{ErrorContext, OpaqueError};
use zeroize::Zeroizing;

use crate::jose::{
    EllipticCurve, JWK, KeyType,
    constants::{DER_TAG_OCTET_STRING, OID_ED25519, OID_X25519},
    der::{algorithm_identifier, encode_tlv, private_key_info},
    pem::material_from_pkcs8,
};

/// Generate a fresh private [`JWK`].
///
/// `size` is the modulus length in bits for RSA keys and the
/// secret length in bytes for `oct` keys, it is ignored otherwise.
/// EC and OKP keys require a `curve` of their family.
pub fn generate_key(
    key_type: KeyType,
    curve: Option<EllipticCurve>,
    size: usize,
) -> Result<JWK, OpaqueError> {
    tracing::trace!(%key_type, ?curve, size, "generate key material");
    match key_type {
        KeyType::Rsa => generate_rsa(size),
        KeyType::Ec => generate_ec(curve),
        KeyType::Okp => generate_okp(curve),
        KeyType::Oct => generate_oct(size),
    }
}

fn generate_rsa(bits: usize) -> Result<JWK, OpaqueError> {
    let key_size = match bits {
        2048 => KeySize::Rsa2048,
        3072 => KeySize::Rsa3072,
        4096 => KeySize::Rsa4096,
        8192 => KeySize::Rsa8192,
        _ => {
            return Err(OpaqueError::from_display(format!(
                "unsupported RSA modulus size: {bits} (2048, 3072, 4096 or 8192)"
            )));
        }
    };
    let key_pair = RsaKeyPair::generate(key_size).context("generate RSA key pair")?;
    let der = key_pair.as_der().context("encode RSA key pair as PKCS#8")?;
    let material = material_from_pkcs8(der.as_ref())?;
    Ok(JWK::from_material(&material))
}

fn generate_ec(curve: Option<EllipticCurve>) -> Result<JWK, OpaqueError> {
    let alg = match curve {
        Some(EllipticCurve::P256) => &ECDSA_P256_SHA256_FIXED_SIGNING,
        Some(EllipticCurve::P384) => &ECDSA_P384_SHA384_FIXED_SIGNING,
        Some(EllipticCurve::P521) => &ECDSA_P521_SHA512_FIXED_SIGNING,
        _ => {
            return Err(OpaqueError::from_display(
                "EC keys are generated on P-256, P-384 or P-521",
            ));
        }
    };
    let key_pair = EcdsaKeyPair::generate(alg).context("generate EC key pair")?;
    let der = key_pair
        .to_pkcs8v1()
        .context("encode EC key pair as PKCS#8")?;
    let material = material_from_pkcs8(der.as_ref())?;
    Ok(JWK::from_material(&material))
}

fn generate_okp(curve: Option<EllipticCurve>) -> Result<JWK, OpaqueError> {
    let oid = match curve {
        Some(EllipticCurve::Ed25519) => OID_ED25519,
        Some(EllipticCurve::X25519) => OID_X25519,
        _ => {
            return Err(OpaqueError::from_display(
                "OKP keys are generated on Ed25519 or X25519",
            ));
        }
    };

    let mut seed = Zeroizing::new([0u8; 32]);
    SystemRandom::new()
        .fill(seed.as_mut())
        .context("generate OKP seed")?;

    // the PKCS#8 parser derives the public key
    let der = Zeroizing::new(private_key_info(
        &algorithm_identifier(oid, None),
        &encode_tlv(DER_TAG_OCTET_STRING, seed.as_ref()),
    ));
    let material = material_from_pkcs8(&der)?;
    Ok(JWK::from_material(&material))
}

fn generate_oct(size: usize) -> Result<JWK, OpaqueError> {
    if size == 0 {
        return Err(OpaqueError::from_display("symmetric key cannot be empty"));
    }
    let mut secret = Zeroizing::new(vec![0u8; size]);
    SystemRandom::new()
        .fill(secret.as_mut_slice())
        .context("generate symmetric secret")?;
    Ok(JWK::new_oct(&secret))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jose::JWKType;

    #[test]
    fn generate_every_supported_kind() {
        let rsa = generate_key(KeyType::Rsa, None, 2048).unwrap();
        assert_eq!(rsa.kty(), KeyType::Rsa);
        assert!(rsa.is_private());
        match rsa.key_type() {
            JWKType::Rsa { e, .. } => assert_eq!(e, "AQAB"),
            other => panic!("unexpected key type: {other:?}"),
        }

        for curve in [EllipticCurve::P256, EllipticCurve::P384, EllipticCurve::P521] {
            let ec = generate_key(KeyType::Ec, Some(curve), 0).unwrap();
            assert_eq!(ec.kty(), KeyType::Ec);
            assert_eq!(ec.curve(), Some(curve));
            assert!(ec.is_private());
        }

        for curve in [EllipticCurve::Ed25519, EllipticCurve::X25519] {
            let okp = generate_key(KeyType::Okp, Some(curve), 0).unwrap();
            assert_eq!(okp.kty(), KeyType::Okp);
            assert_eq!(okp.curve(), Some(curve));
        }

        let oct = generate_key(KeyType::Oct, None, 64).unwrap();
        match oct.key_type() {
            // 64 bytes encode to 86 unpadded base64 characters
            JWKType::Oct { k } => assert_eq!(k.len(), 86),
            other => panic!("unexpected key type: {other:?}"),
        }
    }

    #[test]
    fn generated_keys_are_unique() {
        let a = generate_key(KeyType::Oct, None, 32).unwrap();
        let b = generate_key(KeyType::Oct, None, 32).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn reject_unsupported_parameters() {
        assert!(generate_key(KeyType::Rsa, None, 1024).is_err());
        assert!(generate_key(KeyType::Rsa, None, 2304).is_err());
        assert!(generate_key(KeyType::Ec, None, 0).is_err());
        assert!(generate_key(KeyType::Ec, Some(EllipticCurve::Ed25519), 0).is_err());
        assert!(generate_key(KeyType::Okp, Some(EllipticCurve::Ed448), 0).is_err());
        assert!(generate_key(KeyType::Okp, Some(EllipticCurve::P256), 0).is_err());
        assert!(generate_key(KeyType::Oct, None, 0).is_err());
    }
}
