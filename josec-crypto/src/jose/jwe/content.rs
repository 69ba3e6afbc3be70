//! Content encryption as defined in section 5 of [`rfc7518`].
//!
//! [`rfc7518`]: https://datatracker.ietf.org/doc/html/rfc7518#section-5

use aws_lc_rs::{
    aead::{self, Aad, LessSafeKey, Nonce, UnboundKey},
    cipher::{
        AES_128, AES_192, AES_256, DecryptionContext, EncryptionContext, PaddedBlockDecryptingKey,
        PaddedBlockEncryptingKey, UnboundCipherKey,
    },
    constant_time::verify_slices_are_equal,
    hmac, rand,
};
use josec_error::{ErrorContext, OpaqueError};
use zeroize::Zeroizing;

use crate::jose::ContentEncryptionAlgorithm;

pub(crate) const GCM_IV_LEN: usize = 12;
const CBC_IV_LEN: usize = 16;

/// Output of a content encryption.
pub(crate) struct Sealed {
    pub(crate) iv: Vec<u8>,
    pub(crate) ciphertext: Vec<u8>,
    pub(crate) tag: Vec<u8>,
}

/// Encrypt `plaintext` under `cek`, authenticating `aad` along with it.
pub(crate) fn encrypt(
    enc: ContentEncryptionAlgorithm,
    cek: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<Sealed, OpaqueError> {
    check_key_len(enc, cek)?;
    match enc {
        ContentEncryptionAlgorithm::A128Gcm
        | ContentEncryptionAlgorithm::A192Gcm
        | ContentEncryptionAlgorithm::A256Gcm => {
            let mut iv = [0u8; GCM_IV_LEN];
            rand::fill(&mut iv).context("generate IV")?;
            let (ciphertext, tag) = gcm_seal(cek, iv, aad, plaintext)?;
            Ok(Sealed {
                iv: iv.to_vec(),
                ciphertext,
                tag,
            })
        }
        ContentEncryptionAlgorithm::A128CbcHs256
        | ContentEncryptionAlgorithm::A192CbcHs384
        | ContentEncryptionAlgorithm::A256CbcHs512 => cbc_hmac_encrypt(enc, cek, aad, plaintext),
    }
}

/// Decrypt and authenticate a ciphertext produced by [`encrypt`].
pub(crate) fn decrypt(
    enc: ContentEncryptionAlgorithm,
    cek: &[u8],
    aad: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, OpaqueError> {
    check_key_len(enc, cek)?;
    match enc {
        ContentEncryptionAlgorithm::A128Gcm
        | ContentEncryptionAlgorithm::A192Gcm
        | ContentEncryptionAlgorithm::A256Gcm => gcm_open(cek, iv, aad, ciphertext, tag),
        ContentEncryptionAlgorithm::A128CbcHs256
        | ContentEncryptionAlgorithm::A192CbcHs384
        | ContentEncryptionAlgorithm::A256CbcHs512 => {
            cbc_hmac_decrypt(enc, cek, aad, iv, ciphertext, tag)
        }
    }
}

fn check_key_len(enc: ContentEncryptionAlgorithm, cek: &[u8]) -> Result<(), OpaqueError> {
    if cek.len() == enc.key_len() {
        Ok(())
    } else {
        Err(OpaqueError::from_display(format!(
            "{enc} requires a {} byte key, got {}",
            enc.key_len(),
            cek.len()
        )))
    }
}

fn gcm_key(key: &[u8]) -> Result<LessSafeKey, OpaqueError> {
    let algorithm = match key.len() {
        16 => &aead::AES_128_GCM,
        24 => &aead::AES_192_GCM,
        32 => &aead::AES_256_GCM,
        len => {
            return Err(OpaqueError::from_display(format!(
                "invalid AES-GCM key length: {len}"
            )));
        }
    };
    let key = UnboundKey::new(algorithm, key).context("load AES-GCM key")?;
    Ok(LessSafeKey::new(key))
}

/// AES-GCM seal, returning the ciphertext and the detached tag.
pub(crate) fn gcm_seal(
    key: &[u8],
    iv: [u8; GCM_IV_LEN],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, Vec<u8>), OpaqueError> {
    let key = gcm_key(key)?;
    let mut in_out = plaintext.to_vec();
    let tag = key
        .seal_in_place_separate_tag(
            Nonce::assume_unique_for_key(iv),
            Aad::from(aad),
            &mut in_out,
        )
        .context("AES-GCM seal")?;
    Ok((in_out, tag.as_ref().to_vec()))
}

/// AES-GCM open with a detached tag.
pub(crate) fn gcm_open(
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, OpaqueError> {
    let key = gcm_key(key)?;
    let nonce = Nonce::try_assume_unique_for_key(iv).context("invalid AES-GCM IV")?;
    let mut in_out = Vec::with_capacity(ciphertext.len() + tag.len());
    in_out.extend_from_slice(ciphertext);
    in_out.extend_from_slice(tag);
    let plaintext_len = key
        .open_in_place(nonce, Aad::from(aad), &mut in_out)
        .context("AES-GCM open")?
        .len();
    in_out.truncate(plaintext_len);
    Ok(in_out)
}

struct CbcHmacKeys<'a> {
    mac_key: &'a [u8],
    enc_key: &'a [u8],
    hmac: hmac::Algorithm,
}

impl<'a> CbcHmacKeys<'a> {
    /// The CEK is the MAC key followed by the encryption key.
    fn split(enc: ContentEncryptionAlgorithm, cek: &'a [u8]) -> Result<Self, OpaqueError> {
        let hmac = match enc {
            ContentEncryptionAlgorithm::A128CbcHs256 => hmac::HMAC_SHA256,
            ContentEncryptionAlgorithm::A192CbcHs384 => hmac::HMAC_SHA384,
            ContentEncryptionAlgorithm::A256CbcHs512 => hmac::HMAC_SHA512,
            _ => {
                return Err(OpaqueError::from_display(format!(
                    "{enc} is not an AES-CBC-HMAC algorithm"
                )));
            }
        };
        let (mac_key, enc_key) = cek.split_at(cek.len() / 2);
        Ok(Self {
            mac_key,
            enc_key,
            hmac,
        })
    }

    fn cipher_key(&self) -> Result<UnboundCipherKey, OpaqueError> {
        let algorithm = match self.enc_key.len() {
            16 => &AES_128,
            24 => &AES_192,
            _ => &AES_256,
        };
        UnboundCipherKey::new(algorithm, self.enc_key).context("load AES-CBC key")
    }

    /// Authentication tag over `AAD || IV || ciphertext || AL`, truncated to the MAC key length.
    fn tag(&self, aad: &[u8], iv: &[u8], ciphertext: &[u8]) -> Vec<u8> {
        let key = hmac::Key::new(self.hmac, self.mac_key);
        let mut ctx = hmac::Context::with_key(&key);
        ctx.update(aad);
        ctx.update(iv);
        ctx.update(ciphertext);
        ctx.update(&((aad.len() as u64) * 8).to_be_bytes());
        let mut tag = ctx.sign().as_ref().to_vec();
        tag.truncate(self.mac_key.len());
        tag
    }
}

fn cbc_hmac_encrypt(
    enc: ContentEncryptionAlgorithm,
    cek: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<Sealed, OpaqueError> {
    let keys = CbcHmacKeys::split(enc, cek)?;
    let mut iv = [0u8; CBC_IV_LEN];
    rand::fill(&mut iv).context("generate IV")?;

    let cipher = PaddedBlockEncryptingKey::cbc_pkcs7(keys.cipher_key()?)
        .context("create AES-CBC encrypting key")?;
    let mut ciphertext = plaintext.to_vec();
    cipher
        .less_safe_encrypt(&mut ciphertext, EncryptionContext::Iv128(iv.into()))
        .context("AES-CBC encrypt")?;

    let tag = keys.tag(aad, &iv, &ciphertext);
    Ok(Sealed {
        iv: iv.to_vec(),
        ciphertext,
        tag,
    })
}

fn cbc_hmac_decrypt(
    enc: ContentEncryptionAlgorithm,
    cek: &[u8],
    aad: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, OpaqueError> {
    let keys = CbcHmacKeys::split(enc, cek)?;
    let expected = keys.tag(aad, iv, ciphertext);
    verify_slices_are_equal(&expected, tag).context("authentication tag mismatch")?;

    let iv: [u8; CBC_IV_LEN] = iv.try_into().context("invalid AES-CBC IV")?;
    let cipher = PaddedBlockDecryptingKey::cbc_pkcs7(keys.cipher_key()?)
        .context("create AES-CBC decrypting key")?;
    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    let plaintext = cipher
        .decrypt(&mut in_out, DecryptionContext::Iv128(iv.into()))
        .context("AES-CBC decrypt")?;
    Ok(plaintext.to_vec())
}
