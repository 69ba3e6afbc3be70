//! AES Key Wrap as defined in [RFC 3394](https://datatracker.ietf.org/doc/html/rfc3394).
//!
//! AES-128 and AES-256 key encryption keys use the key wrap of aws-lc-rs.
//! It has no AES-192 key wrap, so for 192-bit keys the wrap is built on
//! the raw block cipher.

use aws_lc_rs::{
    cipher::{
        AES_192, DecryptionContext, EncryptionContext, PaddedBlockDecryptingKey,
        PaddedBlockEncryptingKey, UnboundCipherKey,
    },
    constant_time::verify_slices_are_equal,
    key_wrap::{self, AesKek, KeyWrap as _},
};
use josec_error::{ErrorContext, OpaqueError};
use zeroize::{Zeroize as _, Zeroizing};

const BLOCK_LEN: usize = 16;
const SEMIBLOCK_LEN: usize = 8;
const DEFAULT_IV: [u8; SEMIBLOCK_LEN] = [0xa6; SEMIBLOCK_LEN];
const ZERO_IV: [u8; BLOCK_LEN] = [0; BLOCK_LEN];
/// A full block of PKCS#7 padding.
const PADDING_BLOCK: [u8; BLOCK_LEN] = [BLOCK_LEN as u8; BLOCK_LEN];

/// Key encryption key, by length.
enum Kek<'a> {
    Native(&'static key_wrap::AesBlockCipher, &'a [u8]),
    Aes192(&'a [u8]),
}

impl<'a> Kek<'a> {
    fn new(kek: &'a [u8]) -> Result<Self, OpaqueError> {
        match kek.len() {
            16 => Ok(Self::Native(&key_wrap::AES_128, kek)),
            24 => Ok(Self::Aes192(kek)),
            32 => Ok(Self::Native(&key_wrap::AES_256, kek)),
            len => Err(OpaqueError::from_display(format!(
                "invalid key wrap key length: {len}"
            ))),
        }
    }
}

/// Raw AES-192 block cipher.
///
/// Single blocks are pushed through CBC with a zero IV,
/// the trailing padding block is dropped again.
struct AesBlock {
    encrypting: PaddedBlockEncryptingKey,
    decrypting: PaddedBlockDecryptingKey,
}

impl AesBlock {
    fn new(kek: &[u8]) -> Result<Self, OpaqueError> {
        let encrypting = PaddedBlockEncryptingKey::cbc_pkcs7(
            UnboundCipherKey::new(&AES_192, kek).context("load key wrap key")?,
        )
        .context("create AES encrypting key")?;
        let decrypting = PaddedBlockDecryptingKey::cbc_pkcs7(
            UnboundCipherKey::new(&AES_192, kek).context("load key wrap key")?,
        )
        .context("create AES decrypting key")?;
        Ok(Self {
            encrypting,
            decrypting,
        })
    }

    fn encrypt(&self, block: &[u8; BLOCK_LEN]) -> Result<[u8; BLOCK_LEN], OpaqueError> {
        let mut in_out = block.to_vec();
        let result = self
            .encrypting
            .less_safe_encrypt(&mut in_out, EncryptionContext::Iv128(ZERO_IV.into()));
        let mut out = [0u8; BLOCK_LEN];
        if result.is_ok() {
            out.copy_from_slice(&in_out[..BLOCK_LEN]);
        }
        in_out.zeroize();
        result.context("AES encrypt block")?;
        Ok(out)
    }

    fn decrypt(&self, block: &[u8; BLOCK_LEN]) -> Result<[u8; BLOCK_LEN], OpaqueError> {
        // append the encryption of a padding block chained on `block`,
        // so the CBC padding check strips it again
        let mut chained = PADDING_BLOCK;
        chained
            .iter_mut()
            .zip(block)
            .for_each(|(padding, byte)| *padding ^= byte);
        let chained = self.encrypt(&chained)?;

        let mut in_out = Zeroizing::new(Vec::with_capacity(2 * BLOCK_LEN));
        in_out.extend_from_slice(block);
        in_out.extend_from_slice(&chained);
        let plaintext = self
            .decrypting
            .decrypt(in_out.as_mut_slice(), DecryptionContext::Iv128(ZERO_IV.into()))
            .context("AES decrypt block")?;
        let plaintext: &[u8; BLOCK_LEN] = (&*plaintext)
            .try_into()
            .context("AES decrypt block length")?;
        Ok(*plaintext)
    }
}

/// Wrap `key` with the key encryption key `kek`.
pub(crate) fn wrap(kek: &[u8], key: &[u8]) -> Result<Vec<u8>, OpaqueError> {
    if key.len() % SEMIBLOCK_LEN != 0 || key.len() < 2 * SEMIBLOCK_LEN {
        return Err(OpaqueError::from_display(
            "key to wrap must be a multiple of 64 bits and at least 128 bits",
        ));
    }
    match Kek::new(kek)? {
        Kek::Native(cipher, kek) => {
            let kek = AesKek::new(cipher, kek).context("load key wrap key")?;
            let mut out = vec![0u8; key.len() + SEMIBLOCK_LEN];
            let len = kek.wrap(key, out.as_mut_slice()).context("AES key wrap")?.len();
            out.truncate(len);
            Ok(out)
        }
        Kek::Aes192(kek) => wrap_with_block_cipher(&AesBlock::new(kek)?, key),
    }
}

fn wrap_with_block_cipher(aes: &AesBlock, key: &[u8]) -> Result<Vec<u8>, OpaqueError> {
    let n = key.len() / SEMIBLOCK_LEN;

    let mut a = DEFAULT_IV;
    let mut r = Zeroizing::new(key.to_vec());
    let mut block = Zeroizing::new([0u8; BLOCK_LEN]);
    for j in 0..6 {
        for (i, semiblock) in r.chunks_exact_mut(SEMIBLOCK_LEN).enumerate() {
            block[..SEMIBLOCK_LEN].copy_from_slice(&a);
            block[SEMIBLOCK_LEN..].copy_from_slice(semiblock);
            *block = aes.encrypt(&block)?;

            let t = (n * j + i + 1) as u64;
            a.copy_from_slice(&block[..SEMIBLOCK_LEN]);
            xor_counter(&mut a, t);
            semiblock.copy_from_slice(&block[SEMIBLOCK_LEN..]);
        }
    }

    let mut out = Vec::with_capacity(key.len() + SEMIBLOCK_LEN);
    out.extend_from_slice(&a);
    out.extend_from_slice(&r);
    Ok(out)
}

/// Unwrap `wrapped` with the key encryption key `kek`, checking its integrity.
pub(crate) fn unwrap(kek: &[u8], wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>, OpaqueError> {
    if wrapped.len() % SEMIBLOCK_LEN != 0 || wrapped.len() < 3 * SEMIBLOCK_LEN {
        return Err(OpaqueError::from_display("invalid wrapped key length"));
    }
    match Kek::new(kek)? {
        Kek::Native(cipher, kek) => {
            let kek = AesKek::new(cipher, kek).context("load key wrap key")?;
            let mut out = Zeroizing::new(vec![0u8; wrapped.len() - SEMIBLOCK_LEN]);
            let len = kek
                .unwrap(wrapped, out.as_mut_slice())
                .context("key unwrap integrity check")?
                .len();
            out.truncate(len);
            Ok(out)
        }
        Kek::Aes192(kek) => unwrap_with_block_cipher(&AesBlock::new(kek)?, wrapped),
    }
}

fn unwrap_with_block_cipher(
    aes: &AesBlock,
    wrapped: &[u8],
) -> Result<Zeroizing<Vec<u8>>, OpaqueError> {
    let n = wrapped.len() / SEMIBLOCK_LEN - 1;

    let (iv, key) = wrapped.split_at(SEMIBLOCK_LEN);
    let mut a = [0u8; SEMIBLOCK_LEN];
    a.copy_from_slice(iv);
    let mut r = Zeroizing::new(key.to_vec());
    let mut block = Zeroizing::new([0u8; BLOCK_LEN]);
    for j in (0..6).rev() {
        for (i, semiblock) in r.chunks_exact_mut(SEMIBLOCK_LEN).enumerate().rev() {
            let t = (n * j + i + 1) as u64;
            xor_counter(&mut a, t);
            block[..SEMIBLOCK_LEN].copy_from_slice(&a);
            block[SEMIBLOCK_LEN..].copy_from_slice(semiblock);
            *block = aes.decrypt(&block)?;

            a.copy_from_slice(&block[..SEMIBLOCK_LEN]);
            semiblock.copy_from_slice(&block[SEMIBLOCK_LEN..]);
        }
    }

    verify_slices_are_equal(&a, &DEFAULT_IV).context("key unwrap integrity check")?;
    Ok(r)
}

fn xor_counter(a: &mut [u8; SEMIBLOCK_LEN], t: u64) {
    a.iter_mut()
        .zip(t.to_be_bytes())
        .for_each(|(byte, counter)| *byte ^= counter);
}
