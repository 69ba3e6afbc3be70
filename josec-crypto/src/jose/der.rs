//! Minimal DER support for the handful of ASN.1 structures
//! needed to move keys between JWK and PEM form:
//! PKCS#1, PKCS#8, SEC 1 and SubjectPublicKeyInfo.
//!
//! This is ***NOT*** a general purpose ASN.1 codec.

use josec_error::OpaqueError;

use crate::jose::constants::{
    BIT_STRING_NO_UNUSED_BITS, DER_HIGH_BIT, DER_LENGTH_SHORT_FORM_MAX, DER_TAG_BIT_STRING,
    DER_TAG_INTEGER, DER_TAG_NULL, DER_TAG_OCTET_STRING, DER_TAG_OID, DER_TAG_SEQUENCE,
    OID_RSA_ENCRYPTION,
};

/// In section 4.1 of [RFC 5280](https://datatracker.ietf.org/doc/rfc5280/) the standard DER
/// encoded public key format is defined as
///```rust,ignore
/// SubjectPublicKeyInfo = SEQUENCE {
///     algorithm AlgorithmIdentifier,
///     subjectPublicKey BIT STRING
/// }
///```
/// For RSA keys the `BIT STRING` contains a DER encoded public key sequence in the format
///```rust,ignore
/// RSAPublicKey = SEQUENCE {
///     modulus INTEGER,
///     exponent INTEGER,
/// }
/// ```
/// defined in section 2.3.1 of [RFC 3279](https://datatracker.ietf.org/doc/rfc3279/)
pub(crate) fn create_subject_public_key_info(n: &[u8], e: &[u8]) -> Vec<u8> {
    let rsa_public_key = encode_sequence(&[&encode_integer(n), &encode_integer(e)]);
    subject_public_key_info(&rsa_algorithm_identifier(), &rsa_public_key)
}

/// `SubjectPublicKeyInfo` for an already encoded algorithm identifier and raw key bytes.
pub(crate) fn subject_public_key_info(algorithm: &[u8], key: &[u8]) -> Vec<u8> {
    encode_sequence(&[algorithm, &encode_bit_string(key)])
}

/// Section 2.2.1 of [RFC 3279](https://www.rfc-editor.org/rfc/rfc3279.html) specifies the
/// parameters of the RSA algorithm identifier need to be NULL.
pub(crate) fn rsa_algorithm_identifier() -> Vec<u8> {
    algorithm_identifier(OID_RSA_ENCRYPTION, Some(&[DER_TAG_NULL, 0x00]))
}

/// `AlgorithmIdentifier ::= SEQUENCE { algorithm OBJECT IDENTIFIER, parameters ANY OPTIONAL }`
///
/// `parameters` is expected to be DER encoded already.
pub(crate) fn algorithm_identifier(oid: &[u8], parameters: Option<&[u8]>) -> Vec<u8> {
    let oid = encode_tlv(DER_TAG_OID, oid);
    match parameters {
        Some(parameters) => encode_sequence(&[&oid, parameters]),
        None => encode_sequence(&[&oid]),
    }
}

/// `PrivateKeyInfo` (PKCS#8 v1) as defined in section 5 of
/// [RFC 5208](https://datatracker.ietf.org/doc/html/rfc5208).
pub(crate) fn private_key_info(algorithm: &[u8], private_key: &[u8]) -> Vec<u8> {
    encode_sequence(&[
        &encode_integer(&[0]),
        algorithm,
        &encode_tlv(DER_TAG_OCTET_STRING, private_key),
    ])
}

pub(crate) fn encode_sequence(items: &[&[u8]]) -> Vec<u8> {
    let content: Vec<u8> = items.concat();
    encode_tlv(DER_TAG_SEQUENCE, &content)
}

pub(crate) fn encode_bit_string(content: &[u8]) -> Vec<u8> {
    let mut value = Vec::with_capacity(1 + content.len());
    value.push(BIT_STRING_NO_UNUSED_BITS);
    value.extend_from_slice(content);
    encode_tlv(DER_TAG_BIT_STRING, &value)
}

pub(crate) fn encode_tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let len = encode_der_length(content.len());
    let mut result = Vec::with_capacity(1 + len.len() + content.len());
    result.push(tag);
    result.extend_from_slice(&len);
    result.extend_from_slice(content);
    result
}

/// This function is an implementation of length encoding as defined in section 8.1.3
/// [ITU X.690](https://www.itu.int/ITU-T/studygroups/com17/languages/X.690-0207.pdf) specification.
fn encode_der_length(len: usize) -> Vec<u8> {
    if len <= DER_LENGTH_SHORT_FORM_MAX {
        vec![len as u8]
    } else {
        let len_bytes = len.to_be_bytes();
        let first_non_zero = len_bytes
            .iter()
            .position(|b| *b != 0)
            .unwrap_or(len_bytes.len() - 1);
        let len_bytes = &len_bytes[first_non_zero..];
        let mut result = Vec::with_capacity(1 + len_bytes.len());
        result.push(DER_HIGH_BIT | len_bytes.len() as u8);
        result.extend_from_slice(len_bytes);
        result
    }
}

/// Encode an unsigned big-endian integer as a DER `INTEGER`.
///
/// Redundant leading zero octets are dropped and a single zero octet
/// is prepended when the high bit is set, so the value stays positive.
pub(crate) fn encode_integer(value: &[u8]) -> Vec<u8> {
    let first_non_zero = value.iter().position(|b| *b != 0);
    let value = match first_non_zero {
        Some(idx) => &value[idx..],
        None => &[0u8][..],
    };
    let needs_leading_zero = value[0] & DER_HIGH_BIT != 0;
    let mut content = Vec::with_capacity(value.len() + needs_leading_zero as usize);
    if needs_leading_zero {
        content.push(0);
    }
    content.extend_from_slice(value);
    encode_tlv(DER_TAG_INTEGER, &content)
}

/// Forward-only reader over DER encoded data.
#[derive(Debug, Clone)]
pub(crate) struct DerReader<'a> {
    input: &'a [u8],
}

impl<'a> DerReader<'a> {
    pub(crate) fn new(input: &'a [u8]) -> Self {
        Self { input }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    pub(crate) fn peek_tag(&self) -> Option<u8> {
        self.input.first().copied()
    }

    /// Read the next element, returning its tag and content octets.
    pub(crate) fn read_any(&mut self) -> Result<(u8, &'a [u8]), OpaqueError> {
        let (&tag, rest) = self
            .input
            .split_first()
            .ok_or_else(|| OpaqueError::from_display("der: unexpected end of input"))?;
        let (&first, mut rest) = rest
            .split_first()
            .ok_or_else(|| OpaqueError::from_display("der: missing length"))?;

        let len = if first & DER_HIGH_BIT == 0 {
            first as usize
        } else {
            let n = (first & !DER_HIGH_BIT) as usize;
            if n == 0 || n > size_of::<usize>() || n > rest.len() {
                return Err(OpaqueError::from_display("der: invalid long form length"));
            }
            let (len_bytes, remaining) = rest.split_at(n);
            rest = remaining;
            len_bytes
                .iter()
                .fold(0usize, |acc, b| (acc << 8) | *b as usize)
        };

        if len > rest.len() {
            return Err(OpaqueError::from_display("der: length exceeds input"));
        }
        let (content, remaining) = rest.split_at(len);
        self.input = remaining;
        Ok((tag, content))
    }

    /// Read the next element, which must carry the given tag.
    pub(crate) fn read(&mut self, expected: u8) -> Result<&'a [u8], OpaqueError> {
        let (tag, content) = self.read_any()?;
        if tag != expected {
            return Err(OpaqueError::from_display(format!(
                "der: expected tag {expected:#04x}, found {tag:#04x}"
            )));
        }
        Ok(content)
    }

    /// Read the next element only if it carries the given tag.
    pub(crate) fn read_optional(&mut self, tag: u8) -> Result<Option<&'a [u8]>, OpaqueError> {
        if self.peek_tag() == Some(tag) {
            self.read(tag).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Read a sequence and return a reader over its content.
    pub(crate) fn read_sequence(&mut self) -> Result<DerReader<'a>, OpaqueError> {
        self.read(DER_TAG_SEQUENCE).map(DerReader::new)
    }

    /// Read a positive integer, stripped from its leading zero octets.
    pub(crate) fn read_unsigned(&mut self) -> Result<&'a [u8], OpaqueError> {
        let content = self.read(DER_TAG_INTEGER)?;
        if content.is_empty() || content[0] & DER_HIGH_BIT != 0 {
            return Err(OpaqueError::from_display(
                "der: expected a positive integer",
            ));
        }
        let first_non_zero = content.iter().position(|b| *b != 0).unwrap_or(content.len() - 1);
        Ok(&content[first_non_zero..])
    }

    pub(crate) fn read_oid(&mut self) -> Result<&'a [u8], OpaqueError> {
        self.read(DER_TAG_OID)
    }

    pub(crate) fn read_octet_string(&mut self) -> Result<&'a [u8], OpaqueError> {
        self.read(DER_TAG_OCTET_STRING)
    }

    /// Read a bit string without unused bits.
    pub(crate) fn read_bit_string(&mut self) -> Result<&'a [u8], OpaqueError> {
        match self.read(DER_TAG_BIT_STRING)?.split_first() {
            Some((&BIT_STRING_NO_UNUSED_BITS, content)) => Ok(content),
            _ => Err(OpaqueError::from_display(
                "der: bit strings with unused bits are not supported",
            )),
        }
    }
}
