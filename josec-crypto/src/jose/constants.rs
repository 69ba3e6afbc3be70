pub(crate) use der_encoding_tags::*;
pub(crate) use object_identifiers::*;

mod der_encoding_tags {
    /// Identifier tag for a DER encoded integer.
    /// Defined in [ITU X.680](https://www.itu.int/ITU-T/studygroups/com17/languages/X.680-0207.pdf).
    pub(crate) const DER_TAG_INTEGER: u8 = 0x02;
    /// Identifier tag for a DER encoded bit string.
    /// Defined in [ITU X.680](https://www.itu.int/ITU-T/studygroups/com17/languages/X.680-0207.pdf).
    pub(crate) const DER_TAG_BIT_STRING: u8 = 0x03;
    /// Identifier tag for a DER encoded octet string.
    pub(crate) const DER_TAG_OCTET_STRING: u8 = 0x04;
    /// Identifier tag for a DER encoded NULL value.
    pub(crate) const DER_TAG_NULL: u8 = 0x05;
    /// Identifier tag for a DER encoded object identifier.
    pub(crate) const DER_TAG_OID: u8 = 0x06;
    /// Identifier tag for a DER encoded sequence.
    /// Defined in [ITU X.680](https://www.itu.int/ITU-T/studygroups/com17/languages/X.680-0207.pdf).
    pub(crate) const DER_TAG_SEQUENCE: u8 = 0x30;
    /// Constructed, context-specific tag `[0]`.
    pub(crate) const DER_TAG_CONTEXT_0: u8 = 0xa0;
    /// Constructed, context-specific tag `[1]`.
    pub(crate) const DER_TAG_CONTEXT_1: u8 = 0xa1;
    /// Maximum length of a DER encoded length in short form.
    /// Defined in [ITU X.690](https://www.itu.int/ITU-T/studygroups/com17/languages/X.690-0207.pdf).
    pub(crate) const DER_LENGTH_SHORT_FORM_MAX: usize = 127;
    /// Bit which marks a long form length and the sign of an integer.
    pub(crate) const DER_HIGH_BIT: u8 = 0x80;
    /// Octet that indicates that no unused bits are present in a bit string.
    /// Defined in section 8.6 of [ITU X.690](https://www.itu.int/ITU-T/studygroups/com17/languages/X.690-0207.pdf).
    pub(crate) const BIT_STRING_NO_UNUSED_BITS: u8 = 0x00;
    /// Prefix of an uncompressed elliptic curve point (SEC 1, section 2.3.3).
    pub(crate) const EC_POINT_UNCOMPRESSED: u8 = 0x04;
}

/// Content octets of the object identifiers used in
/// PKCS#8 and SubjectPublicKeyInfo structures.
mod object_identifiers {
    /// rsaEncryption, `1.2.840.113549.1.1.1` (RFC 8017, appendix C)
    pub(crate) const OID_RSA_ENCRYPTION: &[u8] =
        &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01];
    /// id-ecPublicKey, `1.2.840.10045.2.1` (RFC 5480)
    pub(crate) const OID_EC_PUBLIC_KEY: &[u8] = &[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01];
    /// secp256r1, `1.2.840.10045.3.1.7`
    pub(crate) const OID_P256: &[u8] = &[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07];
    /// secp384r1, `1.3.132.0.34`
    pub(crate) const OID_P384: &[u8] = &[0x2b, 0x81, 0x04, 0x00, 0x22];
    /// secp521r1, `1.3.132.0.35`
    pub(crate) const OID_P521: &[u8] = &[0x2b, 0x81, 0x04, 0x00, 0x23];
    /// id-X25519, `1.3.101.110` (RFC 8410)
    pub(crate) const OID_X25519: &[u8] = &[0x2b, 0x65, 0x6e];
    /// id-X448, `1.3.101.111` (RFC 8410)
    pub(crate) const OID_X448: &[u8] = &[0x2b, 0x65, 0x6f];
    /// id-Ed25519, `1.3.101.112` (RFC 8410)
    pub(crate) const OID_ED25519: &[u8] = &[0x2b, 0x65, 0x70];
    /// id-Ed448, `1.3.101.113` (RFC 8410)
    pub(crate) const OID_ED448: &[u8] = &[0x2b, 0x65, 0x71];
}
