//! [`JWA`] or JSON Web Algorithms as defined in [`rfc7518`],
//! completed with the curves of [`rfc8037`].
//!
//! Each registry is a closed set: identifiers are matched exactly
//! and the declaration order is the canonical listing order.
//!
//! [`JWA`]: https://datatracker.ietf.org/doc/html/rfc7518
//! [`rfc7518`]: https://datatracker.ietf.org/doc/html/rfc7518
//! [`rfc8037`]: https://datatracker.ietf.org/doc/html/rfc8037

use josec_utils::macros::enums::enum_builder;

enum_builder! {
    /// The "kty" (key type) parameter identifies the cryptographic
    /// algorithm family used with the key.
    @String
    pub enum KeyType {
        /// RSA key pair
        Rsa => "RSA",
        /// Elliptic curve key pair on one of the NIST prime curves
        Ec => "EC",
        /// Octet key pair (Edwards or Montgomery curve)
        Okp => "OKP",
        /// Octet sequence, which represents a symmetric key
        Oct => "oct",
    }
}

enum_builder! {
    /// Curves usable with [`KeyType::Ec`] or [`KeyType::Okp`] keys.
    @String
    pub enum EllipticCurve {
        Ed25519 => "Ed25519",
        Ed448 => "Ed448",
        P256 => "P-256",
        P384 => "P-384",
        P521 => "P-521",
        X25519 => "X25519",
        X448 => "X448",
    }
}

impl EllipticCurve {
    /// The [`KeyType`] this curve belongs to.
    pub fn key_type(self) -> KeyType {
        match self {
            Self::P256 | Self::P384 | Self::P521 => KeyType::Ec,
            Self::Ed25519 | Self::Ed448 | Self::X25519 | Self::X448 => KeyType::Okp,
        }
    }

    /// Curves which are part of the registry but for which
    /// no primitive is available.
    pub fn is_supported(self) -> bool {
        !matches!(self, Self::Ed448 | Self::X448)
    }

    /// Length in bytes of a single coordinate or of the raw public key.
    pub fn coordinate_len(self) -> usize {
        match self {
            Self::P256 | Self::Ed25519 | Self::X25519 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
            Self::X448 => 56,
            Self::Ed448 => 57,
        }
    }
}

enum_builder! {
    /// Algorithms used to protect the content encryption key of a JWE.
    @String
    pub enum KeyEncryptionAlgorithm {
        A128GCMKW => "A128GCMKW",
        A128KW => "A128KW",
        A192GCMKW => "A192GCMKW",
        A192KW => "A192KW",
        A256GCMKW => "A256GCMKW",
        A256KW => "A256KW",
        /// Elliptic Curve Diffie-Hellman Ephemeral Static key agreement using Concat KDF
        EcdhEs => "ECDH-ES",
        EcdhEsA128KW => "ECDH-ES+A128KW",
        EcdhEsA192KW => "ECDH-ES+A192KW",
        EcdhEsA256KW => "ECDH-ES+A256KW",
        Pbes2Hs256A128KW => "PBES2-HS256+A128KW",
        Pbes2Hs384A192KW => "PBES2-HS384+A192KW",
        Pbes2Hs512A256KW => "PBES2-HS512+A256KW",
        /// RSAES OAEP using default parameters (SHA-1)
        RsaOaep => "RSA-OAEP",
        /// RSAES OAEP using SHA-256 and MGF1 with SHA-256
        RsaOaep256 => "RSA-OAEP-256",
        /// RSAES-PKCS1-v1_5
        Rsa15 => "RSA1_5",
        /// Direct use of a shared symmetric key as the content encryption key
        Dir => "dir",
    }
}

impl KeyEncryptionAlgorithm {
    /// Length of the AES key-wrap key used by this algorithm, if it wraps.
    pub fn wrap_key_len(self) -> Option<usize> {
        match self {
            Self::A128KW
            | Self::A128GCMKW
            | Self::EcdhEsA128KW
            | Self::Pbes2Hs256A128KW => Some(16),
            Self::A192KW
            | Self::A192GCMKW
            | Self::EcdhEsA192KW
            | Self::Pbes2Hs384A192KW => Some(24),
            Self::A256KW
            | Self::A256GCMKW
            | Self::EcdhEsA256KW
            | Self::Pbes2Hs512A256KW => Some(32),
            Self::EcdhEs | Self::RsaOaep | Self::RsaOaep256 | Self::Rsa15 | Self::Dir => None,
        }
    }
}

enum_builder! {
    /// Authenticated encryption algorithms applied to the JWE payload.
    @String
    pub enum ContentEncryptionAlgorithm {
        A128CbcHs256 => "A128CBC-HS256",
        A128Gcm => "A128GCM",
        A192CbcHs384 => "A192CBC-HS384",
        A192Gcm => "A192GCM",
        A256CbcHs512 => "A256CBC-HS512",
        A256Gcm => "A256GCM",
    }
}

impl ContentEncryptionAlgorithm {
    /// Length in bytes of the content encryption key.
    ///
    /// For the CBC-HMAC family this is the MAC key and the
    /// encryption key concatenated.
    pub fn key_len(self) -> usize {
        match self {
            Self::A128Gcm => 16,
            Self::A192Gcm => 24,
            Self::A256Gcm | Self::A128CbcHs256 => 32,
            Self::A192CbcHs384 => 48,
            Self::A256CbcHs512 => 64,
        }
    }
}

enum_builder! {
    /// Digital signature and MAC algorithms for JWS.
    @String
    pub enum SignatureAlgorithm {
        /// ECDSA using P-256 and SHA-256
        ES256 => "ES256",
        /// ECDSA using secp256k1 and SHA-256
        ES256K => "ES256K",
        /// ECDSA using P-384 and SHA-384
        ES384 => "ES384",
        /// ECDSA using P-521 and SHA-512
        ES512 => "ES512",
        /// Edwards-curve digital signature
        EdDSA => "EdDSA",
        /// HMAC using SHA-256
        HS256 => "HS256",
        /// HMAC using SHA-384
        HS384 => "HS384",
        /// HMAC using SHA-512
        HS512 => "HS512",
        /// RSASSA-PSS using SHA-256 and MGF1 with SHA-256
        PS256 => "PS256",
        /// RSASSA-PSS using SHA-384 and MGF1 with SHA-384
        PS384 => "PS384",
        /// RSASSA-PSS using SHA-512 and MGF1 with SHA-512
        PS512 => "PS512",
        /// RSASSA-PKCS1-v1_5 using SHA-256
        RS256 => "RS256",
        /// RSASSA-PKCS1-v1_5 using SHA-384
        RS384 => "RS384",
        /// RSASSA-PKCS1-v1_5 using SHA-512
        RS512 => "RS512",
        /// No digital signature or MAC performed
        Unsecured => "none",
    }
}

impl SignatureAlgorithm {
    /// The [`KeyType`] a key must have to be used with this algorithm.
    pub fn key_type(self) -> Option<KeyType> {
        match self {
            Self::ES256 | Self::ES256K | Self::ES384 | Self::ES512 => Some(KeyType::Ec),
            Self::EdDSA => Some(KeyType::Okp),
            Self::HS256 | Self::HS384 | Self::HS512 => Some(KeyType::Oct),
            Self::PS256 | Self::PS384 | Self::PS512 | Self::RS256 | Self::RS384 | Self::RS512 => {
                Some(KeyType::Rsa)
            }
            Self::Unsecured => None,
        }
    }
}

enum_builder! {
    /// Compression applied to the JWE plaintext before encryption.
    @String
    pub enum CompressionAlgorithm {
        /// Raw DEFLATE as defined in RFC 1951
        Deflate => "DEF",
    }
}
