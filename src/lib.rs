//! 🔐 josec is a toolkit for JSON Object Signing and Encryption (JOSE).
//!
//! It generates JSON Web Keys (JWK), encrypts and decrypts JSON Web Encryption (JWE)
//! messages and signs, verifies and parses JSON Web Signature (JWS) messages.
//! The `josec` binary found in the `josec-cli` crate is a thin layer on top of this crate.
//!
//! Every operation follows the same pipeline:
//!
//! 1. an operation config is built from user input;
//! 2. the config is validated as a whole, see [`validate`];
//! 3. key material is loaded ([`key`]) or generated ([`jwk`]);
//! 4. the cryptographic operation is performed ([`jwe`], [`jws`]);
//! 5. the result is written to the requested output ([`output`], [`io`]).
//!
//! Errors are reported using the typed taxonomy found in [`error`].
//!
//! The JOSE primitives themselves live in [`crypto`].

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;

#[doc(inline)]
pub use ::josec_utils as utils;

#[doc(inline)]
pub use ::josec_crypto as crypto;

pub mod io;
pub mod output;
pub mod validate;

pub mod key;

pub mod jwa;
pub mod jwe;
pub mod jwk;
pub mod jws;
