//! Crypto primitives used by josec.
//!
//! All cryptographic operations are delegated to [`aws_lc_rs`],
//! this crate only glues them together in the shapes mandated
//! by the JOSE family of specifications.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(test), warn(clippy::print_stdout, clippy::dbg_macro))]

pub mod jose;
