//! utilities crate for josec
//!
//! `josec-utils` contains utilities used by `josec`,
//! not really being part of one of the other crates, or used
//! by plenty of other crates.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(test), warn(clippy::print_stdout, clippy::dbg_macro))]

#[doc(hidden)]
#[macro_use]
pub mod macros;
