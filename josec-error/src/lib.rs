//! Error types for josec.
//!
//! The [`BoxError`] type is a type-erased error type that can be used to represent any error that
//! implements the `std::error::Error` trait and is used for cases where it is usually not
//! that important what specific error type is returned, but rather that an error occurred.
//!
//! That said, one can use downcasting or [`ErrorExt`] to try to get the cause of the error.

#![cfg_attr(docsrs, feature(doc_cfg))]

use std::error::Error as StdError;

/// Alias for a type-erased error type.
pub type BoxError = Box<dyn StdError + Send + Sync>;

mod ext;
pub use ext::{ErrorContext, ErrorExt, OpaqueError};
