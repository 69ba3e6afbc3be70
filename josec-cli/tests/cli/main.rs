//! end-to-end tests of the josec binary
//!
//! These build the binary with escargot and are ignored by default,
//! run them with `cargo test -p josec-cli -- --ignored`.

mod utils;

mod help;
mod jwa;
mod jwe;
mod jwk;
mod jws;
