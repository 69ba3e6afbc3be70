pub mod jwa;
pub mod jwe;
pub mod jwk;
pub mod jws;
pub mod version;
