//! Loading keys from files or stdin.

use crate::{
    crypto::jose::{JWK, JWKSet, keys_from_pem},
    error::{ErrorKind, ErrorKindExt, JoseError},
    io::read_input,
    utils::macros::enums::enum_builder,
};

enum_builder! {
    /// Encoding of a key file.
    @String
    pub enum KeyFormat {
        /// JWK or JWK Set object
        Json => "json",
        /// One or more PEM blocks
        Pem => "pem",
    }
}

/// Load the key set stored at `path` (`-` for stdin) in the given `format`.
///
/// No assumption is made about the number of keys, see [`single_key`].
pub fn load(path: &str, format: &str) -> Result<JWKSet, JoseError> {
    let format = format
        .parse::<KeyFormat>()
        .or_kind(ErrorKind::InvalidKeyFormat)?;
    let data = read_input(path)?;
    let keys = match format {
        KeyFormat::Json => JWKSet::from_json_slice(&data),
        KeyFormat::Pem => keys_from_pem(&data),
    }
    .or_kind(ErrorKind::ParseKeyFailed)?;
    tracing::debug!(path, %format, keys = keys.len(), "loaded key set");
    Ok(keys)
}

/// The only key of `keys`.
pub fn single_key(keys: &JWKSet) -> Result<&JWK, JoseError> {
    keys.single().ok_or_else(|| {
        tracing::debug!(keys = keys.len(), "expected exactly one key");
        ErrorKind::NotExactlyOneKey.into()
    })
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::crypto::jose::{KeyType, generate_key, jwk_to_pem};

    fn write_temp(data: &[u8]) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), data).unwrap();
        file
    }

    #[test]
    fn load_bare_key_and_key_set() {
        let key = JWK::new_oct(b"0123456789abcdef").with_kid("a");
        let file = write_temp(&serde_json::to_vec(&key).unwrap());
        let keys = assert_ok!(load(file.path().to_str().unwrap(), "json"));
        assert_eq!(assert_ok!(single_key(&keys)), &key);

        let set: JWKSet = [key.clone(), key.with_kid("b")].into_iter().collect();
        let file = write_temp(&serde_json::to_vec(&set).unwrap());
        let keys = assert_ok!(load(file.path().to_str().unwrap(), "json"));
        assert_eq!(keys.len(), 2);
        assert_eq!(keys.keys()[1].kid(), Some("b"));

        let err = assert_err!(single_key(&keys));
        assert_eq!(err.kind(), ErrorKind::NotExactlyOneKey);
    }

    #[test]
    fn load_pem() {
        let key = generate_key(KeyType::Ec, Some("P-256".parse().unwrap()), 0).unwrap();
        let file = write_temp(jwk_to_pem(&key).unwrap().as_bytes());
        let keys = assert_ok!(load(file.path().to_str().unwrap(), "pem"));
        let loaded = assert_ok!(single_key(&keys));
        assert_eq!(loaded.kty(), KeyType::Ec);
        assert!(loaded.is_private());
    }

    #[test]
    fn invalid_format_is_rejected_before_reading() {
        let err = assert_err!(load("/definitely/not/here", "yaml"));
        assert_eq!(err.kind(), ErrorKind::InvalidKeyFormat);

        let err = assert_err!(load("/definitely/not/here", "json"));
        assert_eq!(err.kind(), ErrorKind::OpenFileFailed);
    }

    #[test]
    fn malformed_key_fails_to_parse() {
        let file = write_temp(b"{\"kty\":\"nope\"}");
        let err = assert_err!(load(file.path().to_str().unwrap(), "json"));
        assert_eq!(err.kind(), ErrorKind::ParseKeyFailed);

        let file = write_temp(b"not a pem document");
        let err = assert_err!(load(file.path().to_str().unwrap(), "pem"));
        assert_eq!(err.kind(), ErrorKind::ParseKeyFailed);
    }

    #[test]
    fn empty_set_has_no_single_key() {
        let err = assert_err!(single_key(&JWKSet::new()));
        assert_eq!(err.kind(), ErrorKind::NotExactlyOneKey);
    }
}
