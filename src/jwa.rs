//! Listing of the algorithm registry.

use crate::{
    crypto::jose::{
        ContentEncryptionAlgorithm, EllipticCurve, KeyEncryptionAlgorithm, KeyType,
        SignatureAlgorithm,
    },
    error::{BoxError, ErrorKind, ValidationError},
    io::{STD_STREAM, with_output},
    output::write_bytes,
    validate::{FieldRule, Validate},
};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Config of the list operation, selecting the registries to print.
pub struct ListConfig {
    pub key_types: bool,
    pub curves: bool,
    pub key_encryption: bool,
    pub content_encryption: bool,
    pub signature: bool,
    pub output: String,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            key_types: false,
            curves: false,
            key_encryption: false,
            content_encryption: false,
            signature: false,
            output: STD_STREAM.to_owned(),
        }
    }
}

impl ListConfig {
    /// Identifiers of all selected registries, in listing order.
    pub fn selected(&self) -> impl Iterator<Item = &'static str> + use<> {
        [
            (self.key_types, KeyType::NAMES),
            (self.curves, EllipticCurve::NAMES),
            (self.key_encryption, KeyEncryptionAlgorithm::NAMES),
            (self.content_encryption, ContentEncryptionAlgorithm::NAMES),
            (self.signature, SignatureAlgorithm::NAMES),
        ]
        .into_iter()
        .filter(|(selected, _)| *selected)
        .flat_map(|(_, names)| names.iter().copied())
    }
}

impl Validate for ListConfig {
    fn rules(&self) -> Vec<FieldRule<'_>> {
        Vec::new()
    }

    fn post_validate(&self) -> Result<(), ValidationError> {
        if self.key_types
            || self.curves
            || self.key_encryption
            || self.content_encryption
            || self.signature
        {
            Ok(())
        } else {
            Err(ValidationError::single("jwa", ErrorKind::NoOptions))
        }
    }
}

/// Render the selected registries, one identifier per line.
pub fn list(cfg: &ListConfig) -> Result<String, ValidationError> {
    cfg.validate()?;
    let mut out = String::new();
    for name in cfg.selected() {
        out.push_str(name);
        out.push('\n');
    }
    Ok(out)
}

/// Write the selected registries to [`ListConfig::output`].
pub fn run(cfg: &ListConfig) -> Result<(), BoxError> {
    let out = list(cfg)?;
    tracing::debug!(lines = out.lines().count(), "list algorithms");
    with_output(&cfg.output, |w| write_bytes(w, out.as_bytes()))
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    #[test]
    fn nothing_selected_is_an_error() {
        let err = assert_err!(list(&ListConfig::default()));
        assert_eq!(err.kinds().collect::<Vec<_>>(), vec![ErrorKind::NoOptions]);
    }

    #[test]
    fn single_registry() {
        let cfg = ListConfig {
            key_types: true,
            ..Default::default()
        };
        assert_eq!(assert_ok!(list(&cfg)), "RSA\nEC\nOKP\noct\n");

        let cfg = ListConfig {
            content_encryption: true,
            ..Default::default()
        };
        assert_eq!(
            assert_ok!(list(&cfg)),
            "A128CBC-HS256\nA128GCM\nA192CBC-HS384\nA192GCM\nA256CBC-HS512\nA256GCM\n"
        );
    }

    #[test]
    fn registries_are_listed_in_order() {
        let cfg = ListConfig {
            signature: true,
            curves: true,
            ..Default::default()
        };
        let out = assert_ok!(list(&cfg));
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 7 + 15);
        assert_eq!(lines[0], "Ed25519");
        assert_eq!(lines[6], "X448");
        assert_eq!(lines[7], "ES256");
        assert_eq!(lines[21], "none");
    }

    #[test]
    fn key_encryption_registry_is_complete() {
        let cfg = ListConfig {
            key_encryption: true,
            ..Default::default()
        };
        let out = assert_ok!(list(&cfg));
        assert_eq!(out.lines().count(), 17);
        assert!(out.lines().any(|line| line == "ECDH-ES+A192KW"));
        assert!(out.ends_with("RSA-OAEP\nRSA-OAEP-256\nRSA1_5\ndir\n"));
    }
}
