//! Error types for josec.
//!
//! Every failure the operations in this crate can report is classified by an
//! [`ErrorKind`]. The kind is carried by a [`JoseError`] together with the
//! error that caused it, if any. Configuration problems are aggregated into a
//! single [`ValidationError`], and errors raised while closing streams are
//! attached to the pending error using a [`JoinedError`].
//!
//! Use [`error_kinds`] to find all kinds reported anywhere in an error chain.

use std::{error::Error as StdError, fmt};

#[doc(inline)]
pub use ::josec_error::{BoxError, ErrorContext, ErrorExt, OpaqueError};

macro_rules! error_kinds {
    (
        $(
            $(#[$meta:meta])*
            $variant:ident => $message:literal,
        )+
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        /// Classification of the errors reported by josec.
        pub enum ErrorKind {
            $(
                $(#[$meta])*
                $variant,
            )+
        }

        impl ErrorKind {
            /// All error kinds.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Human readable message of this kind.
            pub fn message(self) -> &'static str {
                match self {
                    $(Self::$variant => $message,)+
                }
            }
        }
    };
}

error_kinds! {
    // configuration
    InvalidKeyType => "key type is one of 'RSA', 'EC', 'OKP', 'oct'",
    InvalidKeySize => "key size must be a multiple of 256 (default = 2048)",
    /// Unknown curve or a curve which does not belong to the key type.
    InvalidCurve => "invalid elliptic curve (EC uses 'P-256', 'P-384', 'P-521', OKP uses 'Ed25519', 'Ed448', 'X25519', 'X448')",
    /// Curve known to the registry without a key generation path.
    UnsupportedCurve => "elliptic curves 'Ed448' and 'X448' are not supported",
    InvalidOutputFormat => "invalid output format (only support json or pem)",
    InvalidKeyFormat => "invalid key format (only support json or pem)",
    InvalidKeyEncryption => "invalid key encryption algorithm",
    InvalidContentEncryption => "invalid content encryption algorithm",
    InvalidAlgorithm => "invalid algorithm",
    EmptyAlgorithm => "algorithm is required unless key ID matching is enabled",
    RequireKeyFile => "key file is required",
    RequireFileName => "file name is required",
    NoOptions => "no options were specified",

    // resources
    OpenFileFailed => "failed to open file",
    CreateFileFailed => "failed to create file",
    ReadFileFailed => "failed to read file",
    CloseFailed => "failed to close file",
    ParseKeyFailed => "failed to parse key",
    NotExactlyOneKey => "key file must contain exactly one key",

    // cryptography
    KeyGenerationFailed => "failed to generate key",
    EmptyKey => "key did not exist after key generation",
    PublicProjectionFailed => "failed to generate public keys",
    RetrieveKeyFailed => "failed to retrieve public key",
    EncryptFailed => "failed to encrypt payload",
    DecryptFailed => "failed to decrypt message",
    SignFailed => "failed to sign payload",
    ParseHeaderFailed => "failed to parse header",
    VerifyFailed => "failed to verify message",
    ParseMessageFailed => "failed to parse message",

    // serialization
    FormatKeyInPemFailed => "failed to format key in PEM format",
    SerializeJsonFailed => "failed to serialize to JSON",
    WriteKeyFailed => "failed to write key",
    WriteJsonFailed => "failed to write JSON",
    WriteOutputFailed => "failed to write output",
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// An error of a known [`ErrorKind`], optionally caused by another error.
///
/// # Formatting
///
/// The `Display` implementation prints the message of the kind,
/// followed by the cause if there is one: `"<message>: <cause>"`.
pub struct JoseError {
    inner: Box<ErrorImpl>,
}

struct ErrorImpl {
    kind: ErrorKind,
    cause: Option<BoxError>,
}

impl JoseError {
    /// Create a new [`JoseError`] without a cause.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            inner: Box::new(ErrorImpl { kind, cause: None }),
        }
    }

    #[must_use]
    /// Attach the error which caused this one.
    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.inner.cause = Some(cause.into());
        self
    }

    /// The [`ErrorKind`] of this error.
    pub fn kind(&self) -> ErrorKind {
        self.inner.kind
    }
}

impl From<ErrorKind> for JoseError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl fmt::Debug for JoseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_tuple("josec::JoseError");
        f.field(&self.inner.kind);
        if let Some(ref cause) = self.inner.cause {
            f.field(cause);
        }
        f.finish()
    }
}

impl fmt::Display for JoseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.cause {
            Some(cause) => write!(f, "{}: {cause}", self.inner.kind),
            None => f.write_str(self.inner.kind.message()),
        }
    }
}

impl StdError for JoseError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .cause
            .as_ref()
            .map(|cause| &**cause as &(dyn StdError + 'static))
    }
}

/// Classify the error of a [`Result`] with an [`ErrorKind`].
pub trait ErrorKindExt<T>: private::Sealed {
    /// Wrap the error, if any, as the cause of a [`JoseError`] of the given `kind`.
    fn or_kind(self, kind: ErrorKind) -> Result<T, JoseError>;
}

impl<T, E> ErrorKindExt<T> for Result<T, E>
where
    E: Into<BoxError>,
{
    fn or_kind(self, kind: ErrorKind) -> Result<T, JoseError> {
        self.map_err(|err| JoseError::new(kind).with_cause(err))
    }
}

mod private {
    pub trait Sealed {}

    impl<T, E> Sealed for Result<T, E> where E: Into<super::BoxError> {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A single field which failed validation.
pub struct Violation {
    /// Name of the offending field.
    pub field: &'static str,
    /// Kind of error reported for the field.
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// All violations found while validating an operation config.
///
/// Displayed as one violation per line.
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    /// Create a [`ValidationError`], `None` if there are no violations.
    pub fn from_violations(violations: Vec<Violation>) -> Option<Self> {
        if violations.is_empty() {
            None
        } else {
            Some(Self { violations })
        }
    }

    /// Create a [`ValidationError`] holding a single violation.
    pub fn single(field: &'static str, kind: ErrorKind) -> Self {
        Self {
            violations: vec![Violation { field, kind }],
        }
    }

    /// The violations, in rule order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// The kinds of all violations, in rule order.
    pub fn kinds(&self) -> impl Iterator<Item = ErrorKind> + '_ {
        self.violations.iter().map(|violation| violation.kind)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, violation) in self.violations.iter().enumerate() {
            if idx > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}: {}", violation.field, violation.kind)?;
        }
        Ok(())
    }
}

impl StdError for ValidationError {}

/// A pending error combined with the errors raised while cleaning up.
pub struct JoinedError {
    primary: BoxError,
    others: Vec<BoxError>,
}

impl JoinedError {
    /// Join `others` onto the `primary` error.
    ///
    /// Returns the primary error unchanged if there is nothing to join.
    pub fn join(primary: impl Into<BoxError>, others: Vec<BoxError>) -> BoxError {
        let primary = primary.into();
        if others.is_empty() {
            primary
        } else {
            Box::new(Self { primary, others })
        }
    }

    /// The error which was pending first.
    pub fn primary(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.primary
    }

    /// The errors joined onto the primary error.
    pub fn others(&self) -> impl Iterator<Item = &(dyn StdError + Send + Sync + 'static)> {
        self.others.iter().map(|other| &**other)
    }
}

impl fmt::Debug for JoinedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinedError")
            .field("primary", &self.primary)
            .field("others", &self.others)
            .finish()
    }
}

impl fmt::Display for JoinedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.primary)?;
        for other in &self.others {
            write!(f, "\n{other}")?;
        }
        Ok(())
    }
}

impl StdError for JoinedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.primary as &(dyn StdError + 'static))
    }
}

/// Collect every [`ErrorKind`] found in the chain of `error`, outermost first.
///
/// Aggregated violations and joined errors are expanded in place.
pub fn error_kinds(error: &(dyn StdError + 'static)) -> Vec<ErrorKind> {
    let mut kinds = Vec::new();
    let mut next = Some(error);
    while let Some(error) = next {
        if let Some(error) = error.downcast_ref::<JoseError>() {
            kinds.push(error.kind());
        } else if let Some(error) = error.downcast_ref::<ValidationError>() {
            kinds.extend(error.kinds());
        } else if let Some(error) = error.downcast_ref::<JoinedError>() {
            // the primary error is visited as the source
            for other in &error.others {
                kinds.extend(error_kinds(&**other));
            }
        }
        next = error.source();
    }
    kinds
}

/// Returns true if `kind` is found anywhere in the chain of `error`.
pub fn has_kind(error: &(dyn StdError + 'static), kind: ErrorKind) -> bool {
    error_kinds(error).contains(&kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jose_error_display_includes_cause() {
        let err = JoseError::new(ErrorKind::ParseKeyFailed);
        assert_eq!(err.to_string(), "failed to parse key");

        let err = err.with_cause(OpaqueError::from_display("unexpected end of input"));
        assert_eq!(
            err.to_string(),
            "failed to parse key: unexpected end of input"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn messages_are_unique() {
        let mut messages: Vec<_> = ErrorKind::ALL.iter().map(|kind| kind.message()).collect();
        messages.sort_unstable();
        messages.dedup();
        assert_eq!(messages.len(), ErrorKind::ALL.len());
    }

    #[test]
    fn or_kind_wraps_error() {
        let result: Result<(), _> = "x".parse::<u8>().map(drop).or_kind(ErrorKind::ReadFileFailed);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReadFileFailed);
        assert!(err.to_string().starts_with("failed to read file: "));
    }

    #[test]
    fn validation_error_lists_every_violation() {
        let err = ValidationError::from_violations(vec![
            Violation {
                field: "key",
                kind: ErrorKind::RequireKeyFile,
            },
            Violation {
                field: "output_format",
                kind: ErrorKind::InvalidOutputFormat,
            },
        ])
        .unwrap();
        assert_eq!(
            err.to_string(),
            "key: key file is required\noutput_format: invalid output format (only support json or pem)"
        );
        assert_eq!(
            error_kinds(&err),
            vec![ErrorKind::RequireKeyFile, ErrorKind::InvalidOutputFormat]
        );
        assert!(ValidationError::from_violations(Vec::new()).is_none());
    }

    #[test]
    fn error_kinds_walks_chain() {
        let inner = JoseError::new(ErrorKind::NotExactlyOneKey);
        let outer = JoseError::new(ErrorKind::SignFailed).with_cause(inner);
        assert_eq!(
            error_kinds(&outer),
            vec![ErrorKind::SignFailed, ErrorKind::NotExactlyOneKey]
        );
        assert!(has_kind(&outer, ErrorKind::NotExactlyOneKey));
        assert!(!has_kind(&outer, ErrorKind::VerifyFailed));
    }

    #[test]
    fn joined_error_keeps_primary_and_close_errors() {
        let joined = JoinedError::join(
            JoseError::new(ErrorKind::WriteJsonFailed),
            vec![Box::new(JoseError::new(ErrorKind::CloseFailed))],
        );
        assert_eq!(
            joined.to_string(),
            "failed to write JSON\nfailed to close file"
        );
        assert_eq!(
            error_kinds(&*joined),
            vec![ErrorKind::CloseFailed, ErrorKind::WriteJsonFailed]
        );

        let single = JoinedError::join(JoseError::new(ErrorKind::WriteJsonFailed), Vec::new());
        assert!(single.downcast_ref::<JoseError>().is_some());
    }
}
