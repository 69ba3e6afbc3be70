//! Rendering of keys and messages.
//!
//! JSON is pretty printed with an indent of four spaces, object members in
//! lexicographic order and a trailing newline, so that output is stable
//! between runs and easy to diff.

use std::io::Write;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::{
    crypto::jose::{JWKSet, jwk_to_pem},
    error::{ErrorKind, ErrorKindExt, JoseError},
    key::KeyFormat,
};

const JSON_INDENT: &[u8] = b"    ";

/// Render `value` as pretty JSON.
pub fn to_pretty_json(value: &impl Serialize) -> Result<Vec<u8>, JoseError> {
    // a Value round trip orders the object members
    let value = serde_json::to_value(value).or_kind(ErrorKind::SerializeJsonFailed)?;
    let mut buf = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(JSON_INDENT));
    value
        .serialize(&mut serializer)
        .or_kind(ErrorKind::SerializeJsonFailed)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Write `value` as pretty JSON.
pub fn write_json(w: &mut impl Write, value: &impl Serialize) -> Result<(), JoseError> {
    let buf = to_pretty_json(value)?;
    w.write_all(&buf).or_kind(ErrorKind::WriteJsonFailed)
}

/// Render a key set in the given format.
///
/// As JSON a set holding exactly one key is rendered as that bare key.
/// As PEM every key is rendered as its own block.
pub fn render_keys(keys: &JWKSet, format: KeyFormat) -> Result<Vec<u8>, JoseError> {
    match format {
        KeyFormat::Json => match keys.single() {
            Some(key) => to_pretty_json(key),
            None => to_pretty_json(keys),
        },
        KeyFormat::Pem => {
            let mut buf = String::new();
            for key in keys {
                let pem = jwk_to_pem(key).or_kind(ErrorKind::FormatKeyInPemFailed)?;
                buf.push_str(&pem);
            }
            Ok(buf.into_bytes())
        }
    }
}

/// Write a key set in the given format, see [`render_keys`].
pub fn write_keys(w: &mut impl Write, keys: &JWKSet, format: KeyFormat) -> Result<(), JoseError> {
    let buf = render_keys(keys, format)?;
    w.write_all(&buf).or_kind(ErrorKind::WriteKeyFailed)
}

/// Write raw bytes, such as a payload or a serialized message.
pub fn write_bytes(w: &mut impl Write, data: &[u8]) -> Result<(), JoseError> {
    w.write_all(data).or_kind(ErrorKind::WriteOutputFailed)
}
