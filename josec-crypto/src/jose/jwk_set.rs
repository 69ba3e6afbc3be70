use josec_error::{ErrorContext, OpaqueError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::jose::JWK;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
/// [`JWKSet`] or JSON Web Key Set as defined in section 5 of [`rfc7517`]
///
/// Keys keep their insertion order.
///
/// [`rfc7517`]: https://datatracker.ietf.org/doc/html/rfc7517#section-5
pub struct JWKSet {
    keys: Vec<JWK>,
}

impl JWKSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: JWK) {
        self.keys.push(key);
    }

    pub fn keys(&self) -> &[JWK] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The only key of this set, `None` unless the set holds exactly one key.
    pub fn single(&self) -> Option<&JWK> {
        match self.keys.as_slice() {
            [key] => Some(key),
            _ => None,
        }
    }

    /// Project every key of this set onto its public members.
    pub fn to_public(&self) -> Result<Self, OpaqueError> {
        let keys = self
            .keys
            .iter()
            .map(JWK::to_public)
            .collect::<Result<_, _>>()?;
        Ok(Self { keys })
    }

    /// Parse either a bare [`JWK`] object or a `{"keys": [...]}` set.
    pub fn from_json_slice(data: &[u8]) -> Result<Self, OpaqueError> {
        let value: Value = serde_json::from_slice(data).context("parse JSON")?;
        let is_set = value.as_object().is_some_and(|obj| obj.contains_key("keys"));
        if is_set {
            Self::deserialize(value).context("parse JWK set")
        } else {
            let key = JWK::deserialize(value).context("parse JWK")?;
            Ok(key.into())
        }
    }
}

impl From<JWK> for JWKSet {
    fn from(key: JWK) -> Self {
        Self { keys: vec![key] }
    }
}

impl FromIterator<JWK> for JWKSet {
    fn from_iter<I: IntoIterator<Item = JWK>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for JWKSet {
    type Item = JWK;
    type IntoIter = std::vec::IntoIter<JWK>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter()
    }
}

impl<'a> IntoIterator for &'a JWKSet {
    type Item = &'a JWK;
    type IntoIter = std::slice::Iter<'a, JWK>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_key_or_set() {
        let set = JWKSet::from_json_slice(br#"{"kty":"oct","k":"c2VjcmV0"}"#).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.single().is_some());

        let set = JWKSet::from_json_slice(
            br#"{"keys":[{"kty":"oct","k":"YQ","kid":"a"},{"kty":"oct","k":"Yg","kid":"b"}]}"#,
        )
        .unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.single().is_none());
        let kids: Vec<_> = set.keys().iter().filter_map(JWK::kid).collect();
        assert_eq!(kids, ["a", "b"]);

        let set = JWKSet::from_json_slice(br#"{"keys":[]}"#).unwrap();
        assert!(set.is_empty());
        assert!(set.single().is_none());
    }

    #[test]
    fn parse_garbage_fails() {
        assert!(JWKSet::from_json_slice(b"not json").is_err());
        assert!(JWKSet::from_json_slice(br#"{"kty":"nope"}"#).is_err());
        assert!(JWKSet::from_json_slice(br#"{"keys":{"kty":"oct"}}"#).is_err());
    }

    #[test]
    fn serialize_as_set_object() {
        let set: JWKSet = JWK::new_oct(b"a").into();
        assert_eq!(
            serde_json::to_string(&set).unwrap(),
            r#"{"keys":[{"k":"YQ","kty":"oct"}]}"#
        );
    }
}
