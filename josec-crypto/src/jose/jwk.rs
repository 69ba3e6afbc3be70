use std::collections::BTreeMap;

use base64::{Engine as _, prelude::BASE64_URL_SAFE_NO_PAD};
use josec_error::{ErrorContext, OpaqueError};
use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};
use zeroize::Zeroizing;

use crate::jose::{EllipticCurve, KeyType};

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
/// [`JWK`] or JSON Web Key as defined in [`rfc7517`]
///
/// A [`JWK`] holding private members can be projected to its public
/// counterpart with [`JWK::to_public`], the original is never modified.
///
/// [`rfc7517`]: https://datatracker.ietf.org/doc/html/rfc7517
pub struct JWK {
    #[serde(flatten)]
    key_type: JWKType,
    /// Intended algorithm to be used with this key
    #[serde(default)]
    alg: Option<String>,
    #[serde(default)]
    kid: Option<String>,
    #[serde(default, rename = "use")]
    r#use: Option<JWKUse>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "kty")]
/// The "kty" (key type) parameter identifies the cryptographic algorithm family used with the key,
/// together with the members specific to that family.
///
/// All members are kept in their base64url encoded form.
pub enum JWKType {
    #[serde(rename = "RSA")]
    Rsa {
        n: String,
        e: String,
        #[serde(default)]
        d: Option<String>,
        #[serde(default)]
        p: Option<String>,
        #[serde(default)]
        q: Option<String>,
        #[serde(default)]
        dp: Option<String>,
        #[serde(default)]
        dq: Option<String>,
        #[serde(default)]
        qi: Option<String>,
    },
    /// Elliptic curve
    #[serde(rename = "EC")]
    Ec {
        crv: EllipticCurve,
        x: String,
        y: String,
        #[serde(default)]
        d: Option<String>,
    },
    /// Octet key pair
    #[serde(rename = "OKP")]
    Okp {
        crv: EllipticCurve,
        x: String,
        #[serde(default)]
        d: Option<String>,
    },
    /// an octet sequence key, which represents a symmetric key
    #[serde(rename = "oct")]
    Oct { k: String },
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
/// [`JWKUse`] identifies the intended use of the public key
pub enum JWKUse {
    #[serde(rename = "sig")]
    Signature,
    #[serde(rename = "enc")]
    Encryption,
}

impl JWKUse {
    fn as_str(self) -> &'static str {
        match self {
            Self::Signature => "sig",
            Self::Encryption => "enc",
        }
    }
}

impl Serialize for JWK {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Members are written in lexicographic order, which keeps
        // the output stable and matches the thumbprint ordering.
        let mut members: BTreeMap<&'static str, &str> = BTreeMap::new();
        match &self.key_type {
            JWKType::Rsa {
                n,
                e,
                d,
                p,
                q,
                dp,
                dq,
                qi,
            } => {
                members.insert("kty", "RSA");
                members.insert("n", n);
                members.insert("e", e);
                for (name, value) in [("d", d), ("p", p), ("q", q), ("dp", dp), ("dq", dq), ("qi", qi)]
                {
                    if let Some(value) = value {
                        members.insert(name, value);
                    }
                }
            }
            JWKType::Ec { crv, x, y, d } => {
                members.insert("kty", "EC");
                members.insert("crv", crv.as_str());
                members.insert("x", x);
                members.insert("y", y);
                if let Some(d) = d {
                    members.insert("d", d);
                }
            }
            JWKType::Okp { crv, x, d } => {
                members.insert("kty", "OKP");
                members.insert("crv", crv.as_str());
                members.insert("x", x);
                if let Some(d) = d {
                    members.insert("d", d);
                }
            }
            JWKType::Oct { k } => {
                members.insert("kty", "oct");
                members.insert("k", k);
            }
        }
        if let Some(alg) = &self.alg {
            members.insert("alg", alg);
        }
        if let Some(kid) = &self.kid {
            members.insert("kid", kid);
        }
        if let Some(r#use) = self.r#use {
            members.insert("use", r#use.as_str());
        }

        let mut map = serializer.serialize_map(Some(members.len()))?;
        for (name, value) in members {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Decoded key material of a [`JWK`].
pub(crate) enum KeyMaterial {
    Rsa {
        n: Vec<u8>,
        e: Vec<u8>,
        private: Option<RsaPrivateKey>,
    },
    Ec {
        crv: EllipticCurve,
        x: Vec<u8>,
        y: Vec<u8>,
        d: Option<Zeroizing<Vec<u8>>>,
    },
    Okp {
        crv: EllipticCurve,
        x: Vec<u8>,
        d: Option<Zeroizing<Vec<u8>>>,
    },
    Oct {
        k: Zeroizing<Vec<u8>>,
    },
}

/// Private members of an RSA key, CRT parameters included.
pub(crate) struct RsaPrivateKey {
    pub(crate) d: Zeroizing<Vec<u8>>,
    pub(crate) p: Zeroizing<Vec<u8>>,
    pub(crate) q: Zeroizing<Vec<u8>>,
    pub(crate) dp: Zeroizing<Vec<u8>>,
    pub(crate) dq: Zeroizing<Vec<u8>>,
    pub(crate) qi: Zeroizing<Vec<u8>>,
}

impl JWK {
    /// Create a [`JWK`] without any optional members.
    pub fn new(key_type: JWKType) -> Self {
        Self {
            key_type,
            alg: None,
            kid: None,
            r#use: None,
        }
    }

    /// Create a symmetric [`JWK`] for the given secret.
    pub fn new_oct(secret: &[u8]) -> Self {
        Self::new(JWKType::Oct {
            k: BASE64_URL_SAFE_NO_PAD.encode(secret),
        })
    }

    #[must_use]
    /// Set the "kid" (key ID) member.
    pub fn with_kid(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    #[must_use]
    /// Set the "alg" (algorithm) member.
    pub fn with_alg(mut self, alg: impl Into<String>) -> Self {
        self.alg = Some(alg.into());
        self
    }

    #[must_use]
    /// Set the "use" (public key use) member.
    pub fn with_use(mut self, r#use: JWKUse) -> Self {
        self.r#use = Some(r#use);
        self
    }

    pub fn key_type(&self) -> &JWKType {
        &self.key_type
    }

    /// The [`KeyType`] of this key.
    pub fn kty(&self) -> KeyType {
        match self.key_type {
            JWKType::Rsa { .. } => KeyType::Rsa,
            JWKType::Ec { .. } => KeyType::Ec,
            JWKType::Okp { .. } => KeyType::Okp,
            JWKType::Oct { .. } => KeyType::Oct,
        }
    }

    /// The curve of an EC or OKP key.
    pub fn curve(&self) -> Option<EllipticCurve> {
        match self.key_type {
            JWKType::Ec { crv, .. } | JWKType::Okp { crv, .. } => Some(crv),
            JWKType::Rsa { .. } | JWKType::Oct { .. } => None,
        }
    }

    pub fn kid(&self) -> Option<&str> {
        self.kid.as_deref()
    }

    pub fn alg(&self) -> Option<&str> {
        self.alg.as_deref()
    }

    pub fn key_use(&self) -> Option<JWKUse> {
        self.r#use
    }

    /// Symmetric keys have no public counterpart.
    pub fn is_symmetric(&self) -> bool {
        matches!(self.key_type, JWKType::Oct { .. })
    }

    /// Returns `true` if this key holds private (or secret) material.
    pub fn is_private(&self) -> bool {
        match &self.key_type {
            JWKType::Rsa { d, .. } | JWKType::Ec { d, .. } | JWKType::Okp { d, .. } => d.is_some(),
            JWKType::Oct { .. } => true,
        }
    }

    /// Project this key onto its public members.
    ///
    /// Fails for symmetric keys, as these have no public projection.
    pub fn to_public(&self) -> Result<Self, OpaqueError> {
        let key_type = match &self.key_type {
            JWKType::Rsa { n, e, .. } => JWKType::Rsa {
                n: n.clone(),
                e: e.clone(),
                d: None,
                p: None,
                q: None,
                dp: None,
                dq: None,
                qi: None,
            },
            JWKType::Ec { crv, x, y, .. } => JWKType::Ec {
                crv: *crv,
                x: x.clone(),
                y: y.clone(),
                d: None,
            },
            JWKType::Okp { crv, x, .. } => JWKType::Okp {
                crv: *crv,
                x: x.clone(),
                d: None,
            },
            JWKType::Oct { .. } => {
                return Err(OpaqueError::from_display(
                    "symmetric key cannot be converted to public key",
                ));
            }
        };
        Ok(Self {
            key_type,
            alg: self.alg.clone(),
            kid: self.kid.clone(),
            r#use: self.r#use,
        })
    }

    /// Decode all members of this key.
    pub(crate) fn material(&self) -> Result<KeyMaterial, OpaqueError> {
        match &self.key_type {
            JWKType::Rsa {
                n,
                e,
                d,
                p,
                q,
                dp,
                dq,
                qi,
            } => {
                let private = match (d, p, q, dp, dq, qi) {
                    (None, ..) => None,
                    (Some(d), Some(p), Some(q), Some(dp), Some(dq), Some(qi)) => {
                        Some(RsaPrivateKey {
                            d: decode_secret("d", d)?,
                            p: decode_secret("p", p)?,
                            q: decode_secret("q", q)?,
                            dp: decode_secret("dp", dp)?,
                            dq: decode_secret("dq", dq)?,
                            qi: decode_secret("qi", qi)?,
                        })
                    }
                    _ => {
                        return Err(OpaqueError::from_display(
                            "RSA private key without CRT parameters is not supported",
                        ));
                    }
                };
                Ok(KeyMaterial::Rsa {
                    n: decode_member("n", n)?,
                    e: decode_member("e", e)?,
                    private,
                })
            }
            JWKType::Ec { crv, x, y, d } => {
                if crv.key_type() != KeyType::Ec {
                    return Err(OpaqueError::from_display(format!(
                        "curve {crv} cannot be used with an EC key"
                    )));
                }
                Ok(KeyMaterial::Ec {
                    crv: *crv,
                    x: decode_member("x", x)?,
                    y: decode_member("y", y)?,
                    d: d.as_deref().map(|d| decode_secret("d", d)).transpose()?,
                })
            }
            JWKType::Okp { crv, x, d } => {
                if crv.key_type() != KeyType::Okp {
                    return Err(OpaqueError::from_display(format!(
                        "curve {crv} cannot be used with an OKP key"
                    )));
                }
                Ok(KeyMaterial::Okp {
                    crv: *crv,
                    x: decode_member("x", x)?,
                    d: d.as_deref().map(|d| decode_secret("d", d)).transpose()?,
                })
            }
            JWKType::Oct { k } => Ok(KeyMaterial::Oct {
                k: decode_secret("k", k)?,
            }),
        }
    }

    /// Create a [`JWK`] from decoded key material.
    pub(crate) fn from_material(material: &KeyMaterial) -> Self {
        let encode = |value: &[u8]| BASE64_URL_SAFE_NO_PAD.encode(value);
        let key_type = match material {
            KeyMaterial::Rsa { n, e, private } => JWKType::Rsa {
                n: encode(n),
                e: encode(e),
                d: private.as_ref().map(|private| encode(&private.d)),
                p: private.as_ref().map(|private| encode(&private.p)),
                q: private.as_ref().map(|private| encode(&private.q)),
                dp: private.as_ref().map(|private| encode(&private.dp)),
                dq: private.as_ref().map(|private| encode(&private.dq)),
                qi: private.as_ref().map(|private| encode(&private.qi)),
            },
            KeyMaterial::Ec { crv, x, y, d } => JWKType::Ec {
                crv: *crv,
                x: encode(x),
                y: encode(y),
                d: d.as_ref().map(|d| encode(d)),
            },
            KeyMaterial::Okp { crv, x, d } => JWKType::Okp {
                crv: *crv,
                x: encode(x),
                d: d.as_ref().map(|d| encode(d)),
            },
            KeyMaterial::Oct { k } => JWKType::Oct { k: encode(k) },
        };
        Self::new(key_type)
    }
}

impl KeyMaterial {
    /// Uncompressed SEC 1 point of an EC key.
    pub(crate) fn ec_point(x: &[u8], y: &[u8]) -> Vec<u8> {
        let mut point = Vec::with_capacity(1 + x.len() + y.len());
        point.push(crate::jose::constants::EC_POINT_UNCOMPRESSED);
        point.extend_from_slice(x);
        point.extend_from_slice(y);
        point
    }
}

fn decode_member(name: &'static str, value: &str) -> Result<Vec<u8>, OpaqueError> {
    BASE64_URL_SAFE_NO_PAD
        .decode(value)
        .with_context(|| format!("decode JWK member '{name}'"))
}

fn decode_secret(name: &'static str, value: &str) -> Result<Zeroizing<Vec<u8>>, OpaqueError> {
    decode_member(name, value).map(Zeroizing::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jwk_member_order_is_lexicographic() {
        let jwk = JWK::new(JWKType::Ec {
            crv: EllipticCurve::P256,
            x: "x".into(),
            y: "y".into(),
            d: None,
        });
        let output = serde_json::to_string(&jwk).unwrap();
        let expected_output = r##"{"crv":"P-256","kty":"EC","x":"x","y":"y"}"##;
        assert_eq!(&output, expected_output);

        let jwk = JWK::new(JWKType::Rsa {
            n: "n".into(),
            e: "e".into(),
            d: None,
            p: None,
            q: None,
            dp: None,
            dq: None,
            qi: None,
        })
        .with_kid("my-key")
        .with_alg("RS256");
        let output = serde_json::to_string(&jwk).unwrap();
        let expected_output = r##"{"alg":"RS256","e":"e","kid":"my-key","kty":"RSA","n":"n"}"##;
        assert_eq!(&output, expected_output);

        let jwk = JWK::new(JWKType::Oct { k: "k".into() }).with_use(JWKUse::Signature);
        let output = serde_json::to_string(&jwk).unwrap();
        let expected_output = r##"{"k":"k","kty":"oct","use":"sig"}"##;
        assert_eq!(&output, expected_output);
    }

    #[test]
    fn deserialize_okp_private_key() {
        let jwk: JWK = serde_json::from_str(
            r#"{"kty":"OKP","crv":"Ed25519","d":"nWGxne_9WmC6hEr0kuwsxERJxWl7MmkZcDusAxyuf2A","x":"11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo","kid":"ed"}"#,
        )
        .unwrap();
        assert_eq!(jwk.kty(), KeyType::Okp);
        assert_eq!(jwk.curve(), Some(EllipticCurve::Ed25519));
        assert_eq!(jwk.kid(), Some("ed"));
        assert!(jwk.is_private());
    }

    #[test]
    fn unknown_kty_is_rejected() {
        assert!(serde_json::from_str::<JWK>(r#"{"kty":"OCT","k":"AA"}"#).is_err());
        assert!(serde_json::from_str::<JWK>(r#"{"kty":"EC","crv":"P-999","x":"AA","y":"AA"}"#).is_err());
    }

    #[test]
    fn public_projection_drops_private_members() {
        let jwk = JWK::new(JWKType::Ec {
            crv: EllipticCurve::P384,
            x: "eA".into(),
            y: "eQ".into(),
            d: Some("ZA".into()),
        })
        .with_kid("ec");

        let public = jwk.to_public().unwrap();
        assert!(!public.is_private());
        assert_eq!(public.kid(), Some("ec"));
        // the original stays untouched
        assert!(jwk.is_private());
    }

    #[test]
    fn symmetric_key_has_no_public_projection() {
        let jwk = JWK::new_oct(b"secret");
        assert!(jwk.is_symmetric());
        assert!(jwk.to_public().is_err());
    }

    #[test]
    fn rsa_private_key_requires_crt_parameters() {
        let jwk = JWK::new(JWKType::Rsa {
            n: "AQAB".into(),
            e: "AQAB".into(),
            d: Some("AQAB".into()),
            p: None,
            q: None,
            dp: None,
            dq: None,
            qi: None,
        });
        assert!(jwk.material().is_err());
    }

    #[test]
    fn curve_must_match_key_family() {
        let jwk = JWK::new(JWKType::Okp {
            crv: EllipticCurve::P256,
            x: "AA".into(),
            d: None,
        });
        assert!(jwk.material().is_err());
    }
}
