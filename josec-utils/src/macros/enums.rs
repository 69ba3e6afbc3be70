#[doc(hidden)]
#[macro_export]
/// A macro which defines a closed, string backed enum type.
///
/// The order in which the variants are declared is the canonical
/// order, exposed via the generated `ALL` and `NAMES` constants.
/// Parsing is exact: identifiers are case sensitive and anything
/// outside of the declared set is rejected.
macro_rules! __enum_builder {
    (
        $(#[$m:meta])*
        @String
        $enum_vis:vis enum $enum_name:ident
        { $( $(#[$enum_meta:meta])* $enum_var:ident => $enum_val:literal ),* $(,)? }
    ) => {
        $(#[$m])*
        #[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
        $enum_vis enum $enum_name {
            $(
                $(#[$enum_meta])*
                $enum_var
            ),*
        }

        impl $enum_name {
            /// All variants, in canonical order.
            $enum_vis const ALL: &'static [Self] = &[$($enum_name::$enum_var),*];

            /// Identifiers of all variants, in canonical order.
            $enum_vis const NAMES: &'static [&'static str] = &[$($enum_val),*];

            /// Identifier of this variant.
            $enum_vis fn as_str(&self) -> &'static str {
                match self {
                    $( $enum_name::$enum_var => $enum_val ),*
                }
            }

            /// Same as `FromStr` but returning `None` for unknown values
            $enum_vis fn strict_parse(s: &str) -> Option<Self> {
                match s {
                    $( $enum_val => Some($enum_name::$enum_var), )*
                    _ => None,
                }
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = $crate::macros::enums::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::strict_parse(s).ok_or_else(|| {
                    $crate::macros::enums::UnknownVariant::new(stringify!($enum_name), s)
                })
            }
        }

        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::macros::enums::__SerdeSerialize for $enum_name {
            #[inline]
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: $crate::macros::enums::__SerdeSerializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> $crate::macros::enums::__SerdeDeserialize<'de> for $enum_name {
            #[inline]
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: $crate::macros::enums::__SerdeDeserializer<'de>,
            {
                let s = <::std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
                Self::strict_parse(&s).ok_or_else(|| {
                    <D::Error as $crate::macros::enums::__SerdeDeError>::unknown_variant(
                        &s,
                        Self::NAMES,
                    )
                })
            }
        }
    };
}

#[doc(inline)]
pub use crate::__enum_builder as enum_builder;

#[doc(hidden)]
pub use serde::{
    Deserialize as __SerdeDeserialize, Deserializer as __SerdeDeserializer,
    Serialize as __SerdeSerialize, Serializer as __SerdeSerializer, de::Error as __SerdeDeError,
};

/// Error returned when parsing an identifier which is not part
/// of the closed set of an [`enum_builder`] enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    #[doc(hidden)]
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }

    /// The rejected identifier.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl ::std::fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl ::std::error::Error for UnknownVariant {}

#[cfg(test)]
mod tests {
    use super::*;

    enum_builder! {
        /// Test enum
        @String
        pub(super) enum Shape {
            /// a square
            Square => "square",
            Circle => "circle",
            BigTriangle => "big-triangle",
        }
    }

    #[test]
    fn canonical_order_follows_declaration() {
        assert_eq!(Shape::ALL, &[Shape::Square, Shape::Circle, Shape::BigTriangle]);
        assert_eq!(Shape::NAMES, &["square", "circle", "big-triangle"]);
    }

    #[test]
    fn parse_is_exact() {
        assert_eq!(Some(Shape::BigTriangle), Shape::strict_parse("big-triangle"));
        assert_eq!(None, Shape::strict_parse("Square"));
        assert_eq!(None, Shape::strict_parse(" square"));

        let err = "hexagon".parse::<Shape>().unwrap_err();
        assert_eq!(err.value(), "hexagon");
        assert_eq!(err.to_string(), "unknown Shape 'hexagon'");
    }

    #[test]
    fn display_matches_identifier() {
        for (shape, name) in Shape::ALL.iter().zip(Shape::NAMES) {
            assert_eq!(shape.to_string(), *name);
            assert_eq!(shape.as_str(), *name);
        }
    }

    #[test]
    fn serde_uses_identifier() {
        assert_eq!(
            serde_json::to_string(&Shape::BigTriangle).unwrap(),
            r#""big-triangle""#
        );
        assert_eq!(
            serde_json::from_str::<Shape>(r#""circle""#).unwrap(),
            Shape::Circle
        );
        assert!(serde_json::from_str::<Shape>(r#""CIRCLE""#).is_err());
    }
}
