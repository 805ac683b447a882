//! Newtype IDs for type-safe entity references.
//!
//! Users, spies and records are all keyed by `SERIAL` integers. Wrapping them
//! keeps a `RecordId` from ever being passed where a `SpyId` is expected,
//! which matters here because record ownership is resolved through the spy.

/// Error returned when a path or query segment is not a valid entity ID.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdParseError {
    /// The input string is empty.
    #[error("{kind} is required")]
    Empty {
        /// Name of the ID type that failed to parse.
        kind: &'static str,
    },
    /// The input is not a positive integer.
    #[error("{kind} must be a positive integer (got '{value}')")]
    Invalid {
        /// Name of the ID type that failed to parse.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Display`
/// - `FromStr` accepting positive integers only
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use pixel_spy_core::define_id;
/// define_id!(WidgetId, "widget id");
///
/// let id: WidgetId = "42".parse().unwrap();
/// assert_eq!(id.as_i32(), 42);
/// assert!("-1".parse::<WidgetId>().is_err());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident, $label:literal) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::id::IdParseError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err($crate::types::id::IdParseError::Empty { kind: $label });
                }
                match trimmed.parse::<i32>() {
                    Ok(id) if id > 0 => Ok(Self(id)),
                    _ => Err($crate::types::id::IdParseError::Invalid {
                        kind: $label,
                        value: trimmed.to_owned(),
                    }),
                }
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <i32 as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_id!(UserId, "user id");
define_id!(SpyId, "spy id");
define_id!(RecordId, "record id");

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive() {
        let id: SpyId = "17".parse().unwrap();
        assert_eq!(id, SpyId::new(17));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let id: RecordId = " 3 ".parse().unwrap();
        assert_eq!(id.as_i32(), 3);
    }

    #[test]
    fn test_parse_empty() {
        let err = "".parse::<SpyId>().unwrap_err();
        assert_eq!(err, IdParseError::Empty { kind: "spy id" });
        assert_eq!(err.to_string(), "spy id is required");
    }

    #[test]
    fn test_parse_rejects_zero_and_negative() {
        assert!("0".parse::<SpyId>().is_err());
        assert!("-4".parse::<UserId>().is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = "abc".parse::<RecordId>().unwrap_err();
        assert!(matches!(err, IdParseError::Invalid { kind: "record id", .. }));
    }

    #[test]
    fn test_display_and_serde_are_bare_integers() {
        let id = UserId::new(9);
        assert_eq!(id.to_string(), "9");
        assert_eq!(serde_json::to_string(&id).unwrap(), "9");
    }
}
