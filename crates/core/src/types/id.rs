//! Newtype IDs for type-safe document references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different collections.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `PartialOrd`, `Ord`, `Hash`
/// - Conversion methods: `new()`, `as_i64()`, `next()`
/// - `From<i64>` and `Into<i64>` implementations
/// - `sqlx` `Type` and `Encode` implementations (with `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use emporium_core::define_id;
/// define_id!(ProductId);
/// define_id!(CartId);
///
/// let product_id = ProductId::new(1);
/// let cart_id = CartId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: ProductId = cart_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }

            /// Allocate the ID that follows every ID in `existing`.
            ///
            /// See [`next_id`]($crate::next_id) for the policy.
            #[must_use]
            pub fn next<I>(existing: I) -> Self
            where
                I: IntoIterator<Item = Self>,
            {
                Self($crate::next_id(existing.into_iter().map(|id| id.0)))
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i64 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <i64 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <i64 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_id!(ProductId);
define_id!(CartId);

/// Identifier allocation policy shared by every collection.
///
/// Returns `1` for an empty collection, otherwise one past the largest
/// existing ID. Gaps left by deletions are never filled: only the current
/// maximum anchors the next allocation, so deleting the newest document and
/// creating another one hands out the freed number again.
#[must_use]
pub fn next_id<I>(existing: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    existing.into_iter().max().map_or(1, |max| max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_id_empty_collection() {
        assert_eq!(next_id(Vec::new()), 1);
    }

    #[test]
    fn test_next_id_is_max_plus_one() {
        assert_eq!(next_id([1, 2, 3]), 4);
        assert_eq!(next_id([7, 2, 5]), 8);
    }

    #[test]
    fn test_next_id_ignores_gaps() {
        // IDs 2 and 3 were deleted; only the maximum matters.
        assert_eq!(next_id([1, 4]), 5);
    }

    #[test]
    fn test_typed_next() {
        let ids = [ProductId::new(3), ProductId::new(9)];
        assert_eq!(ProductId::next(ids), ProductId::new(10));
        assert_eq!(CartId::next([]), CartId::new(1));
    }

    #[test]
    fn test_id_serializes_transparently() {
        let json = serde_json::to_string(&CartId::new(42)).unwrap_or_default();
        assert_eq!(json, "42");
    }
}
