//! Human-readable order numbers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Length of the random token after the `ORD-` prefix.
const TOKEN_LENGTH: usize = 10;

/// Uppercase alphanumerics only, so numbers survive being read over the
/// phone or typed from a packing slip.
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A customer-facing order number, e.g. `ORD-7KQ2M9X4BT`.
///
/// Generated from a random token rather than a timestamp; the database
/// column is unique and callers retry generation on a unique-key violation,
/// which makes collisions harmless as well as vanishingly rare
/// (36^10 ≈ 3.6e15 tokens).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Prefix shared by every order number.
    pub const PREFIX: &'static str = "ORD-";

    /// Generate a fresh random order number.
    #[must_use]
    pub fn generate() -> Self {
        use rand::Rng;

        let mut rng = rand::rng();
        let token: String = (0..TOKEN_LENGTH)
            .map(|_| {
                let idx = rng.random_range(0..CHARSET.len());
                // SAFETY: idx is always within bounds since random_range returns 0..CHARSET.len()
                char::from(*CHARSET.get(idx).expect("idx within bounds"))
            })
            .collect();

        Self(format!("{}{token}", Self::PREFIX))
    }

    /// Returns the order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `OrderNumber` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for OrderNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_format() {
        let number = OrderNumber::generate();
        let s = number.as_str();
        assert!(s.starts_with("ORD-"));
        assert_eq!(s.len(), "ORD-".len() + 10);
    }

    #[test]
    fn test_generate_charset() {
        for _ in 0..100 {
            let number = OrderNumber::generate();
            let token = number.as_str().trim_start_matches("ORD-");
            assert!(
                token
                    .bytes()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()),
                "unexpected character in {token}"
            );
        }
    }

    #[test]
    fn test_generate_varies() {
        let a = OrderNumber::generate();
        let b = OrderNumber::generate();
        // 36^10 tokens; two draws colliding means the RNG is broken.
        assert_ne!(a, b);
    }

    #[test]
    fn test_serde_transparent() {
        let number = OrderNumber::generate();
        let json = serde_json::to_string(&number).unwrap();
        assert_eq!(json, format!("\"{number}\""));
    }
}
