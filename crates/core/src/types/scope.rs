//! Cart ownership scope.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::id::UserId;

/// Identifies whose cart an operation acts on.
///
/// Every cart, checkout, and order-placement operation takes an explicit
/// scope; nothing reads the acting identity from ambient state. Logged-in
/// shoppers are scoped by user id, anonymous shoppers by a cart token (a
/// UUID minted on first cart use and kept in the session).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum CartScope {
    Customer(UserId),
    Guest(Uuid),
}

impl CartScope {
    /// The `(user_id, cart_token)` column pair for SQL filters.
    ///
    /// Exactly one side is `Some`. Queries match with NULL-safe equality
    /// (`IS NOT DISTINCT FROM`) so a single statement serves both scopes.
    #[must_use]
    pub const fn owner_pair(&self) -> (Option<UserId>, Option<Uuid>) {
        match self {
            Self::Customer(user_id) => (Some(*user_id), None),
            Self::Guest(token) => (None, Some(*token)),
        }
    }

    /// The user id when the scope belongs to a logged-in shopper.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Customer(user_id) => Some(*user_id),
            Self::Guest(_) => None,
        }
    }

    /// Whether this scope belongs to an anonymous shopper.
    #[must_use]
    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Guest(_))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_owner_pair() {
        let scope = CartScope::Customer(UserId::new(12));
        assert_eq!(scope.owner_pair(), (Some(UserId::new(12)), None));
        assert_eq!(scope.user_id(), Some(UserId::new(12)));
        assert!(!scope.is_guest());
    }

    #[test]
    fn test_guest_owner_pair() {
        let token = Uuid::new_v4();
        let scope = CartScope::Guest(token);
        assert_eq!(scope.owner_pair(), (None, Some(token)));
        assert_eq!(scope.user_id(), None);
        assert!(scope.is_guest());
    }
}
