//! User roles and their capability predicates.

use serde::{Deserialize, Serialize};

/// Role of an account. Closed set; authorization decisions go through the
/// `is_*` predicates rather than comparing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Manages categories, global FAQs and any store's FAQs.
    Admin,
    /// Read-only access.
    Customer,
    /// Owns exactly one store and manages its FAQs.
    Merchant,
}

impl Role {
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    #[must_use]
    pub const fn is_merchant(self) -> bool {
        matches!(self, Self::Merchant)
    }

    #[must_use]
    pub const fn is_customer(self) -> bool {
        matches!(self, Self::Customer)
    }

    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Customer => "customer",
            Self::Merchant => "merchant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "customer" => Ok(Self::Customer),
            "merchant" => Ok(Self::Merchant),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates_are_exclusive() {
        for role in [Role::Admin, Role::Customer, Role::Merchant] {
            let hits = [role.is_admin(), role.is_customer(), role.is_merchant()]
                .iter()
                .filter(|b| **b)
                .count();
            assert_eq!(hits, 1, "{role}");
        }
    }

    #[test]
    fn test_from_str_round_trip() {
        for role in [Role::Admin, Role::Customer, Role::Merchant] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert!("superuser".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
    }
}
