//! Admin roles and the capabilities each role grants.
//!
//! Roles form a strict total order `staff < manager < super_admin`, used for
//! role-floor checks on admin routes. Finer-grained gates go through
//! [`Permission`], a static role → capability table.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Admin role with different permission levels.
///
/// Stored as `TEXT` in `admin_users.role` using the snake_case names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Can view orders and products.
    Staff,
    /// Can manage products and orders.
    Manager,
    /// Full access to all features including user management.
    SuperAdmin,
}

/// A capability checked by admin routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ManageProducts,
    ManageOrders,
    ManageUsers,
    ViewAnalytics,
}

/// Error returned when a role name is not recognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid admin role: {0}")]
pub struct ParseRoleError(pub String);

const SUPER_ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::ManageProducts,
    Permission::ManageOrders,
    Permission::ManageUsers,
    Permission::ViewAnalytics,
];

const MANAGER_PERMISSIONS: &[Permission] = &[
    Permission::ManageProducts,
    Permission::ManageOrders,
    Permission::ViewAnalytics,
];

const STAFF_PERMISSIONS: &[Permission] = &[];

impl AdminRole {
    /// Every role, lowest first.
    pub const ALL: [Self; 3] = [Self::Staff, Self::Manager, Self::SuperAdmin];

    /// Numeric rank used for hierarchy comparison.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Staff => 1,
            Self::Manager => 2,
            Self::SuperAdmin => 3,
        }
    }

    /// Whether this role is at or above `minimum` in the hierarchy.
    #[must_use]
    pub const fn meets(self, minimum: Self) -> bool {
        self.rank() >= minimum.rank()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::Manager => "manager",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Human-readable label for admin screens.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Staff => "Staff",
            Self::Manager => "Manager",
            Self::SuperAdmin => "Super Admin",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Staff => "Can view orders and products",
            Self::Manager => "Can manage products and orders",
            Self::SuperAdmin => "Full access to all features including user management",
        }
    }

    /// The capability set granted to this role.
    #[must_use]
    pub const fn permissions(self) -> &'static [Permission] {
        match self {
            Self::Staff => STAFF_PERMISSIONS,
            Self::Manager => MANAGER_PERMISSIONS,
            Self::SuperAdmin => SUPER_ADMIN_PERMISSIONS,
        }
    }

    #[must_use]
    pub fn has_permission(self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl PartialOrd for AdminRole {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AdminRole {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "staff" => Ok(Self::Staff),
            "manager" => Ok(Self::Manager),
            "super_admin" => Ok(Self::SuperAdmin),
            other => Err(ParseRoleError(other.to_owned())),
        }
    }
}

impl Permission {
    pub const ALL: [Self; 4] = [
        Self::ManageProducts,
        Self::ManageOrders,
        Self::ManageUsers,
        Self::ViewAnalytics,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ManageProducts => "manage_products",
            Self::ManageOrders => "manage_orders",
            Self::ManageUsers => "manage_users",
            Self::ViewAnalytics => "view_analytics",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
