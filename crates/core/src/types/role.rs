//! Staff role with the derived administrator flag.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A staff role as the backend transports it: a bare integer.
///
/// The backend assigns `1` to administrators; any other value is regular
/// staff. The console never branches on the raw integer - every permission
/// check goes through [`Role::is_admin`], which gates the user-management
/// screen and the admin-only navigation entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(i32);

impl Role {
    /// The administrator role.
    pub const ADMIN: Self = Self(1);
    /// Regular staff.
    pub const STAFF: Self = Self(2);

    /// Create a role from its backend integer.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Get the backend integer.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        self.0
    }

    /// Whether this role grants administrator access.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.0 == Self::ADMIN.0
    }

    /// Human-readable label for table cells.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        if self.is_admin() { "Administrator" } else { "Staff" }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl From<i32> for Role {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_flag() {
        assert!(Role::ADMIN.is_admin());
        assert!(!Role::STAFF.is_admin());
        assert!(!Role::new(0).is_admin());
        assert!(!Role::new(7).is_admin());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Role::ADMIN.label(), "Administrator");
        assert_eq!(Role::new(3).label(), "Staff");
    }

    #[test]
    fn test_serde_is_bare_integer() {
        let json = serde_json::to_string(&Role::ADMIN).unwrap();
        assert_eq!(json, "1");

        let role: Role = serde_json::from_str("2").unwrap();
        assert_eq!(role, Role::STAFF);

        // Unknown integers still deserialize; they are simply not admin.
        let role: Role = serde_json::from_str("42").unwrap();
        assert!(!role.is_admin());
    }
}
