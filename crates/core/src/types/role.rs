//! Account roles and the capabilities each one carries.
//!
//! Every request handler resolves the signed-in user's role first and asks it
//! whether the requested operation is allowed. The role is chosen once at
//! sign-up; admins are only ever created from the CLI.

use serde::{Deserialize, Serialize};

/// The role attached to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Publishes classroom wishlists.
    Teacher,
    /// Pledges towards wishlist items.
    Donor,
    /// Reviews teacher accounts.
    Admin,
}

/// Operations gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Create or update the teacher profile row.
    ManageTeacherProfile,
    /// Create, edit and delete wishlists and their items.
    ManageWishlists,
    /// See pledges made against one's own wishlists.
    ViewIncomingPledges,
    /// Create or update the donor profile row.
    ManageDonorProfile,
    /// Create pledges and move them through their lifecycle.
    Pledge,
    /// Approve or reject teachers in the verification queue.
    ReviewTeachers,
}

impl UserRole {
    /// Whether this role may perform `capability`.
    #[must_use]
    pub const fn permits(self, capability: Capability) -> bool {
        match self {
            Self::Teacher => matches!(
                capability,
                Capability::ManageTeacherProfile
                    | Capability::ManageWishlists
                    | Capability::ViewIncomingPledges
            ),
            Self::Donor => matches!(
                capability,
                Capability::ManageDonorProfile | Capability::Pledge
            ),
            Self::Admin => matches!(capability, Capability::ReviewTeachers),
        }
    }

    /// Whether a user may pick this role when signing up.
    #[must_use]
    pub const fn is_self_service(self) -> bool {
        matches!(self, Self::Teacher | Self::Donor)
    }

    /// Stable lowercase name, matching the database enum label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::Donor => "donor",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "teacher" => Ok(Self::Teacher),
            "donor" => Ok(Self::Donor),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_teacher_capabilities() {
        let role = UserRole::Teacher;
        assert!(role.permits(Capability::ManageWishlists));
        assert!(role.permits(Capability::ViewIncomingPledges));
        assert!(!role.permits(Capability::Pledge));
        assert!(!role.permits(Capability::ReviewTeachers));
    }

    #[test]
    fn test_donor_capabilities() {
        let role = UserRole::Donor;
        assert!(role.permits(Capability::Pledge));
        assert!(role.permits(Capability::ManageDonorProfile));
        assert!(!role.permits(Capability::ManageWishlists));
    }

    #[test]
    fn test_admin_only_reviews() {
        let role = UserRole::Admin;
        assert!(role.permits(Capability::ReviewTeachers));
        assert!(!role.permits(Capability::Pledge));
        assert!(!role.permits(Capability::ManageTeacherProfile));
    }

    #[test]
    fn test_admin_is_not_self_service() {
        assert!(UserRole::Teacher.is_self_service());
        assert!(UserRole::Donor.is_self_service());
        assert!(!UserRole::Admin.is_self_service());
    }

    #[test]
    fn test_parse_and_display() {
        for role in [UserRole::Teacher, UserRole::Donor, UserRole::Admin] {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), role);
        }
        assert!("superuser".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(serde_json::to_string(&UserRole::Donor).unwrap(), "\"donor\"");
    }
}
