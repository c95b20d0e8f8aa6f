//! User account model.
//!
//! # Invariants
//! - `password` is an opaque hash string; the core never inspects it.
//! - `company_id` fixes which tenant the user acts for after login.

use crate::model::tenant::{Record, TenantId, TenantScoped};
use crate::model::validation::{require_tenant, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Planner,
    Executor,
    /// Read-mostly demonstration account.
    Demo,
}

/// Access state controlled by administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Pending,
    Approved,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub company_id: TenantId,
    pub name: String,
    pub role: UserRole,
    /// Two-letter initials shown next to history entries.
    pub avatar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub status: UserStatus,
    /// Forces a password reset on next login.
    #[serde(default)]
    pub must_change_password: bool,
}

impl User {
    /// Creates an approved user without credentials.
    pub fn new(
        id: impl Into<String>,
        company_id: impl Into<TenantId>,
        name: impl Into<String>,
        role: UserRole,
    ) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            company_id: company_id.into(),
            avatar: initials(&name),
            name,
            role,
            password: None,
            status: UserStatus::Approved,
            must_change_password: false,
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.status == UserStatus::Blocked
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl Record for User {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_tenant("user", &self.id, &self.company_id)
    }
}

impl TenantScoped for User {
    fn company_id(&self) -> &str {
        &self.company_id
    }
}

/// Derives up to two uppercase initials from a display name.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{initials, User, UserRole};

    #[test]
    fn initials_take_first_two_words() {
        assert_eq!(initials("ana planejamento silva"), "AP");
        assert_eq!(initials("Solo"), "S");
        assert_eq!(initials("   "), "");
    }

    #[test]
    fn new_user_is_approved_with_avatar() {
        let user = User::new("u9", "c1", "Roberto Compras", UserRole::Executor);
        assert_eq!(user.avatar, "RC");
        assert!(!user.is_blocked());
        assert!(!user.is_admin());
    }
}
