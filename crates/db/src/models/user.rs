//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use validator::Validate;
use vtrack_core::roles::Role;
use vtrack_core::types::EntityId;
use vtrack_core::validation::require_not_blank;

use super::not_blank;
use crate::error::StorageResult;

/// A user. Identity is asserted by username; no credential is stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: EntityId,
    pub username: String,
    pub role: Role,
}

/// DTO for creating a user. `role` defaults to `user`; the username is
/// stored trimmed.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(custom(function = "not_blank"))]
    pub username: String,
    #[serde(default)]
    pub role: Role,
}

impl User {
    pub fn from_create(input: &CreateUser) -> StorageResult<User> {
        let username = input.username.trim();
        require_not_blank("username", username)?;
        Ok(User {
            id: vtrack_core::types::new_id(),
            username: username.to_string(),
            role: input.role,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_is_stored_trimmed() {
        let user = User::from_create(&CreateUser {
            username: "  bob ".into(),
            role: Role::User,
        })
        .unwrap();
        assert_eq!(user.username, "bob");
    }
}
