//! Caller identity and authorization.
//!
//! Every request carries a bearer token that an [`IdentityProvider`]
//! verifies into an [`Identity`]. Authorization is then a lookup of the
//! caller's known roles in the [`Operation`] table, plus ownership checks
//! for student callers.

pub mod guard;
pub mod provider;
pub mod role;

use serde::Serialize;

pub use guard::{accessible_pages, guard, guard_path, landing_path, page_roles, GuardOutcome};
pub use provider::{IdentityProvider, KeycloakProvider, StaticIdentityProvider};
pub use role::{Operation, Role};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Role not permitted for {operation}")]
    Forbidden { operation: &'static str },

    #[error("Not permitted to act on behalf of another user")]
    NotOwner,

    #[error("Identity provider error: {0}")]
    Provider(String),
}

/// A verified caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identity {
    pub email: String,
    pub nama: String,
    /// Role strings as issued, including ones the application ignores.
    #[serde(rename = "role")]
    pub raw_roles: Vec<String>,
}

impl Identity {
    pub fn new(email: impl Into<String>, nama: impl Into<String>, roles: &[&str]) -> Self {
        Self {
            email: email.into(),
            nama: nama.into(),
            raw_roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn roles(&self) -> Vec<Role> {
        Role::from_claims(&self.raw_roles)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles().contains(&role)
    }

    pub fn authorize(&self, operation: Operation) -> Result<(), AuthError> {
        if operation.permits(&self.roles()) {
            Ok(())
        } else {
            log::warn!(
                "Denied {} for {} (roles: {:?})",
                operation.name(),
                self.email,
                self.raw_roles
            );
            Err(AuthError::Forbidden {
                operation: operation.name(),
            })
        }
    }

    /// Whether the caller is limited to their own records: a student with
    /// no staff role.
    pub fn is_student_only(&self) -> bool {
        let roles = self.roles();
        roles.contains(&Role::Mahasiswa) && roles.iter().all(|r| *r == Role::Mahasiswa)
    }

    /// Rejects a student-only caller reading another user's records. Staff
    /// may read anyone's; writes go through [`Identity::ensure_self`].
    pub fn ensure_owner(&self, email: &str) -> Result<(), AuthError> {
        if self.is_student_only() && !self.email.eq_ignore_ascii_case(email) {
            return Err(AuthError::NotOwner);
        }
        Ok(())
    }

    /// Rejects any caller whose verified email differs from `email`.
    pub fn ensure_self(&self, email: &str) -> Result<(), AuthError> {
        if self.email.eq_ignore_ascii_case(email) {
            Ok(())
        } else {
            Err(AuthError::NotOwner)
        }
    }
}
