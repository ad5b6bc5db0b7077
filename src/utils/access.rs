//! Authorization decisions.
//!
//! Pure functions: they look at who is asking and who owns the resource and
//! never touch the store.

use std::fmt;

use crate::{error::AppError, models::user::Role};

/// The authenticated identity behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: i64,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    NotOwner(Action),
    AdminOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Maps a denial to 401 or 403. `resource` names the target in the message.
    pub fn into_result(self, resource: &str) -> Result<(), AppError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(DenyReason::Unauthenticated) => {
                Err(AppError::AuthError("Not authorized, no token".to_string()))
            }
            Decision::Deny(DenyReason::NotOwner(action)) => Err(AppError::Forbidden(format!(
                "Not authorized to {} this {}",
                action, resource
            ))),
            Decision::Deny(DenyReason::AdminOnly) => {
                Err(AppError::Forbidden("Not authorized as an admin".to_string()))
            }
        }
    }
}

/// Reads are public. Mutations need the owner or an admin.
pub fn authorize(caller: Option<&Caller>, action: Action, owner_id: i64) -> Decision {
    if action == Action::Read {
        return Decision::Allow;
    }

    match caller {
        None => Decision::Deny(DenyReason::Unauthenticated),
        Some(caller) if caller.id == owner_id || caller.is_admin() => Decision::Allow,
        Some(_) => Decision::Deny(DenyReason::NotOwner(action)),
    }
}

/// Admin-only operations ignore ownership entirely.
pub fn authorize_admin(caller: Option<&Caller>) -> Decision {
    match caller {
        None => Decision::Deny(DenyReason::Unauthenticated),
        Some(caller) if caller.is_admin() => Decision::Allow,
        Some(_) => Decision::Deny(DenyReason::AdminOnly),
    }
}
