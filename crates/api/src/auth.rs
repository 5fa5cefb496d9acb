// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Role pre-checks for import and export.
//!
//! Authentication happens upstream; this layer only receives the actor's
//! id and role and decides whether the requested operation is allowed.

use std::str::FromStr;

use crate::error::AuthError;

/// Actor roles for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Full access, including imports.
    Admin,
    /// May import and export records.
    Editor,
    /// Read-only: may export records.
    Viewer,
}

impl Role {
    /// Returns the lowercase role name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            "viewer" => Ok(Self::Viewer),
            other => Err(AuthError::AuthenticationFailed {
                reason: format!("unknown role '{other}'"),
            }),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An authenticated actor with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The role assigned to this actor.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `role` - The role assigned to this actor
    #[must_use]
    pub const fn new(id: String, role: Role) -> Self {
        Self { id, role }
    }

    /// Builds an actor from the identity forwarded by the authenticating proxy.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AuthenticationFailed` if the id is blank or the
    /// role is unknown.
    pub fn from_identity(id: &str, role: &str) -> Result<Self, AuthError> {
        let id: &str = id.trim();
        if id.is_empty() {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("missing actor id"),
            });
        }
        Ok(Self::new(id.to_string(), role.parse()?))
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks if an actor may import records.
    ///
    /// Covers every step of an import session: upload, selection, cell
    /// edits, commit and abandonment. Admin and Editor actors may import.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor has the Viewer role.
    pub fn authorize_import(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin | Role::Editor => Ok(()),
            Role::Viewer => Err(AuthError::Unauthorized {
                action: String::from("import_records"),
                required_role: String::from("Editor"),
            }),
        }
    }

    /// Checks if an actor may export records. Every role may export.
    ///
    /// # Errors
    ///
    /// Currently accepts every role.
    pub const fn authorize_export(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin | Role::Editor | Role::Viewer => Ok(()),
        }
    }
}
