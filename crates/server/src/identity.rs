// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Actor identity taken from request headers.
//!
//! The server sits behind the admin frontend, which has already
//! authenticated the user and forwards who they are and what role they
//! hold. Handlers that take an [`Actor`] reject requests without both
//! headers with `401 Unauthorized`.

use axum::{extract::FromRequestParts, http::request::Parts};
use booth_map_api::{ApiError, AuthenticatedActor};
use tracing::{debug, warn};

use crate::HttpError;

/// Header carrying the actor's identifier.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

/// Header carrying the actor's role (`admin`, `editor` or `viewer`).
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Extractor yielding the authenticated actor of a request.
#[derive(Debug, Clone)]
pub struct Actor(pub AuthenticatedActor);

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id: &str = header_text(parts, ACTOR_ID_HEADER)?;
        let role: &str = header_text(parts, ACTOR_ROLE_HEADER)?;

        let actor: AuthenticatedActor =
            AuthenticatedActor::from_identity(id, role).map_err(|e| {
                warn!(error = %e, "Rejected actor headers");
                HttpError::from(ApiError::from(e))
            })?;

        debug!(actor = %actor.id, role = %actor.role, "Actor identified");
        Ok(Self(actor))
    }
}

/// Reads a header as text, rejecting missing or non-ASCII values.
fn header_text<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, HttpError> {
    let value = parts.headers.get(name).ok_or_else(|| {
        debug!(header = name, "Missing actor header");
        HttpError::from(ApiError::AuthenticationFailed {
            reason: format!("missing {name} header"),
        })
    })?;

    value.to_str().map_err(|_| {
        warn!(header = name, "Invalid actor header encoding");
        HttpError::from(ApiError::AuthenticationFailed {
            reason: format!("invalid {name} header"),
        })
    })
}
