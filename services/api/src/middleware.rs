//! Authentication middleware for JWT token validation

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use common::token::{Role, TokenType};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Authenticated user information
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Require a valid access token and expose the caller as [`AuthUser`]
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(ApiError::Unauthorized)?;

    let claims = state
        .jwt_service
        .validate_token_of_type(bearer.token(), TokenType::Access)
        .map_err(|e| {
            debug!("Rejected bearer token: {}", e);
            ApiError::Unauthorized
        })?;

    let user = AuthUser {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
    };
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Only let [`Role::Admin`] callers through; must run inside [`auth_middleware`]
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    let user = req
        .extensions()
        .get::<AuthUser>()
        .ok_or(ApiError::Unauthorized)?;

    if user.role != Role::Admin {
        warn!("User {} ({}) attempted an admin operation", user.email, user.id);
        return Err(ApiError::Forbidden);
    }

    Ok(next.run(req).await)
}
