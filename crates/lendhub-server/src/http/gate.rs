// SPDX-License-Identifier: Apache-2.0

use crate::auth::{bearer_token, verify_token, PrincipalKind, TokenClaims};
use crate::services::store_err;
use crate::AppState;
use axum::http::HeaderMap;
use chrono::Utc;
use lendhub_api::ApiError;
use lendhub_model::{Admin, User};

pub(crate) fn require_claims(state: &AppState, headers: &HeaderMap) -> Result<TokenClaims, ApiError> {
    let token = bearer_token(headers).ok_or_else(ApiError::unauthorized)?;
    verify_token(&state.config.token_secret, token, Utc::now())
        .map_err(|_| ApiError::unauthorized())
}

/// Any authenticated principal, admin or borrower. Used by shared read-only
/// surfaces such as the quote preview.
pub(crate) fn require_any(state: &AppState, headers: &HeaderMap) -> Result<TokenClaims, ApiError> {
    require_claims(state, headers)
}

/// Verifies an admin token and re-loads the admin record, so a revoked admin
/// is locked out the moment the record is deleted.
pub(crate) fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<Admin, ApiError> {
    let claims = require_claims(state, headers)?;
    if claims.kind != PrincipalKind::Admin {
        return Err(ApiError::unauthorized());
    }
    state
        .store
        .get_admin(&claims.sub)
        .map_err(|err| if err.is_not_found() {
            ApiError::unauthorized()
        } else {
            store_err(err)
        })
}

pub(crate) fn require_user(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let claims = require_claims(state, headers)?;
    if claims.kind != PrincipalKind::User {
        return Err(ApiError::unauthorized());
    }
    state
        .store
        .get_user(&claims.sub)
        .map_err(|err| if err.is_not_found() {
            ApiError::unauthorized()
        } else {
            store_err(err)
        })
}

pub(crate) fn ensure_manage_users(admin: &Admin) -> Result<(), ApiError> {
    if admin.can_manage_users() {
        Ok(())
    } else {
        Err(ApiError::forbidden("manage users"))
    }
}

pub(crate) fn ensure_manage_loans(admin: &Admin) -> Result<(), ApiError> {
    if admin.can_manage_loans() {
        Ok(())
    } else {
        Err(ApiError::forbidden("manage loans"))
    }
}

pub(crate) fn ensure_superadmin(admin: &Admin) -> Result<(), ApiError> {
    if admin.role.is_super() {
        Ok(())
    } else {
        Err(ApiError::forbidden("superadmin only"))
    }
}
