// SPDX-License-Identifier: Apache-2.0

use crate::http::gate::{
    ensure_manage_loans, ensure_manage_users, ensure_superadmin, require_admin, require_any,
    require_user,
};
use crate::http::respond::respond;
use crate::services;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use lendhub_api::{
    AdminCreateRequest, AdminLoginRequest, InterestRateUpsertRequest, LoanApplicationRequest,
    LoanStatusUpdateRequest, QuoteParams, UserCreateRequest, UserLoginRequest,
    UserProfileUpdateRequest, WithdrawalCreateRequest, WithdrawalResolveRequest,
};

pub(crate) async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub(crate) async fn readyz(State(state): State<AppState>) -> Response {
    if state.ready.load(std::sync::atomic::Ordering::Relaxed) {
        (StatusCode::OK, "ready").into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not-ready").into_response()
    }
}

// --- auth ------------------------------------------------------------------

pub(crate) async fn admin_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<AdminLoginRequest>,
) -> Response {
    respond(&state, &headers, services::admin_login(&state, req))
}

pub(crate) async fn user_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<UserLoginRequest>,
) -> Response {
    respond(&state, &headers, services::user_login(&state, req))
}

// --- shared ----------------------------------------------------------------

pub(crate) async fn quote(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<QuoteParams>,
) -> Response {
    let result = require_any(&state, &headers)
        .and_then(|_| params.validated())
        .and_then(|(amount, term)| services::quote(&state, amount, term));
    respond(&state, &headers, result)
}

// --- borrower --------------------------------------------------------------

pub(crate) async fn me(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let result = require_user(&state, &headers)
        .and_then(|user| services::me_profile(&state, user.id.as_str()));
    respond(&state, &headers, result)
}

pub(crate) async fn update_me_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<UserProfileUpdateRequest>,
) -> Response {
    let result = require_user(&state, &headers)
        .and_then(|user| services::update_profile(&state, user.id.as_str(), req));
    respond(&state, &headers, result)
}

pub(crate) async fn me_wallet(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let result =
        require_user(&state, &headers).and_then(|user| services::wallet(&state, user.id.as_str()));
    respond(&state, &headers, result)
}

pub(crate) async fn my_loans(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let result = require_user(&state, &headers)
        .and_then(|user| services::loans_for_user(&state, user.id.as_str()));
    respond(&state, &headers, result)
}

pub(crate) async fn apply_loan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoanApplicationRequest>,
) -> Response {
    let result = require_user(&state, &headers)
        .and_then(|user| services::apply_loan(&state, user.id.as_str(), &req));
    respond(&state, &headers, result)
}

pub(crate) async fn my_withdrawals(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let result = require_user(&state, &headers)
        .and_then(|user| services::withdrawals_for_user(&state, user.id.as_str()));
    respond(&state, &headers, result)
}

pub(crate) async fn request_withdrawal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<WithdrawalCreateRequest>,
) -> Response {
    let result = require_user(&state, &headers)
        .and_then(|user| services::request_withdrawal(&state, user.id.as_str(), &req));
    respond(&state, &headers, result)
}

/// Poll fallback for the socket presence feed; clients call this every
/// `presence_poll_interval` as a correction mechanism.
pub(crate) async fn my_presence(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let result = require_user(&state, &headers)
        .and_then(|user| services::user_presence(&state, user.id.as_str()));
    respond(&state, &headers, result)
}

// --- admin: users ----------------------------------------------------------

pub(crate) async fn list_users(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let result = require_admin(&state, &headers)
        .and_then(|admin| ensure_manage_users(&admin).map(|()| admin))
        .and_then(|_| services::list_users(&state));
    respond(&state, &headers, result)
}

pub(crate) async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<UserCreateRequest>,
) -> Response {
    let result = require_admin(&state, &headers)
        .and_then(|admin| ensure_manage_users(&admin).map(|()| admin))
        .and_then(|_| services::create_user(&state, &req));
    respond(&state, &headers, result)
}

pub(crate) async fn get_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let result = require_admin(&state, &headers)
        .and_then(|admin| ensure_manage_users(&admin).map(|()| admin))
        .and_then(|_| services::me_profile(&state, &id));
    respond(&state, &headers, result)
}

pub(crate) async fn update_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<UserProfileUpdateRequest>,
) -> Response {
    let result = require_admin(&state, &headers)
        .and_then(|admin| ensure_manage_users(&admin).map(|()| admin))
        .and_then(|_| services::update_profile(&state, &id, req));
    respond(&state, &headers, result)
}

pub(crate) async fn delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let result = require_admin(&state, &headers)
        .and_then(|admin| ensure_manage_users(&admin).map(|()| admin))
        .and_then(|_| services::delete_user(&state, &id));
    respond(&state, &headers, result)
}

pub(crate) async fn user_presence(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let result = require_admin(&state, &headers)
        .and_then(|admin| ensure_manage_users(&admin).map(|()| admin))
        .and_then(|_| services::user_presence(&state, &id));
    respond(&state, &headers, result)
}

// --- admin: loans ----------------------------------------------------------

pub(crate) async fn list_loans(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let result = require_admin(&state, &headers)
        .and_then(|admin| ensure_manage_loans(&admin).map(|()| admin))
        .and_then(|_| services::list_loans(&state));
    respond(&state, &headers, result)
}

pub(crate) async fn get_loan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let result = require_admin(&state, &headers)
        .and_then(|admin| ensure_manage_loans(&admin).map(|()| admin))
        .and_then(|_| services::get_loan(&state, &id));
    respond(&state, &headers, result)
}

pub(crate) async fn delete_loan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let result = require_admin(&state, &headers)
        .and_then(|admin| ensure_manage_loans(&admin).map(|()| admin))
        .and_then(|_| services::delete_loan(&state, &id));
    respond(&state, &headers, result)
}

pub(crate) async fn update_loan_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<LoanStatusUpdateRequest>,
) -> Response {
    let result = require_admin(&state, &headers)
        .and_then(|admin| ensure_manage_loans(&admin).map(|()| admin))
        .and_then(|_| services::update_loan_status(&state, &id, &req));
    respond(&state, &headers, result)
}

// --- admin: withdrawals / transactions -------------------------------------

pub(crate) async fn list_withdrawals(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let result = require_admin(&state, &headers)
        .and_then(|admin| ensure_manage_loans(&admin).map(|()| admin))
        .and_then(|_| services::list_withdrawals(&state));
    respond(&state, &headers, result)
}

pub(crate) async fn resolve_withdrawal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<WithdrawalResolveRequest>,
) -> Response {
    let result = require_admin(&state, &headers)
        .and_then(|admin| ensure_manage_loans(&admin).map(|()| admin))
        .and_then(|_| services::resolve_withdrawal(&state, &id, req));
    respond(&state, &headers, result)
}

pub(crate) async fn list_transactions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let result = require_admin(&state, &headers)
        .and_then(|admin| ensure_manage_loans(&admin).map(|()| admin))
        .and_then(|_| services::list_transactions(&state));
    respond(&state, &headers, result)
}

// --- admin: interest rates (superadmin) ------------------------------------

pub(crate) async fn list_rates(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let result = require_admin(&state, &headers)
        .and_then(|admin| ensure_manage_loans(&admin).map(|()| admin))
        .and_then(|_| services::list_rates(&state));
    respond(&state, &headers, result)
}

pub(crate) async fn create_rate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<InterestRateUpsertRequest>,
) -> Response {
    let result = require_admin(&state, &headers)
        .and_then(|admin| ensure_superadmin(&admin).map(|()| admin))
        .and_then(|_| services::create_rate(&state, &req));
    respond(&state, &headers, result)
}

pub(crate) async fn update_rate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<InterestRateUpsertRequest>,
) -> Response {
    let result = require_admin(&state, &headers)
        .and_then(|admin| ensure_superadmin(&admin).map(|()| admin))
        .and_then(|_| services::update_rate(&state, &id, &req));
    respond(&state, &headers, result)
}

pub(crate) async fn delete_rate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let result = require_admin(&state, &headers)
        .and_then(|admin| ensure_superadmin(&admin).map(|()| admin))
        .and_then(|_| services::delete_rate(&state, &id));
    respond(&state, &headers, result)
}

// --- admin: admin accounts (superadmin) ------------------------------------

pub(crate) async fn list_admins(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let result = require_admin(&state, &headers)
        .and_then(|admin| ensure_superadmin(&admin).map(|()| admin))
        .and_then(|_| services::list_admins(&state));
    respond(&state, &headers, result)
}

pub(crate) async fn create_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<AdminCreateRequest>,
) -> Response {
    let result = require_admin(&state, &headers)
        .and_then(|admin| ensure_superadmin(&admin).map(|()| admin))
        .and_then(|_| services::create_admin(&state, &req));
    respond(&state, &headers, result)
}

pub(crate) async fn delete_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let result = require_admin(&state, &headers)
        .and_then(|admin| ensure_superadmin(&admin).map(|()| admin))
        .and_then(|acting| {
            if acting.id.as_str() == id {
                Err(lendhub_api::ApiError::forbidden(
                    "an admin cannot delete their own account",
                ))
            } else {
                services::delete_admin(&state, &id)
            }
        });
    respond(&state, &headers, result)
}
