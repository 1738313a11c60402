// SPDX-License-Identifier: Apache-2.0

//! The operations behind every route. Handlers stay thin: authenticate,
//! deserialize, call in here, wrap the result in the envelope.

use crate::auth::{
    hash_password, issue_token, new_salt, verify_password, PrincipalKind, TokenClaims,
};
use crate::notify::NotificationEvent;
use crate::AppState;
use chrono::Utc;
use lendhub_api::{
    admin_dto, interest_rate_dto, loan_dto, presence_dto, quote_dto, transaction_dto, user_dto,
    wallet_dto, withdrawal_dto, AdminCreateRequest, AdminLoginRequest, ApiError, AuthTokenDto,
    InterestRateUpsertRequest, LoanApplicationRequest, LoanDto, LoanStatusUpdateRequest,
    PresenceDto, QuoteDto, UserCreateRequest, UserDto, UserLoginRequest,
    UserProfileUpdateRequest, WithdrawalCreateRequest, WithdrawalDto, WithdrawalResolveRequest,
};
use lendhub_core::{
    compute_loan, loan_transition, resolve_withdrawal as apply_resolution,
    validate_active_term_unique, RateTable,
};
use lendhub_model::{
    Admin, AdminId, Amount, InterestRate, Loan, LoanId, LoanStatus, PaymentMethod, RateId,
    TermMonths, Transaction, TransactionId, TransactionKind, TransactionStatus, User, UserId,
    Withdrawal, WithdrawalId, WithdrawalState,
};
use lendhub_store::StoreError;
use tracing::info;

pub(crate) fn store_err(err: StoreError) -> ApiError {
    if err.is_not_found() {
        ApiError::new(lendhub_api::ApiErrorCode::NotFound, err.message, serde_json::Value::Null)
    } else {
        ApiError::new(
            lendhub_api::ApiErrorCode::StoreUnavailable,
            err.to_string(),
            serde_json::Value::Null,
        )
    }
}

// --- auth ------------------------------------------------------------------

pub(crate) fn admin_login(
    state: &AppState,
    req: AdminLoginRequest,
) -> Result<AuthTokenDto, ApiError> {
    let admin = state
        .store
        .find_admin_by_email(req.email.trim())
        .map_err(store_err)?
        .ok_or_else(ApiError::unauthorized)?;
    if !verify_password(&req.password, &admin.password_hash) {
        return Err(ApiError::unauthorized());
    }
    let expires_at = Utc::now() + state.token_ttl();
    let claims = TokenClaims::new(admin.id.as_str(), PrincipalKind::Admin, expires_at);
    info!(admin = %admin.id, "admin login");
    Ok(AuthTokenDto {
        token: issue_token(&state.config.token_secret, &claims),
        expires_at,
        role: serde_json::to_value(admin.role)
            .ok()
            .and_then(|v| v.as_str().map(ToString::to_string))
            .unwrap_or_else(|| "admin".to_string()),
    })
}

pub(crate) fn user_login(
    state: &AppState,
    req: UserLoginRequest,
) -> Result<AuthTokenDto, ApiError> {
    let user = state
        .store
        .find_user_by_phone(req.phone.trim())
        .map_err(store_err)?
        .ok_or_else(ApiError::unauthorized)?;
    if !verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::unauthorized());
    }
    let expires_at = Utc::now() + state.token_ttl();
    let claims = TokenClaims::new(user.id.as_str(), PrincipalKind::User, expires_at);
    info!(user = %user.id, "user login");
    Ok(AuthTokenDto {
        token: issue_token(&state.config.token_secret, &claims),
        expires_at,
        role: "user".to_string(),
    })
}

// --- pricing ---------------------------------------------------------------

fn rate_table(state: &AppState) -> Result<RateTable, ApiError> {
    Ok(RateTable::new(
        state.store.list_interest_rates().map_err(store_err)?,
    ))
}

pub(crate) fn quote(
    state: &AppState,
    amount: Amount,
    term: TermMonths,
) -> Result<QuoteDto, ApiError> {
    let table = rate_table(state)?;
    let rate_quote = table.rate_for_term(term);
    let loan_quote = compute_loan(amount, term, rate_quote.rate)?;
    Ok(quote_dto(amount, term, &rate_quote, &loan_quote))
}

// --- borrower --------------------------------------------------------------

pub(crate) fn get_user(state: &AppState, user_id: &str) -> Result<User, ApiError> {
    state.store.get_user(user_id).map_err(store_err)
}

pub(crate) fn me_profile(state: &AppState, user_id: &str) -> Result<UserDto, ApiError> {
    Ok(user_dto(&get_user(state, user_id)?))
}

pub(crate) fn update_profile(
    state: &AppState,
    user_id: &str,
    req: UserProfileUpdateRequest,
) -> Result<UserDto, ApiError> {
    let mut user = get_user(state, user_id)?;
    if req.apply_to(&mut user)? {
        user.updated_at = Utc::now();
        state.store.put_user(&user).map_err(store_err)?;
    }
    Ok(user_dto(&user))
}

pub(crate) fn apply_loan(
    state: &AppState,
    user_id: &str,
    req: &LoanApplicationRequest,
) -> Result<LoanDto, ApiError> {
    let (amount, term) = req.validated()?;
    let user = get_user(state, user_id)?;
    // The borrower submits amount and term only; pricing always comes from
    // the rate table on the server side.
    let table = rate_table(state)?;
    let rate_quote = table.rate_for_term(term);
    let loan_quote = compute_loan(amount, term, rate_quote.rate)?;
    let now = Utc::now();
    let loan = Loan {
        id: LoanId::parse(&state.next_id("loan")).map_err(ApiError::from)?,
        user_id: user.id.clone(),
        amount,
        term,
        status: LoanStatus::Pending,
        monthly_payment: loan_quote.monthly_payment,
        total_payment: loan_quote.total_payment,
        applied_rate: rate_quote.rate,
        created_at: now,
        updated_at: now,
    };
    state.store.put_loan(&loan).map_err(store_err)?;
    info!(loan = %loan.id, user = %user.id, amount = %loan.amount, term = %loan.term, "loan application submitted");
    Ok(loan_dto(&loan))
}

pub(crate) fn loans_for_user(state: &AppState, user_id: &str) -> Result<Vec<LoanDto>, ApiError> {
    Ok(state
        .store
        .loans_for_user(user_id)
        .map_err(store_err)?
        .iter()
        .map(loan_dto)
        .collect())
}

pub(crate) fn request_withdrawal(
    state: &AppState,
    user_id: &str,
    req: &WithdrawalCreateRequest,
) -> Result<WithdrawalDto, ApiError> {
    let amount = req.validated()?;
    let mut user = get_user(state, user_id)?;
    let Some(bank_account) = user.bank_account.clone() else {
        return Err(ApiError::invalid_param(
            "bankAccount",
            "a bank account must be on file before requesting a withdrawal",
        ));
    };
    let Some(remaining) = user.wallet.available_balance.minus(amount) else {
        return Err(ApiError::insufficient_balance(
            &amount.display_value().to_string(),
            &user.wallet.available_balance.display_value().to_string(),
        ));
    };
    user.wallet.available_balance = remaining;
    user.wallet.pending_withdrawals = user.wallet.pending_withdrawals.plus(amount);
    let now = Utc::now();
    user.updated_at = now;
    let withdrawal = Withdrawal {
        id: WithdrawalId::parse(&state.next_id("wd")).map_err(ApiError::from)?,
        user_id: user.id.clone(),
        amount,
        state: WithdrawalState::Pending,
        bank_account,
        transaction_id: None,
        created_at: now,
        updated_at: now,
    };
    state.store.put_withdrawal(&withdrawal).map_err(store_err)?;
    state.store.put_user(&user).map_err(store_err)?;
    state.hub.publish(
        user.id.as_str(),
        NotificationEvent::BalanceChanged {
            available_balance: user.wallet.available_balance.display_value(),
        },
    );
    info!(withdrawal = %withdrawal.id, user = %user.id, amount = %withdrawal.amount, "withdrawal requested");
    Ok(withdrawal_dto(&withdrawal))
}

pub(crate) fn withdrawals_for_user(
    state: &AppState,
    user_id: &str,
) -> Result<Vec<WithdrawalDto>, ApiError> {
    Ok(state
        .store
        .withdrawals_for_user(user_id)
        .map_err(store_err)?
        .iter()
        .map(withdrawal_dto)
        .collect())
}

/// Presence snapshot for the poll path. The persisted online flag is only
/// trusted while `last_seen_at` is fresh; a socket that died without an
/// event stops reporting "online" once the staleness window passes.
pub(crate) fn user_presence(state: &AppState, user_id: &str) -> Result<PresenceDto, ApiError> {
    let user = get_user(state, user_id)?;
    let mut signals = state.presence.signals(user_id, user.is_online);
    if !signals.has_any_socket && signals.db_is_online {
        let stale = user
            .last_seen_at
            .map_or(true, |seen| Utc::now() - seen > state.presence_staleness());
        if stale {
            signals.db_is_online = false;
        }
    }
    Ok(presence_dto(signals.level(), signals, user.last_seen_at))
}

// --- admin: users ----------------------------------------------------------

pub(crate) fn create_user(
    state: &AppState,
    req: &UserCreateRequest,
) -> Result<UserDto, ApiError> {
    req.validated()?;
    if state
        .store
        .find_user_by_phone(req.phone.trim())
        .map_err(store_err)?
        .is_some()
    {
        return Err(ApiError::new(
            lendhub_api::ApiErrorCode::Conflict,
            "a user with this phone number already exists",
            serde_json::json!({"field": "phone"}),
        ));
    }
    let now = Utc::now();
    let salt = new_salt(state.next_seed(), now);
    let user = User {
        id: UserId::parse(&state.next_id("user")).map_err(ApiError::from)?,
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        phone: req.phone.trim().to_string(),
        password_hash: hash_password(&req.password, &salt),
        citizen_id: req.citizen_id.clone(),
        email: req.email.clone(),
        address: None,
        bank_account: None,
        family_contact: None,
        documents: Vec::new(),
        wallet: lendhub_model::Wallet::default(),
        is_online: false,
        last_seen_at: None,
        created_at: now,
        updated_at: now,
    };
    state.store.put_user(&user).map_err(store_err)?;
    info!(user = %user.id, "user created");
    Ok(user_dto(&user))
}

pub(crate) fn list_users(state: &AppState) -> Result<Vec<UserDto>, ApiError> {
    Ok(state
        .store
        .list_users()
        .map_err(store_err)?
        .iter()
        .map(user_dto)
        .collect())
}

pub(crate) fn delete_user(state: &AppState, user_id: &str) -> Result<(), ApiError> {
    state.store.delete_user(user_id).map_err(store_err)
}

// --- admin: loans ----------------------------------------------------------

pub(crate) fn list_loans(state: &AppState) -> Result<Vec<LoanDto>, ApiError> {
    Ok(state
        .store
        .list_loans()
        .map_err(store_err)?
        .iter()
        .map(loan_dto)
        .collect())
}

pub(crate) fn get_loan(state: &AppState, loan_id: &str) -> Result<LoanDto, ApiError> {
    Ok(loan_dto(&state.store.get_loan(loan_id).map_err(store_err)?))
}

pub(crate) fn delete_loan(state: &AppState, loan_id: &str) -> Result<(), ApiError> {
    state.store.delete_loan(loan_id).map_err(store_err)
}

/// Admin status change with the wallet side effects of the loan lifecycle:
/// approval credits the borrower's wallet, disbursement writes the ledger
/// row. Both are notified to the borrower over the socket channel.
pub(crate) fn update_loan_status(
    state: &AppState,
    loan_id: &str,
    req: &LoanStatusUpdateRequest,
) -> Result<LoanDto, ApiError> {
    let mut loan = state.store.get_loan(loan_id).map_err(store_err)?;
    let next = loan_transition(loan.status, req.status)?;
    let now = Utc::now();
    loan.status = next;
    loan.updated_at = now;

    match next {
        LoanStatus::Approved => {
            let mut user = get_user(state, loan.user_id.as_str())?;
            user.wallet.approved_loan_amount = user.wallet.approved_loan_amount.plus(loan.amount);
            user.wallet.available_balance = user.wallet.available_balance.plus(loan.amount);
            user.updated_at = now;
            state.store.put_user(&user).map_err(store_err)?;
            state.hub.publish(
                user.id.as_str(),
                NotificationEvent::BalanceChanged {
                    available_balance: user.wallet.available_balance.display_value(),
                },
            );
        }
        LoanStatus::Disbursed => {
            let transaction = Transaction {
                id: TransactionId::parse(&state.next_id("txn")).map_err(ApiError::from)?,
                user_id: loan.user_id.clone(),
                kind: TransactionKind::Deposit,
                amount: loan.amount,
                status: TransactionStatus::Completed,
                payment_method: PaymentMethod::BankTransfer,
                loan_id: Some(loan.id.clone()),
                created_at: now,
                updated_at: now,
            };
            state.store.put_transaction(&transaction).map_err(store_err)?;
        }
        _ => {}
    }

    state.store.put_loan(&loan).map_err(store_err)?;
    state.hub.publish(
        loan.user_id.as_str(),
        NotificationEvent::LoanStatusChanged {
            loan_id: loan.id.as_str().to_string(),
            status: loan.status,
        },
    );
    info!(loan = %loan.id, status = %loan.status, "loan status updated");
    Ok(loan_dto(&loan))
}

// --- admin: withdrawals ----------------------------------------------------

pub(crate) fn list_withdrawals(state: &AppState) -> Result<Vec<WithdrawalDto>, ApiError> {
    Ok(state
        .store
        .list_withdrawals()
        .map_err(store_err)?
        .iter()
        .map(withdrawal_dto)
        .collect())
}

/// Applies an admin resolution. Rejection and failure both return the held
/// funds to the wallet (the money never left); completion clears the pending
/// amount and writes the ledger row.
pub(crate) fn resolve_withdrawal(
    state: &AppState,
    withdrawal_id: &str,
    req: WithdrawalResolveRequest,
) -> Result<WithdrawalDto, ApiError> {
    let mut withdrawal = state.store.get_withdrawal(withdrawal_id).map_err(store_err)?;
    let resolution = req.into_resolution()?;
    let next = apply_resolution(&withdrawal.state, resolution)?;
    let now = Utc::now();

    let mut user = get_user(state, withdrawal.user_id.as_str())?;
    let mut balance_changed = false;
    match &next {
        WithdrawalState::Rejected { .. } | WithdrawalState::Failed { .. } => {
            user.wallet.pending_withdrawals = user
                .wallet
                .pending_withdrawals
                .minus(withdrawal.amount)
                .unwrap_or(Amount::ZERO);
            user.wallet.available_balance = user.wallet.available_balance.plus(withdrawal.amount);
            balance_changed = true;
        }
        WithdrawalState::Completed => {
            user.wallet.pending_withdrawals = user
                .wallet
                .pending_withdrawals
                .minus(withdrawal.amount)
                .unwrap_or(Amount::ZERO);
            let transaction = Transaction {
                id: TransactionId::parse(&state.next_id("txn")).map_err(ApiError::from)?,
                user_id: withdrawal.user_id.clone(),
                kind: TransactionKind::Withdrawal,
                amount: withdrawal.amount,
                status: TransactionStatus::Completed,
                payment_method: PaymentMethod::BankTransfer,
                loan_id: None,
                created_at: now,
                updated_at: now,
            };
            state.store.put_transaction(&transaction).map_err(store_err)?;
            withdrawal.transaction_id = Some(transaction.id);
            balance_changed = true;
        }
        WithdrawalState::Pending | WithdrawalState::Approved => {}
    }

    withdrawal.state = next;
    withdrawal.updated_at = now;
    user.updated_at = now;
    state.store.put_withdrawal(&withdrawal).map_err(store_err)?;
    state.store.put_user(&user).map_err(store_err)?;

    state.hub.publish(
        withdrawal.user_id.as_str(),
        NotificationEvent::WithdrawalResolved {
            withdrawal_id: withdrawal.id.as_str().to_string(),
            status: withdrawal.state.token().to_string(),
            reason: withdrawal.state.reason().map(ToString::to_string),
        },
    );
    if balance_changed {
        state.hub.publish(
            withdrawal.user_id.as_str(),
            NotificationEvent::BalanceChanged {
                available_balance: user.wallet.available_balance.display_value(),
            },
        );
    }
    info!(withdrawal = %withdrawal.id, status = %withdrawal.state, "withdrawal resolved");
    Ok(withdrawal_dto(&withdrawal))
}

// --- admin: transactions ---------------------------------------------------

pub(crate) fn list_transactions(
    state: &AppState,
) -> Result<Vec<lendhub_api::TransactionDto>, ApiError> {
    Ok(state
        .store
        .list_transactions()
        .map_err(store_err)?
        .iter()
        .map(transaction_dto)
        .collect())
}

// --- admin: interest rates -------------------------------------------------

pub(crate) fn list_rates(state: &AppState) -> Result<Vec<lendhub_api::InterestRateDto>, ApiError> {
    Ok(state
        .store
        .list_interest_rates()
        .map_err(store_err)?
        .iter()
        .map(interest_rate_dto)
        .collect())
}

pub(crate) fn create_rate(
    state: &AppState,
    req: &InterestRateUpsertRequest,
) -> Result<lendhub_api::InterestRateDto, ApiError> {
    let (term, rate) = req.validated()?;
    let existing = state.store.list_interest_rates().map_err(store_err)?;
    if req.is_active {
        validate_active_term_unique(&existing, term, None)?;
    }
    let now = Utc::now();
    let record = InterestRate {
        id: RateId::parse(&state.next_id("rate")).map_err(ApiError::from)?,
        term,
        rate,
        is_active: req.is_active,
        created_at: now,
        updated_at: now,
    };
    state.store.put_interest_rate(&record).map_err(store_err)?;
    info!(rate = %record.id, term = %record.term, value = %record.rate, "interest rate created");
    Ok(interest_rate_dto(&record))
}

pub(crate) fn update_rate(
    state: &AppState,
    rate_id: &str,
    req: &InterestRateUpsertRequest,
) -> Result<lendhub_api::InterestRateDto, ApiError> {
    let (term, rate) = req.validated()?;
    let mut record = state.store.get_interest_rate(rate_id).map_err(store_err)?;
    let existing = state.store.list_interest_rates().map_err(store_err)?;
    if req.is_active {
        validate_active_term_unique(&existing, term, Some(&record.id))?;
    }
    record.term = term;
    record.rate = rate;
    record.is_active = req.is_active;
    record.updated_at = Utc::now();
    state.store.put_interest_rate(&record).map_err(store_err)?;
    Ok(interest_rate_dto(&record))
}

pub(crate) fn delete_rate(state: &AppState, rate_id: &str) -> Result<(), ApiError> {
    state.store.delete_interest_rate(rate_id).map_err(store_err)
}

// --- admin: admins ---------------------------------------------------------

pub(crate) fn list_admins(state: &AppState) -> Result<Vec<lendhub_api::AdminDto>, ApiError> {
    Ok(state
        .store
        .list_admins()
        .map_err(store_err)?
        .iter()
        .map(admin_dto)
        .collect())
}

pub(crate) fn create_admin(
    state: &AppState,
    req: &AdminCreateRequest,
) -> Result<lendhub_api::AdminDto, ApiError> {
    req.validated()?;
    if state
        .store
        .find_admin_by_email(req.email.trim())
        .map_err(store_err)?
        .is_some()
    {
        return Err(ApiError::new(
            lendhub_api::ApiErrorCode::Conflict,
            "an admin with this email already exists",
            serde_json::json!({"field": "email"}),
        ));
    }
    let now = Utc::now();
    let salt = new_salt(state.next_seed(), now);
    let admin = Admin {
        id: AdminId::parse(&state.next_id("admin")).map_err(ApiError::from)?,
        name: req.name.trim().to_string(),
        phone: req.phone.trim().to_string(),
        email: req.email.trim().to_string(),
        password_hash: hash_password(&req.password, &salt),
        role: req.role,
        permissions: req.permissions,
        created_at: now,
        updated_at: now,
    };
    state.store.put_admin(&admin).map_err(store_err)?;
    info!(admin = %admin.id, "admin created");
    Ok(admin_dto(&admin))
}

pub(crate) fn delete_admin(state: &AppState, admin_id: &str) -> Result<(), ApiError> {
    state.store.delete_admin(admin_id).map_err(store_err)
}

pub(crate) fn wallet(state: &AppState, user_id: &str) -> Result<lendhub_api::WalletDto, ApiError> {
    Ok(wallet_dto(&get_user(state, user_id)?.wallet))
}
