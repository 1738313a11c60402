// SPDX-License-Identifier: Apache-2.0

use crate::errors::ApiError;
use chrono::{DateTime, Utc};
use lendhub_core::WithdrawalResolution;
use lendhub_model::{
    AdminPermissions, AdminRole, Amount, BankAccount, FamilyContact, LoanStatus, PaymentMethod,
    TermMonths, TransactionKind, TransactionStatus, UserAddress, WithdrawalState, NAME_MAX_LEN,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

fn require_positive(amount: Decimal, field: &str) -> Result<Amount, ApiError> {
    let parsed =
        Amount::parse(amount).map_err(|_| ApiError::invalid_param(field, "must not be negative"))?;
    if parsed.is_zero() {
        return Err(ApiError::invalid_param(field, "must be greater than zero"));
    }
    Ok(parsed)
}

fn require_name(value: &str, field: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::invalid_param(field, "must not be empty"));
    }
    if trimmed.len() > NAME_MAX_LEN {
        return Err(ApiError::invalid_param(field, "too long"));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoanApplicationRequest {
    pub amount: Decimal,
    pub term: i64,
}

impl LoanApplicationRequest {
    pub fn validated(&self) -> Result<(Amount, TermMonths), ApiError> {
        let amount = require_positive(self.amount, "amount")?;
        let term = TermMonths::parse(self.term)
            .map_err(|_| ApiError::invalid_param("term", "must be a positive number of months"))?;
        Ok((amount, term))
    }
}

/// Quote preview query: `GET /api/quotes?amount=...&term=...`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QuoteParams {
    pub amount: Decimal,
    pub term: i64,
}

impl QuoteParams {
    pub fn validated(&self) -> Result<(Amount, TermMonths), ApiError> {
        let amount = require_positive(self.amount, "amount")?;
        let term = TermMonths::parse(self.term)
            .map_err(|_| ApiError::invalid_param("term", "must be a positive number of months"))?;
        Ok((amount, term))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoanStatusUpdateRequest {
    pub status: LoanStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WithdrawalCreateRequest {
    pub amount: Decimal,
}

impl WithdrawalCreateRequest {
    pub fn validated(&self) -> Result<Amount, ApiError> {
        require_positive(self.amount, "amount")
    }
}

/// Admin withdrawal resolution: the target status token plus the reason
/// field matching that status. Reason presence is enforced downstream by the
/// lifecycle rules, so a missing reason surfaces as `missing_reason` rather
/// than a generic validation error.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WithdrawalResolveRequest {
    pub status: String,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub failure_reason: Option<String>,
}

impl WithdrawalResolveRequest {
    pub fn into_resolution(self) -> Result<WithdrawalResolution, ApiError> {
        match self.status.as_str() {
            "อนุมัติแล้ว" => Ok(WithdrawalResolution::Approve),
            "เสร็จสิ้น" => Ok(WithdrawalResolution::Complete),
            "ปฏิเสธ" => Ok(WithdrawalResolution::Reject {
                reason: self.rejection_reason.unwrap_or_default(),
            }),
            "ล้มเหลว" => Ok(WithdrawalResolution::Fail {
                reason: self.failure_reason.unwrap_or_default(),
            }),
            other => Err(ApiError::invalid_param(
                "status",
                &format!("unknown withdrawal status: {other}"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InterestRateUpsertRequest {
    pub term: i64,
    pub rate: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl InterestRateUpsertRequest {
    pub fn validated(&self) -> Result<(TermMonths, lendhub_model::Rate), ApiError> {
        let term = TermMonths::parse(self.term)
            .map_err(|_| ApiError::invalid_param("term", "must be a positive number of months"))?;
        let rate = lendhub_model::Rate::parse(self.rate).map_err(|_| {
            ApiError::invalid_param("rate", "must be a decimal fraction in [0, 1)")
        })?;
        Ok((term, rate))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserCreateRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub password: String,
    #[serde(default)]
    pub citizen_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserCreateRequest {
    pub fn validated(&self) -> Result<(), ApiError> {
        let mut field_errors = Vec::new();
        for (field, value) in [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("phone", &self.phone),
        ] {
            if let Err(err) = require_name(value, field) {
                field_errors.push(json!({"field": field, "reason": err.message}));
            }
        }
        if self.password.len() < 8 {
            field_errors.push(json!({"field": "password", "reason": "minimum 8 characters"}));
        }
        if field_errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_failed(json!(field_errors)))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserProfileUpdateRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub citizen_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<UserAddress>,
    #[serde(default)]
    pub bank_account: Option<BankAccount>,
    #[serde(default)]
    pub family_contact: Option<FamilyContact>,
    #[serde(default)]
    pub documents: Option<Vec<String>>,
}

impl UserProfileUpdateRequest {
    /// Applies the submitted fields to the record; absent fields are left
    /// untouched. Returns whether anything changed.
    pub fn apply_to(self, user: &mut lendhub_model::User) -> Result<bool, ApiError> {
        let mut changed = false;
        if let Some(first_name) = self.first_name {
            user.first_name = require_name(&first_name, "firstName")?;
            changed = true;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = require_name(&last_name, "lastName")?;
            changed = true;
        }
        if let Some(citizen_id) = self.citizen_id {
            user.citizen_id = Some(citizen_id);
            changed = true;
        }
        if let Some(email) = self.email {
            user.email = Some(email);
            changed = true;
        }
        if let Some(address) = self.address {
            user.address = Some(address);
            changed = true;
        }
        if let Some(bank_account) = self.bank_account {
            user.bank_account = Some(bank_account);
            changed = true;
        }
        if let Some(family_contact) = self.family_contact {
            user.family_contact = Some(family_contact);
            changed = true;
        }
        if let Some(documents) = self.documents {
            user.documents = documents;
            changed = true;
        }
        Ok(changed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserLoginRequest {
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdminCreateRequest {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub role: AdminRole,
    #[serde(default)]
    pub permissions: AdminPermissions,
}

impl AdminCreateRequest {
    pub fn validated(&self) -> Result<(), ApiError> {
        require_name(&self.name, "name")?;
        if !self.email.contains('@') {
            return Err(ApiError::invalid_param("email", "must be an email address"));
        }
        if self.password.len() < 8 {
            return Err(ApiError::invalid_param("password", "minimum 8 characters"));
        }
        Ok(())
    }
}

// --- Response DTOs ---------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WalletDto {
    pub available_balance: Decimal,
    pub approved_loan_amount: Decimal,
    pub pending_withdrawals: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserDto {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citizen_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<UserAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_account: Option<BankAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_contact: Option<FamilyContact>,
    #[serde(default)]
    pub documents: Vec<String>,
    pub wallet: WalletDto,
    pub is_online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoanDto {
    pub id: String,
    pub user_id: String,
    pub amount: Decimal,
    pub term: u32,
    pub status: LoanStatus,
    pub monthly_payment: Decimal,
    pub total_payment: Decimal,
    pub applied_rate: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalDto {
    pub id: String,
    pub user_id: String,
    pub amount: Decimal,
    #[serde(flatten)]
    pub state: WithdrawalState,
    pub bank_account: BankAccount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TransactionDto {
    pub id: String,
    pub user_id: String,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InterestRateDto {
    pub id: String,
    pub term: u32,
    /// Decimal fraction (0.0290 = 2.90%); display multiplication by 100 is a
    /// UI concern and never crosses this boundary.
    pub rate: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSourceDto {
    Matched,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QuoteDto {
    pub amount: Decimal,
    pub term: u32,
    pub rate: Decimal,
    pub rate_source: RateSourceDto,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_id: Option<String>,
    pub total_interest: Decimal,
    pub total_payment: Decimal,
    pub monthly_payment: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PresenceDto {
    pub level: String,
    pub has_active_socket: bool,
    pub has_any_socket: bool,
    pub db_is_online: bool,
    pub socket_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdminDto {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub role: AdminRole,
    pub permissions: AdminPermissions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AuthTokenDto {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub role: String,
}
