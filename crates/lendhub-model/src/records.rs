// SPDX-License-Identifier: Apache-2.0

use crate::ids::{AdminId, LoanId, RateId, TransactionId, UserId, WithdrawalId};
use crate::money::{Amount, Rate, TermMonths};
use crate::status::{
    AdminRole, LoanStatus, PaymentMethod, TransactionKind, TransactionStatus, WithdrawalState,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const NAME_MAX_LEN: usize = 256;

/// One row of the interest-rate table. `term` is the lookup key; uniqueness
/// among active rows is enforced at the write path, not by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InterestRate {
    pub id: RateId,
    pub term: TermMonths,
    pub rate: Rate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Loan {
    pub id: LoanId,
    pub user_id: UserId,
    pub amount: Amount,
    pub term: TermMonths,
    pub status: LoanStatus,
    pub monthly_payment: Amount,
    pub total_payment: Amount,
    pub applied_rate: Rate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BankAccount {
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FamilyContact {
    pub name: String,
    pub phone: String,
    pub relationship: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserAddress {
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub district: String,
    pub province: String,
    pub postal_code: String,
}

/// Borrower wallet. Balances are mutated only through the admin loan flow and
/// the withdrawal flow; both paths go through `minus`/`plus` on `Amount`, so
/// a negative balance is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Wallet {
    pub available_balance: Amount,
    pub approved_loan_amount: Amount,
    pub pending_withdrawals: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub password_hash: String,
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
    pub documents: Vec<String>,
    #[serde(default)]
    pub wallet: Wallet,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub last_seen_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Withdrawal request. The lifecycle state is flattened so the stored
/// document keeps the original flat `status` + reason-field layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    pub id: WithdrawalId,
    pub user_id: UserId,
    pub amount: Amount,
    #[serde(flatten)]
    pub state: WithdrawalState,
    /// Snapshot of the borrower's bank account at request time.
    pub bank_account: BankAccount,
    #[serde(default)]
    pub transaction_id: Option<TransactionId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub kind: TransactionKind,
    pub amount: Amount,
    pub status: TransactionStatus,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub loan_id: Option<LoanId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdminPermissions {
    pub manage_users: bool,
    pub manage_loans: bool,
}

impl AdminPermissions {
    #[must_use]
    pub const fn all() -> Self {
        Self {
            manage_users: true,
            manage_loans: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Admin {
    pub id: AdminId,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub password_hash: String,
    pub role: AdminRole,
    pub permissions: AdminPermissions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    /// Superadmin implies every permission regardless of the stored flags.
    #[must_use]
    pub fn can_manage_users(&self) -> bool {
        self.role.is_super() || self.permissions.manage_users
    }

    #[must_use]
    pub fn can_manage_loans(&self) -> bool {
        self.role.is_super() || self.permissions.manage_loans
    }
}
