#![forbid(unsafe_code)]
//! Lendhub domain model SSOT.
//!
//! Status tokens are the exact strings stored by the deployed system; they
//! are pinned by serde contract tests and must never be renamed.

mod ids;
mod money;
mod records;
mod status;

pub use ids::{
    AdminId, LoanId, ParseError, RateId, TransactionId, UserId, WithdrawalId, ID_MAX_LEN,
};
pub use money::{Amount, Rate, TermMonths, DEFAULT_RATE};
pub use records::{
    Admin, AdminPermissions, BankAccount, FamilyContact, InterestRate, Loan, Transaction, User,
    UserAddress, Wallet, Withdrawal, NAME_MAX_LEN,
};
pub use status::{
    AdminRole, LoanStatus, PaymentMethod, TransactionKind, TransactionStatus, WithdrawalState,
};

pub const CRATE_NAME: &str = "lendhub-model";
