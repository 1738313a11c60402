// SPDX-License-Identifier: Apache-2.0

use crate::dto::{
    AdminDto, InterestRateDto, LoanDto, PresenceDto, QuoteDto, RateSourceDto, TransactionDto,
    UserDto, WalletDto, WithdrawalDto,
};
use chrono::{DateTime, Utc};
use lendhub_core::{LoanQuote, PresenceLevel, PresenceSignals, RateQuote, RateSource};
use lendhub_model::{
    Admin, Amount, InterestRate, Loan, TermMonths, Transaction, User, Wallet, Withdrawal,
};

/// The admin-roster view; the password hash never leaves the model layer.
#[must_use]
pub fn admin_dto(admin: &Admin) -> AdminDto {
    AdminDto {
        id: admin.id.as_str().to_string(),
        name: admin.name.clone(),
        phone: admin.phone.clone(),
        email: admin.email.clone(),
        role: admin.role,
        permissions: admin.permissions,
        created_at: admin.created_at,
        updated_at: admin.updated_at,
    }
}

#[must_use]
pub fn wallet_dto(wallet: &Wallet) -> WalletDto {
    WalletDto {
        available_balance: wallet.available_balance.display_value(),
        approved_loan_amount: wallet.approved_loan_amount.display_value(),
        pending_withdrawals: wallet.pending_withdrawals.display_value(),
    }
}

/// The borrower/admin view of a user record. The password hash never leaves
/// the model layer.
#[must_use]
pub fn user_dto(user: &User) -> UserDto {
    UserDto {
        id: user.id.as_str().to_string(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        phone: user.phone.clone(),
        citizen_id: user.citizen_id.clone(),
        email: user.email.clone(),
        address: user.address.clone(),
        bank_account: user.bank_account.clone(),
        family_contact: user.family_contact.clone(),
        documents: user.documents.clone(),
        wallet: wallet_dto(&user.wallet),
        is_online: user.is_online,
        last_seen_at: user.last_seen_at,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

#[must_use]
pub fn loan_dto(loan: &Loan) -> LoanDto {
    LoanDto {
        id: loan.id.as_str().to_string(),
        user_id: loan.user_id.as_str().to_string(),
        amount: loan.amount.display_value(),
        term: loan.term.months(),
        status: loan.status,
        monthly_payment: loan.monthly_payment.display_value(),
        total_payment: loan.total_payment.display_value(),
        applied_rate: loan.applied_rate.value(),
        created_at: loan.created_at,
        updated_at: loan.updated_at,
    }
}

#[must_use]
pub fn withdrawal_dto(withdrawal: &Withdrawal) -> WithdrawalDto {
    WithdrawalDto {
        id: withdrawal.id.as_str().to_string(),
        user_id: withdrawal.user_id.as_str().to_string(),
        amount: withdrawal.amount.display_value(),
        state: withdrawal.state.clone(),
        bank_account: withdrawal.bank_account.clone(),
        transaction_id: withdrawal
            .transaction_id
            .as_ref()
            .map(|id| id.as_str().to_string()),
        created_at: withdrawal.created_at,
        updated_at: withdrawal.updated_at,
    }
}

#[must_use]
pub fn transaction_dto(transaction: &Transaction) -> TransactionDto {
    TransactionDto {
        id: transaction.id.as_str().to_string(),
        user_id: transaction.user_id.as_str().to_string(),
        kind: transaction.kind,
        amount: transaction.amount.display_value(),
        status: transaction.status,
        payment_method: transaction.payment_method,
        loan_id: transaction.loan_id.as_ref().map(|id| id.as_str().to_string()),
        created_at: transaction.created_at,
        updated_at: transaction.updated_at,
    }
}

#[must_use]
pub fn interest_rate_dto(rate: &InterestRate) -> InterestRateDto {
    InterestRateDto {
        id: rate.id.as_str().to_string(),
        term: rate.term.months(),
        rate: rate.rate.value(),
        is_active: rate.is_active,
        created_at: rate.created_at,
        updated_at: rate.updated_at,
    }
}

#[must_use]
pub fn quote_dto(
    amount: Amount,
    term: TermMonths,
    rate_quote: &RateQuote,
    loan_quote: &LoanQuote,
) -> QuoteDto {
    let (rate_source, rate_id) = match &rate_quote.source {
        RateSource::Matched { rate_id } => {
            (RateSourceDto::Matched, Some(rate_id.as_str().to_string()))
        }
        RateSource::Default => (RateSourceDto::Default, None),
    };
    QuoteDto {
        amount: amount.display_value(),
        term: term.months(),
        rate: rate_quote.rate.value(),
        rate_source,
        rate_id,
        total_interest: loan_quote.total_interest.display_value(),
        total_payment: loan_quote.total_payment.display_value(),
        monthly_payment: loan_quote.monthly_payment.display_value(),
    }
}

#[must_use]
pub fn presence_dto(
    level: PresenceLevel,
    signals: PresenceSignals,
    last_updated: Option<DateTime<Utc>>,
) -> PresenceDto {
    PresenceDto {
        level: level.label().to_string(),
        has_active_socket: signals.has_active_socket,
        has_any_socket: signals.has_any_socket,
        db_is_online: signals.db_is_online,
        socket_count: signals.socket_count,
        last_updated,
    }
}
