// SPDX-License-Identifier: Apache-2.0

use lendhub_model::{LoanStatus, WithdrawalState};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LifecycleError {
    InvalidLoanTransition { from: LoanStatus, to: LoanStatus },
    InvalidWithdrawalTransition { from: String, to: String },
    MissingReason(&'static str),
}

impl LifecycleError {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidLoanTransition { .. } | Self::InvalidWithdrawalTransition { .. } => {
                "invalid_transition"
            }
            Self::MissingReason(_) => "missing_reason",
        }
    }
}

impl Display for LifecycleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLoanTransition { from, to } => {
                write!(f, "loan cannot move from {from} to {to}")
            }
            Self::InvalidWithdrawalTransition { from, to } => {
                write!(f, "withdrawal cannot move from {from} to {to}")
            }
            Self::MissingReason(field) => write!(f, "{field} is required and must not be empty"),
        }
    }
}

impl std::error::Error for LifecycleError {}

/// Admin-driven loan transition graph. The legacy edit form allowed any
/// status to be written over any other; here only the graph below is legal
/// and every step still requires an explicit admin action — there is no
/// unattended lifecycle advancement.
///
/// Pending → Approved | Rejected
/// Approved → Disbursed | Rejected
/// Disbursed → Completed | Defaulted
/// Rejected / Completed / Defaulted → (terminal)
pub fn loan_transition(from: LoanStatus, to: LoanStatus) -> Result<LoanStatus, LifecycleError> {
    use LoanStatus::{Approved, Completed, Defaulted, Disbursed, Pending, Rejected};
    let allowed = matches!(
        (from, to),
        (Pending, Approved)
            | (Pending, Rejected)
            | (Approved, Disbursed)
            | (Approved, Rejected)
            | (Disbursed, Completed)
            | (Disbursed, Defaulted)
    );
    if allowed {
        Ok(to)
    } else {
        Err(LifecycleError::InvalidLoanTransition { from, to })
    }
}

/// Admin input resolving a withdrawal. Terminal failure outcomes carry their
/// reason here, so the reason requirement is checked before any state exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawalResolution {
    Approve,
    Complete,
    Reject { reason: String },
    Fail { reason: String },
}

impl WithdrawalResolution {
    fn target_token(&self) -> &'static str {
        match self {
            Self::Approve => "อนุมัติแล้ว",
            Self::Complete => "เสร็จสิ้น",
            Self::Reject { .. } => "ปฏิเสธ",
            Self::Fail { .. } => "ล้มเหลว",
        }
    }
}

/// Applies an admin resolution to the current withdrawal state.
///
/// Pending → Approved | Rejected{reason} | Failed{reason}
/// Approved → Completed | Failed{reason}
/// Completed / Rejected / Failed → (terminal)
pub fn resolve_withdrawal(
    current: &WithdrawalState,
    resolution: WithdrawalResolution,
) -> Result<WithdrawalState, LifecycleError> {
    let invalid = || LifecycleError::InvalidWithdrawalTransition {
        from: current.token().to_string(),
        to: resolution.target_token().to_string(),
    };
    match (&current, &resolution) {
        (WithdrawalState::Pending, WithdrawalResolution::Approve) => Ok(WithdrawalState::Approved),
        (WithdrawalState::Pending, WithdrawalResolution::Reject { reason }) => {
            non_empty(reason, "rejectionReason")?;
            Ok(WithdrawalState::Rejected {
                rejection_reason: reason.trim().to_string(),
            })
        }
        (
            WithdrawalState::Pending | WithdrawalState::Approved,
            WithdrawalResolution::Fail { reason },
        ) => {
            non_empty(reason, "failureReason")?;
            Ok(WithdrawalState::Failed {
                failure_reason: reason.trim().to_string(),
            })
        }
        (WithdrawalState::Approved, WithdrawalResolution::Complete) => {
            Ok(WithdrawalState::Completed)
        }
        _ => Err(invalid()),
    }
}

fn non_empty(reason: &str, field: &'static str) -> Result<(), LifecycleError> {
    if reason.trim().is_empty() {
        Err(LifecycleError::MissingReason(field))
    } else {
        Ok(())
    }
}
