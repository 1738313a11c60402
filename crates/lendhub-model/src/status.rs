// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Loan lifecycle status. The serialized tokens are the literal strings the
/// deployed system stores; compatibility with existing documents depends on
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanStatus {
    #[serde(rename = "รอการอนุมัติ")]
    Pending,
    #[serde(rename = "อนุมัติแล้ว")]
    Approved,
    #[serde(rename = "ปฏิเสธ")]
    Rejected,
    #[serde(rename = "จ่ายเงินแล้ว")]
    Disbursed,
    #[serde(rename = "เสร็จสิ้น")]
    Completed,
    #[serde(rename = "ผิดนัด")]
    Defaulted,
}

impl LoanStatus {
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Pending => "รอการอนุมัติ",
            Self::Approved => "อนุมัติแล้ว",
            Self::Rejected => "ปฏิเสธ",
            Self::Disbursed => "จ่ายเงินแล้ว",
            Self::Completed => "เสร็จสิ้น",
            Self::Defaulted => "ผิดนัด",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Completed | Self::Defaulted)
    }
}

impl Display for LoanStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Withdrawal lifecycle state. Terminal failure states carry their reason in
/// the variant, so a rejected withdrawal without a rejection reason cannot be
/// represented at all. The serialized form keeps the flat
/// `status` + reason-field document layout of the stored data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum WithdrawalState {
    #[serde(rename = "รอการอนุมัติ")]
    Pending,
    #[serde(rename = "อนุมัติแล้ว")]
    Approved,
    #[serde(rename = "เสร็จสิ้น")]
    Completed,
    #[serde(rename = "ปฏิเสธ")]
    Rejected {
        #[serde(rename = "rejectionReason")]
        rejection_reason: String,
    },
    #[serde(rename = "ล้มเหลว")]
    Failed {
        #[serde(rename = "failureReason")]
        failure_reason: String,
    },
}

impl WithdrawalState {
    #[must_use]
    pub const fn token(&self) -> &'static str {
        match self {
            Self::Pending => "รอการอนุมัติ",
            Self::Approved => "อนุมัติแล้ว",
            Self::Completed => "เสร็จสิ้น",
            Self::Rejected { .. } => "ปฏิเสธ",
            Self::Failed { .. } => "ล้มเหลว",
        }
    }

    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Rejected { rejection_reason } => Some(rejection_reason),
            Self::Failed { failure_reason } => Some(failure_reason),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Rejected { .. } | Self::Failed { .. }
        )
    }
}

impl Display for WithdrawalState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    #[serde(rename = "รอการอนุมัติ")]
    Pending,
    #[serde(rename = "เสร็จสิ้น")]
    Completed,
    #[serde(rename = "ล้มเหลว")]
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    Promptpay,
    Cash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    Admin,
    Superadmin,
}

impl AdminRole {
    #[must_use]
    pub const fn is_super(self) -> bool {
        matches!(self, Self::Superadmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loan_status_tokens_round_trip() {
        for status in [
            LoanStatus::Pending,
            LoanStatus::Approved,
            LoanStatus::Rejected,
            LoanStatus::Disbursed,
            LoanStatus::Completed,
            LoanStatus::Defaulted,
        ] {
            let json = serde_json::to_string(&status).expect("serialize");
            assert_eq!(json, format!("\"{}\"", status.token()));
            let back: LoanStatus = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(back, status);
        }
    }

    #[test]
    fn rejected_withdrawal_carries_reason_in_flat_document() {
        let state = WithdrawalState::Rejected {
            rejection_reason: "เอกสารไม่ครบ".to_string(),
        };
        let value = serde_json::to_value(&state).expect("serialize");
        assert_eq!(value["status"], "ปฏิเสธ");
        assert_eq!(value["rejectionReason"], "เอกสารไม่ครบ");
    }

    #[test]
    fn failed_withdrawal_parses_from_stored_layout() {
        let state: WithdrawalState =
            serde_json::from_str(r#"{"status":"ล้มเหลว","failureReason":"โอนเงินไม่สำเร็จ"}"#)
                .expect("deserialize");
        assert_eq!(state.reason(), Some("โอนเงินไม่สำเร็จ"));
        assert!(state.is_terminal());
    }
}
