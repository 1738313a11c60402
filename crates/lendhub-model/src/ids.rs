// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const ID_MAX_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    Empty(&'static str),
    Trimmed(&'static str),
    TooLong(&'static str, usize),
    Negative(&'static str),
    OutOfRange(&'static str),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(name) => write!(f, "{name} must not be empty"),
            Self::Trimmed(name) => {
                write!(f, "{name} must not contain leading/trailing whitespace")
            }
            Self::TooLong(name, max) => write!(f, "{name} exceeds max length {max}"),
            Self::Negative(name) => write!(f, "{name} must not be negative"),
            Self::OutOfRange(name) => write!(f, "{name} is out of range"),
        }
    }
}

impl std::error::Error for ParseError {}

macro_rules! string_id {
    ($name:ident, $field:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
        #[serde(transparent)]
        #[non_exhaustive]
        pub struct $name(String);

        impl $name {
            pub fn parse(input: &str) -> Result<Self, ParseError> {
                if input.is_empty() {
                    return Err(ParseError::Empty($field));
                }
                if input.trim() != input {
                    return Err(ParseError::Trimmed($field));
                }
                if input.len() > ID_MAX_LEN {
                    return Err(ParseError::TooLong($field, ID_MAX_LEN));
                }
                Ok(Self(input.to_string()))
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(UserId, "user_id");
string_id!(LoanId, "loan_id");
string_id!(WithdrawalId, "withdrawal_id");
string_id!(TransactionId, "transaction_id");
string_id!(RateId, "rate_id");
string_id!(AdminId, "admin_id");
