#![forbid(unsafe_code)]
//! Business rules of the loan platform: interest-rate lookup, flat-rate loan
//! pricing, admin-driven status transitions, and presence aggregation.
//!
//! Everything here is synchronous arithmetic over the model types; no I/O.

mod lifecycle;
mod presence;
mod pricing;

pub use lifecycle::{
    loan_transition, resolve_withdrawal, LifecycleError, WithdrawalResolution,
};
pub use presence::{PresenceLevel, PresenceReconciler, PresenceSignals, DEFAULT_STALENESS_SECS};
pub use pricing::{
    compute_loan, validate_active_term_unique, LoanQuote, PricingError, RateQuote, RateSource,
    RateTable,
};

pub const CRATE_NAME: &str = "lendhub-core";
