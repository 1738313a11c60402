// SPDX-License-Identifier: Apache-2.0

use lendhub_model::{Amount, InterestRate, Rate, RateId, TermMonths};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PricingError {
    ZeroAmount,
    ZeroTerm,
    DuplicateActiveTerm(TermMonths),
}

impl PricingError {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "zero_amount",
            Self::ZeroTerm => "zero_term",
            Self::DuplicateActiveTerm(_) => "duplicate_active_term",
        }
    }
}

impl Display for PricingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroAmount => f.write_str("loan amount must be greater than zero"),
            Self::ZeroTerm => f.write_str("loan term must be a positive number of months"),
            Self::DuplicateActiveTerm(term) => {
                write!(f, "an active rate for term {term} already exists")
            }
        }
    }
}

impl std::error::Error for PricingError {}

/// Where a quoted rate came from. The fallback is legal but never silent:
/// callers can distinguish a priced term from a defaulted one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateSource {
    Matched { rate_id: RateId },
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateQuote {
    pub rate: Rate,
    pub source: RateSource,
}

/// Ordered view over the interest-rate records. Lookup is an exact term match
/// among active rows, first match wins; there is no interpolation between
/// terms. Duplicate active terms are tolerated on read (first match) and
/// rejected on write by [`validate_active_term_unique`].
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    records: Vec<InterestRate>,
}

impl RateTable {
    #[must_use]
    pub fn new(records: Vec<InterestRate>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[InterestRate] {
        &self.records
    }

    #[must_use]
    pub fn rate_for_term(&self, term: TermMonths) -> RateQuote {
        self.records
            .iter()
            .find(|r| r.is_active && r.term == term)
            .map(|r| RateQuote {
                rate: r.rate,
                source: RateSource::Matched {
                    rate_id: r.id.clone(),
                },
            })
            .unwrap_or(RateQuote {
                rate: Rate::fallback(),
                source: RateSource::Default,
            })
    }
}

/// Write-path guard for the invariant the legacy system enforced only in its
/// admin UI: at most one *active* rate per term. `exclude` skips the record
/// being edited.
pub fn validate_active_term_unique(
    records: &[InterestRate],
    term: TermMonths,
    exclude: Option<&RateId>,
) -> Result<(), PricingError> {
    let clash = records.iter().any(|r| {
        r.is_active && r.term == term && exclude.map_or(true, |id| &r.id != id)
    });
    if clash {
        Err(PricingError::DuplicateActiveTerm(term))
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanQuote {
    pub total_interest: Amount,
    pub total_payment: Amount,
    pub monthly_payment: Amount,
}

/// Flat-rate financing: interest is computed once over the full principal and
/// term, never on a declining balance, and every month pays the same share.
///
/// ```text
/// total_interest  = amount * rate
/// total_payment   = amount + total_interest
/// monthly_payment = total_payment / term
/// ```
///
/// Zero principal and zero term are rejected rather than propagated as
/// degenerate quotes; `TermMonths` already forbids zero, but the division
/// guard stays at this seam as well.
pub fn compute_loan(
    amount: Amount,
    term: TermMonths,
    rate: Rate,
) -> Result<LoanQuote, PricingError> {
    if amount.is_zero() {
        return Err(PricingError::ZeroAmount);
    }
    if term.months() == 0 {
        return Err(PricingError::ZeroTerm);
    }
    let principal = amount.value();
    let total_interest = principal * rate.value();
    let total_payment = principal + total_interest;
    let monthly_payment = total_payment / term.as_decimal();
    Ok(LoanQuote {
        total_interest: Amount::parse(total_interest).map_err(|_| PricingError::ZeroAmount)?,
        total_payment: Amount::parse(total_payment).map_err(|_| PricingError::ZeroAmount)?,
        monthly_payment: Amount::parse(monthly_payment).map_err(|_| PricingError::ZeroAmount)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn rate_record(id: &str, term: i64, rate: rust_decimal::Decimal, active: bool) -> InterestRate {
        let at = Utc.timestamp_opt(1_700_000_000, 0).single().expect("ts");
        InterestRate {
            id: RateId::parse(id).expect("id"),
            term: TermMonths::parse(term).expect("term"),
            rate: Rate::parse(rate).expect("rate"),
            is_active: active,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn reference_quote_matches_legacy_numbers() {
        let quote = compute_loan(
            Amount::parse(dec!(10000)).expect("amount"),
            TermMonths::parse(12).expect("term"),
            Rate::parse(dec!(0.0290)).expect("rate"),
        )
        .expect("quote");
        assert_eq!(quote.total_interest.value(), dec!(290));
        assert_eq!(quote.total_payment.value(), dec!(10290));
        assert_eq!(quote.monthly_payment.value(), dec!(857.50));
    }

    #[test]
    fn zero_amount_is_rejected() {
        let err = compute_loan(
            Amount::ZERO,
            TermMonths::parse(6).expect("term"),
            Rate::fallback(),
        )
        .expect_err("zero amount");
        assert_eq!(err, PricingError::ZeroAmount);
    }

    #[test]
    fn matched_term_wins_over_fallback() {
        let table = RateTable::new(vec![
            rate_record("rate-6", 6, dec!(0.0150), true),
            rate_record("rate-12", 12, dec!(0.0290), true),
        ]);
        let quote = table.rate_for_term(TermMonths::parse(12).expect("term"));
        assert_eq!(quote.rate.value(), dec!(0.0290));
        assert_eq!(
            quote.source,
            RateSource::Matched {
                rate_id: RateId::parse("rate-12").expect("id")
            }
        );
    }

    #[test]
    fn unmatched_term_falls_back_explicitly() {
        let table = RateTable::new(vec![rate_record("rate-6", 6, dec!(0.0150), true)]);
        let quote = table.rate_for_term(TermMonths::parse(24).expect("term"));
        assert_eq!(quote.rate.value(), dec!(0.03));
        assert_eq!(quote.source, RateSource::Default);
    }

    #[test]
    fn inactive_rows_do_not_match() {
        let table = RateTable::new(vec![rate_record("rate-12", 12, dec!(0.0290), false)]);
        let quote = table.rate_for_term(TermMonths::parse(12).expect("term"));
        assert_eq!(quote.source, RateSource::Default);
    }

    #[test]
    fn duplicate_active_terms_resolve_to_first_match() {
        let table = RateTable::new(vec![
            rate_record("rate-a", 12, dec!(0.0250), true),
            rate_record("rate-b", 12, dec!(0.0290), true),
        ]);
        let quote = table.rate_for_term(TermMonths::parse(12).expect("term"));
        assert_eq!(quote.rate.value(), dec!(0.0250));
    }

    #[test]
    fn active_term_uniqueness_guard() {
        let records = vec![
            rate_record("rate-a", 12, dec!(0.0250), true),
            rate_record("rate-b", 24, dec!(0.0290), false),
        ];
        let term12 = TermMonths::parse(12).expect("term");
        let term24 = TermMonths::parse(24).expect("term");
        assert_eq!(
            validate_active_term_unique(&records, term12, None),
            Err(PricingError::DuplicateActiveTerm(term12))
        );
        // Editing the clashing record itself is allowed.
        let own_id = RateId::parse("rate-a").expect("id");
        assert!(validate_active_term_unique(&records, term12, Some(&own_id)).is_ok());
        // An inactive row does not block reuse of its term.
        assert!(validate_active_term_unique(&records, term24, None).is_ok());
    }
}
