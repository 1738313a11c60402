use lendhub_core::compute_loan;
use lendhub_model::{Amount, Rate, TermMonths};
use proptest::prelude::*;
use proptest::test_runner::Config;
use rust_decimal::Decimal;

proptest! {
    #![proptest_config(Config::with_cases(256))]
    #[test]
    fn monthly_times_term_reconstructs_total(
        amount_cents in 1_u64..=1_000_000_000,
        term in 1_i64..=360,
        rate_bp in 0_u32..10_000,
    ) {
        let amount = Amount::parse(Decimal::new(amount_cents as i64, 2)).expect("amount");
        let term = TermMonths::parse(term).expect("term");
        let rate = Rate::parse(Decimal::new(i64::from(rate_bp), 5)).expect("rate");

        let quote = compute_loan(amount, term, rate).expect("quote");

        let reconstructed = quote.monthly_payment.value() * term.as_decimal();
        let diff = (reconstructed - quote.total_payment.value()).abs();
        prop_assert!(diff < Decimal::new(1, 6), "diff {diff} too large");
        prop_assert!(quote.total_payment.value() >= amount.value());
        prop_assert_eq!(
            quote.total_payment.value(),
            amount.value() + quote.total_interest.value()
        );
    }

    #[test]
    fn zero_rate_means_interest_free(
        amount_cents in 1_u64..=1_000_000_000,
        term in 1_i64..=360,
    ) {
        let amount = Amount::parse(Decimal::new(amount_cents as i64, 2)).expect("amount");
        let term = TermMonths::parse(term).expect("term");
        let quote = compute_loan(amount, term, Rate::ZERO).expect("quote");
        prop_assert_eq!(quote.total_interest.value(), Decimal::ZERO);
        prop_assert_eq!(quote.total_payment, amount);
    }
}
