use lendhub_api::{quote_dto, ApiEnvelope, ApiError, RateSourceDto};
use lendhub_core::{compute_loan, RateTable};
use lendhub_model::{Amount, TermMonths};
use rust_decimal_macros::dec;

#[test]
fn quote_envelope_matches_legacy_reference_numbers() {
    let table = RateTable::default();
    let amount = Amount::parse(dec!(10000)).expect("amount");
    let term = TermMonths::parse(12).expect("term");
    // Empty table: the 3% fallback applies, explicitly marked as such.
    let rate_quote = table.rate_for_term(term);
    let loan_quote = compute_loan(amount, term, rate_quote.rate).expect("quote");
    let dto = quote_dto(amount, term, &rate_quote, &loan_quote);
    assert_eq!(dto.rate_source, RateSourceDto::Default);
    assert_eq!(dto.rate, dec!(0.03));
    assert_eq!(dto.total_payment, dec!(10300));

    let env = ApiEnvelope::success(serde_json::to_value(&dto).expect("value"));
    let value = serde_json::to_value(&env).expect("serialize");
    assert_eq!(value["status"], "success");
    assert_eq!(value["data"]["rateSource"], "default");
    assert_eq!(value["data"]["term"], 12);
    // Monetary values cross the boundary as 2-dp decimal strings.
    assert_eq!(value["data"]["monthlyPayment"], "858.33");
}

#[test]
fn error_envelope_shape_is_uniform() {
    let env = ApiEnvelope::failure(ApiError::insufficient_balance("5000", "1200"));
    let value = serde_json::to_value(&env).expect("serialize");
    assert_eq!(value["status"], "error");
    assert_eq!(value["error"]["code"], "insufficient_balance");
    assert_eq!(value["error"]["details"]["available"], "1200");
    assert!(value["message"]
        .as_str()
        .expect("message")
        .contains("available balance"));
}
