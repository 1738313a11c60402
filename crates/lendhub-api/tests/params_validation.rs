use lendhub_api::{
    ApiErrorCode, InterestRateUpsertRequest, LoanApplicationRequest, WithdrawalResolveRequest,
};
use lendhub_core::WithdrawalResolution;
use rust_decimal_macros::dec;

#[test]
fn loan_application_rejects_zero_and_negative_inputs() {
    let zero_amount = LoanApplicationRequest {
        amount: dec!(0),
        term: 12,
    };
    let err = zero_amount.validated().expect_err("zero amount");
    assert_eq!(err.code, ApiErrorCode::InvalidParameter);

    let bad_term = LoanApplicationRequest {
        amount: dec!(5000),
        term: 0,
    };
    let err = bad_term.validated().expect_err("zero term");
    assert_eq!(err.code, ApiErrorCode::InvalidParameter);
    assert!(err.message.contains("term"));
}

#[test]
fn resolve_request_maps_tokens_to_resolutions() {
    let approve = WithdrawalResolveRequest {
        status: "อนุมัติแล้ว".to_string(),
        rejection_reason: None,
        failure_reason: None,
    };
    assert_eq!(
        approve.into_resolution().expect("approve"),
        WithdrawalResolution::Approve
    );

    let reject = WithdrawalResolveRequest {
        status: "ปฏิเสธ".to_string(),
        rejection_reason: Some("เอกสารไม่ครบ".to_string()),
        failure_reason: None,
    };
    assert_eq!(
        reject.into_resolution().expect("reject"),
        WithdrawalResolution::Reject {
            reason: "เอกสารไม่ครบ".to_string()
        }
    );

    let unknown = WithdrawalResolveRequest {
        status: "pending".to_string(),
        rejection_reason: None,
        failure_reason: None,
    };
    let err = unknown.into_resolution().expect_err("unknown token");
    assert_eq!(err.code, ApiErrorCode::InvalidParameter);
}

#[test]
fn reject_without_reason_defers_to_lifecycle_rules() {
    // The DTO hands an empty reason downstream; the lifecycle layer is the
    // single place that decides a reason is mandatory.
    let reject = WithdrawalResolveRequest {
        status: "ปฏิเสธ".to_string(),
        rejection_reason: None,
        failure_reason: None,
    };
    let resolution = reject.into_resolution().expect("parses");
    let err = lendhub_core::resolve_withdrawal(
        &lendhub_model::WithdrawalState::Pending,
        resolution,
    )
    .expect_err("missing reason");
    let api_err: lendhub_api::ApiError = err.into();
    assert_eq!(api_err.code, ApiErrorCode::MissingReason);
}

#[test]
fn rate_upsert_requires_fraction_form() {
    let as_percentage = InterestRateUpsertRequest {
        term: 12,
        rate: dec!(2.9),
        is_active: true,
    };
    let err = as_percentage.validated().expect_err("percentage form");
    assert_eq!(err.code, ApiErrorCode::InvalidParameter);

    let as_fraction = InterestRateUpsertRequest {
        term: 12,
        rate: dec!(0.029),
        is_active: true,
    };
    assert!(as_fraction.validated().is_ok());
}
