#![forbid(unsafe_code)]
//! REST surface contract: the `{status, data, message}` envelope, DTOs, and
//! error codes shared by the server and any API client.

mod convert;
mod dto;
mod envelope;
mod errors;

pub use convert::{
    admin_dto, interest_rate_dto, loan_dto, presence_dto, quote_dto, transaction_dto, user_dto,
    wallet_dto, withdrawal_dto,
};
pub use dto::{
    AdminCreateRequest, AdminDto, AdminLoginRequest, AuthTokenDto, InterestRateDto,
    InterestRateUpsertRequest, LoanApplicationRequest, LoanDto, LoanStatusUpdateRequest,
    PresenceDto, QuoteDto, QuoteParams, RateSourceDto, TransactionDto, UserCreateRequest,
    UserDto, UserLoginRequest, UserProfileUpdateRequest, WalletDto, WithdrawalCreateRequest,
    WithdrawalDto, WithdrawalResolveRequest,
};
pub use envelope::{ApiEnvelope, EnvelopeStatus};
pub use errors::{ApiError, ApiErrorCode};

pub const CRATE_NAME: &str = "lendhub-api";
pub const API_VERSION: &str = "v1";
