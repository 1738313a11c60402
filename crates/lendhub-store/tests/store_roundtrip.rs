use chrono::{TimeZone, Utc};
use lendhub_model::{
    Admin, AdminId, AdminPermissions, AdminRole, Amount, BankAccount, InterestRate, Loan, LoanId,
    LoanStatus, Rate, RateId, TermMonths, User, UserId, Wallet, Withdrawal, WithdrawalId,
    WithdrawalState,
};
use lendhub_store::{DocumentStore, StoreErrorCode};
use rust_decimal_macros::dec;

fn ts(secs: i64) -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0)
        .single()
        .expect("timestamp")
}

fn sample_user(id: &str, phone: &str) -> User {
    User {
        id: UserId::parse(id).expect("id"),
        first_name: "Somchai".to_string(),
        last_name: "Jaidee".to_string(),
        phone: phone.to_string(),
        password_hash: "abc123".to_string(),
        citizen_id: None,
        email: None,
        address: None,
        bank_account: Some(BankAccount {
            bank_name: "KBank".to_string(),
            account_number: "1234567890".to_string(),
            account_name: "Somchai J.".to_string(),
        }),
        family_contact: None,
        documents: Vec::new(),
        wallet: Wallet::default(),
        is_online: false,
        last_seen_at: None,
        created_at: ts(0),
        updated_at: ts(0),
    }
}

fn sample_loan(id: &str, user: &str) -> Loan {
    Loan {
        id: LoanId::parse(id).expect("id"),
        user_id: UserId::parse(user).expect("id"),
        amount: Amount::parse(dec!(10000)).expect("amount"),
        term: TermMonths::parse(12).expect("term"),
        status: LoanStatus::Pending,
        monthly_payment: Amount::parse(dec!(857.50)).expect("amount"),
        total_payment: Amount::parse(dec!(10290)).expect("amount"),
        applied_rate: Rate::parse(dec!(0.0290)).expect("rate"),
        created_at: ts(0),
        updated_at: ts(0),
    }
}

#[test]
fn user_round_trip_and_phone_lookup() {
    let store = DocumentStore::open_in_memory().expect("store");
    let user = sample_user("user-1", "0812345678");
    store.put_user(&user).expect("put");

    let back = store.get_user("user-1").expect("get");
    assert_eq!(back, user);

    let by_phone = store
        .find_user_by_phone("0812345678")
        .expect("query")
        .expect("present");
    assert_eq!(by_phone.id, user.id);
    assert!(store
        .find_user_by_phone("0000000000")
        .expect("query")
        .is_none());
}

#[test]
fn loans_filter_by_user() {
    let store = DocumentStore::open_in_memory().expect("store");
    store.put_loan(&sample_loan("loan-1", "user-1")).expect("put");
    store.put_loan(&sample_loan("loan-2", "user-2")).expect("put");
    store.put_loan(&sample_loan("loan-3", "user-1")).expect("put");

    let loans = store.loans_for_user("user-1").expect("query");
    assert_eq!(loans.len(), 2);
    assert!(loans.iter().all(|l| l.user_id.as_str() == "user-1"));
}

#[test]
fn withdrawal_reason_survives_storage() {
    let store = DocumentStore::open_in_memory().expect("store");
    let withdrawal = Withdrawal {
        id: WithdrawalId::parse("wd-1").expect("id"),
        user_id: UserId::parse("user-1").expect("id"),
        amount: Amount::parse(dec!(1500)).expect("amount"),
        state: WithdrawalState::Failed {
            failure_reason: "โอนเงินไม่สำเร็จ".to_string(),
        },
        bank_account: BankAccount {
            bank_name: "SCB".to_string(),
            account_number: "9876543210".to_string(),
            account_name: "S. Jaidee".to_string(),
        },
        transaction_id: None,
        created_at: ts(0),
        updated_at: ts(5),
    };
    store.put_withdrawal(&withdrawal).expect("put");
    let back = store.get_withdrawal("wd-1").expect("get");
    assert_eq!(back.state.reason(), Some("โอนเงินไม่สำเร็จ"));
    assert_eq!(back, withdrawal);
}

#[test]
fn interest_rates_list_ordered_by_term() {
    let store = DocumentStore::open_in_memory().expect("store");
    for (id, term) in [("rate-b", 24), ("rate-a", 6), ("rate-c", 12)] {
        let rate = InterestRate {
            id: RateId::parse(id).expect("id"),
            term: TermMonths::parse(term).expect("term"),
            rate: Rate::parse(dec!(0.0290)).expect("rate"),
            is_active: true,
            created_at: ts(0),
            updated_at: ts(0),
        };
        store.put_interest_rate(&rate).expect("put");
    }
    let rates = store.list_interest_rates().expect("list");
    let terms: Vec<u32> = rates.iter().map(|r| r.term.months()).collect();
    assert_eq!(terms, vec![6, 12, 24]);
}

#[test]
fn missing_documents_report_not_found() {
    let store = DocumentStore::open_in_memory().expect("store");
    let err = store.get_loan("loan-404").expect_err("missing");
    assert_eq!(err.code, StoreErrorCode::NotFound);
    assert!(err.is_not_found());
    let err = store.delete_user("user-404").expect_err("missing");
    assert_eq!(err.code, StoreErrorCode::NotFound);
}

#[test]
fn admin_email_lookup_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("lendhub.db");
    {
        let store = DocumentStore::open(&path).expect("open");
        let admin = Admin {
            id: AdminId::parse("admin-1").expect("id"),
            name: "Root".to_string(),
            phone: "020000000".to_string(),
            email: "root@lendhub.local".to_string(),
            password_hash: "hash".to_string(),
            role: AdminRole::Superadmin,
            permissions: AdminPermissions::all(),
            created_at: ts(0),
            updated_at: ts(0),
        };
        store.put_admin(&admin).expect("put");
    }
    // Reopen: the documents must survive the connection.
    let store = DocumentStore::open(&path).expect("reopen");
    let admin = store
        .find_admin_by_email("root@lendhub.local")
        .expect("query")
        .expect("present");
    assert_eq!(admin.role, AdminRole::Superadmin);
    assert!(admin.can_manage_loans());
}

#[test]
fn upsert_overwrites_in_place() {
    let store = DocumentStore::open_in_memory().expect("store");
    let mut loan = sample_loan("loan-1", "user-1");
    store.put_loan(&loan).expect("put");
    loan.status = LoanStatus::Approved;
    loan.updated_at = ts(60);
    store.put_loan(&loan).expect("upsert");

    let back = store.get_loan("loan-1").expect("get");
    assert_eq!(back.status, LoanStatus::Approved);
    assert_eq!(store.list_loans().expect("list").len(), 1);
}
