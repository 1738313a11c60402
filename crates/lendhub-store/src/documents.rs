// SPDX-License-Identifier: Apache-2.0

use crate::error::{StoreError, StoreErrorCode};
use chrono::Utc;
use lendhub_model::{
    Admin, InterestRate, Loan, Transaction, User, Withdrawal,
};
use rusqlite::{params, Connection, OpenFlags};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Users,
    Loans,
    Withdrawals,
    Transactions,
    Admins,
    InterestRates,
}

impl Collection {
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Loans => "loans",
            Self::Withdrawals => "withdrawals",
            Self::Transactions => "transactions",
            Self::Admins => "admins",
            Self::InterestRates => "interest_rates",
        }
    }

    const ALL: [Self; 6] = [
        Self::Users,
        Self::Loans,
        Self::Withdrawals,
        Self::Transactions,
        Self::Admins,
        Self::InterestRates,
    ];
}

/// JSON documents in SQLite, one table per collection. The stored `doc` is
/// the serde serialization of the model record, so the document layout (and
/// the Thai status tokens inside it) matches the data the legacy system
/// wrote. Filtered reads go through `json_extract`.
pub struct DocumentStore {
    conn: Mutex<Connection>,
}

impl DocumentStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(std::time::Duration::from_millis(500))?;
        Self::init(conn)
    }

    /// Private in-memory database; the test-path twin of [`DocumentStore::open`].
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        for collection in Collection::ALL {
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {} (
                        id TEXT PRIMARY KEY,
                        doc TEXT NOT NULL,
                        updated_at TEXT NOT NULL
                    )",
                    collection.table()
                ),
                [],
            )?;
        }
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::new(StoreErrorCode::Internal, "store mutex poisoned"))
    }

    pub fn put<T: Serialize>(
        &self,
        collection: Collection,
        id: &str,
        doc: &T,
    ) -> Result<(), StoreError> {
        let body = serde_json::to_string(doc)?;
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (id, doc, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET doc = ?2, updated_at = ?3",
                collection.table()
            ),
            params![id, body, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn get<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<T, StoreError> {
        let conn = self.lock()?;
        let body: String = conn
            .query_row(
                &format!("SELECT doc FROM {} WHERE id = ?1", collection.table()),
                params![id],
                |row| row.get(0),
            )
            .map_err(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => {
                    StoreError::not_found(collection.table(), id)
                }
                other => other.into(),
            })?;
        Ok(serde_json::from_str(&body)?)
    }

    pub fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let affected = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", collection.table()),
            params![id],
        )?;
        if affected == 0 {
            return Err(StoreError::not_found(collection.table(), id));
        }
        Ok(())
    }

    pub fn list<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>, StoreError> {
        self.query(collection, "SELECT doc FROM {t} ORDER BY id", &[])
    }

    fn query<T: DeserializeOwned>(
        &self,
        collection: Collection,
        sql_template: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<T>, StoreError> {
        let sql = sql_template.replace("{t}", collection.table());
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params, |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(serde_json::from_str(&row?)?);
        }
        Ok(out)
    }

    // --- typed collection views --------------------------------------------

    pub fn put_user(&self, user: &User) -> Result<(), StoreError> {
        self.put(Collection::Users, user.id.as_str(), user)
    }

    pub fn get_user(&self, id: &str) -> Result<User, StoreError> {
        self.get(Collection::Users, id)
    }

    pub fn list_users(&self) -> Result<Vec<User>, StoreError> {
        self.list(Collection::Users)
    }

    pub fn delete_user(&self, id: &str) -> Result<(), StoreError> {
        self.delete(Collection::Users, id)
    }

    pub fn find_user_by_phone(&self, phone: &str) -> Result<Option<User>, StoreError> {
        let mut found: Vec<User> = self.query(
            Collection::Users,
            "SELECT doc FROM {t} WHERE json_extract(doc, '$.phone') = ?1 LIMIT 1",
            &[&phone],
        )?;
        Ok(found.pop())
    }

    pub fn put_loan(&self, loan: &Loan) -> Result<(), StoreError> {
        self.put(Collection::Loans, loan.id.as_str(), loan)
    }

    pub fn get_loan(&self, id: &str) -> Result<Loan, StoreError> {
        self.get(Collection::Loans, id)
    }

    pub fn list_loans(&self) -> Result<Vec<Loan>, StoreError> {
        self.list(Collection::Loans)
    }

    pub fn delete_loan(&self, id: &str) -> Result<(), StoreError> {
        self.delete(Collection::Loans, id)
    }

    pub fn loans_for_user(&self, user_id: &str) -> Result<Vec<Loan>, StoreError> {
        self.query(
            Collection::Loans,
            "SELECT doc FROM {t} WHERE json_extract(doc, '$.userId') = ?1 ORDER BY id",
            &[&user_id],
        )
    }

    pub fn put_withdrawal(&self, withdrawal: &Withdrawal) -> Result<(), StoreError> {
        self.put(Collection::Withdrawals, withdrawal.id.as_str(), withdrawal)
    }

    pub fn get_withdrawal(&self, id: &str) -> Result<Withdrawal, StoreError> {
        self.get(Collection::Withdrawals, id)
    }

    pub fn list_withdrawals(&self) -> Result<Vec<Withdrawal>, StoreError> {
        self.list(Collection::Withdrawals)
    }

    pub fn withdrawals_for_user(&self, user_id: &str) -> Result<Vec<Withdrawal>, StoreError> {
        self.query(
            Collection::Withdrawals,
            "SELECT doc FROM {t} WHERE json_extract(doc, '$.userId') = ?1 ORDER BY id",
            &[&user_id],
        )
    }

    pub fn put_transaction(&self, transaction: &Transaction) -> Result<(), StoreError> {
        self.put(Collection::Transactions, transaction.id.as_str(), transaction)
    }

    pub fn list_transactions(&self) -> Result<Vec<Transaction>, StoreError> {
        self.list(Collection::Transactions)
    }

    pub fn transactions_for_user(&self, user_id: &str) -> Result<Vec<Transaction>, StoreError> {
        self.query(
            Collection::Transactions,
            "SELECT doc FROM {t} WHERE json_extract(doc, '$.userId') = ?1 ORDER BY id",
            &[&user_id],
        )
    }

    pub fn put_admin(&self, admin: &Admin) -> Result<(), StoreError> {
        self.put(Collection::Admins, admin.id.as_str(), admin)
    }

    pub fn get_admin(&self, id: &str) -> Result<Admin, StoreError> {
        self.get(Collection::Admins, id)
    }

    pub fn list_admins(&self) -> Result<Vec<Admin>, StoreError> {
        self.list(Collection::Admins)
    }

    pub fn delete_admin(&self, id: &str) -> Result<(), StoreError> {
        self.delete(Collection::Admins, id)
    }

    pub fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, StoreError> {
        let mut found: Vec<Admin> = self.query(
            Collection::Admins,
            "SELECT doc FROM {t} WHERE json_extract(doc, '$.email') = ?1 LIMIT 1",
            &[&email],
        )?;
        Ok(found.pop())
    }

    pub fn put_interest_rate(&self, rate: &InterestRate) -> Result<(), StoreError> {
        self.put(Collection::InterestRates, rate.id.as_str(), rate)
    }

    pub fn get_interest_rate(&self, id: &str) -> Result<InterestRate, StoreError> {
        self.get(Collection::InterestRates, id)
    }

    pub fn delete_interest_rate(&self, id: &str) -> Result<(), StoreError> {
        self.delete(Collection::InterestRates, id)
    }

    /// Every rate row, active and inactive, ordered by term. Feeds the
    /// admin table and the in-memory `RateTable` alike.
    pub fn list_interest_rates(&self) -> Result<Vec<InterestRate>, StoreError> {
        self.query(
            Collection::InterestRates,
            "SELECT doc FROM {t} ORDER BY CAST(json_extract(doc, '$.term') AS INTEGER), id",
            &[],
        )
    }
}
