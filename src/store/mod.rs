//! Storage seams. Handlers and services only see these traits; `main` picks
//! the backend once at startup.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::model::{attendance::AttendanceRecord, user::User};

pub mod memory;
pub mod mysql;

/// Credential store keyed by email (exact, case-sensitive match).
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, email: &str) -> Result<Option<User>>;

    /// Inserts `user` unless its email is taken.
    /// Returns `false` (and stores nothing) when it was.
    async fn insert(&self, user: User) -> Result<bool>;
}

/// Append-only check-in ledger.
#[async_trait]
pub trait AttendanceLedger: Send + Sync {
    async fn has_checked_in_on(&self, email: &str, date: NaiveDate) -> Result<bool>;

    /// Appends one record. Callers must check `has_checked_in_on` first;
    /// `false` means the backend itself refused a second record for the
    /// same (email, date).
    async fn append(&self, record: AttendanceRecord) -> Result<bool>;

    /// All records in insertion order
    async fn list_all(&self) -> Result<Vec<AttendanceRecord>>;
}
