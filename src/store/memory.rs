use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use super::{AttendanceLedger, UserStore};
use crate::model::{attendance::AttendanceRecord, user::User};

/// Process-lifetime user map
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().expect("user store poisoned");
        Ok(users.get(email).cloned())
    }

    async fn insert(&self, user: User) -> Result<bool> {
        // check and insert under one write lock
        let mut users = self.users.write().expect("user store poisoned");
        if users.contains_key(&user.email) {
            return Ok(false);
        }
        users.insert(user.email.clone(), user);
        Ok(true)
    }
}

#[derive(Default)]
pub struct MemoryAttendanceLedger {
    records: RwLock<Vec<AttendanceRecord>>,
}

impl MemoryAttendanceLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttendanceLedger for MemoryAttendanceLedger {
    async fn has_checked_in_on(&self, email: &str, date: NaiveDate) -> Result<bool> {
        let records = self.records.read().expect("attendance ledger poisoned");
        Ok(records.iter().any(|r| r.email == email && r.date == date))
    }

    async fn append(&self, record: AttendanceRecord) -> Result<bool> {
        self.records
            .write()
            .expect("attendance ledger poisoned")
            .push(record);
        Ok(true)
    }

    async fn list_all(&self) -> Result<Vec<AttendanceRecord>> {
        let records = self.records.read().expect("attendance ledger poisoned");
        Ok(records.clone())
    }
}
