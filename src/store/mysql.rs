use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;

use super::{AttendanceLedger, UserStore};
use crate::model::{attendance::AttendanceRecord, user::User};

// SQLSTATE for integrity constraint violations (duplicate key)
const DUPLICATE_KEY: &str = "23000";

fn is_duplicate(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => is_duplicate_code(db_err.code().as_deref()),
        _ => false,
    }
}

fn is_duplicate_code(code: Option<&str>) -> bool {
    code == Some(DUPLICATE_KEY)
}

pub struct MySqlUserStore {
    pool: MySqlPool,
}

impl MySqlUserStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for MySqlUserStore {
    async fn get(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT email, password_hash, full_name, is_admin
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch user")
    }

    async fn insert(&self, user: User) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, full_name, is_admin)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.is_admin)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if is_duplicate(&e) => Ok(false),
            Err(e) => Err(e).context("failed to insert user"),
        }
    }
}

pub struct MySqlAttendanceLedger {
    pool: MySqlPool,
}

impl MySqlAttendanceLedger {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceLedger for MySqlAttendanceLedger {
    async fn has_checked_in_on(&self, email: &str, date: NaiveDate) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM attendance WHERE email = ? AND `date` = ?",
        )
        .bind(email)
        .bind(date)
        .fetch_one(&self.pool)
        .await
        .context("failed to query attendance")?;

        Ok(count > 0)
    }

    async fn append(&self, record: AttendanceRecord) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance
                (email, full_name, `timestamp`, latitude, longitude, accuracy, ip_address, distance, `date`)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.email)
        .bind(&record.full_name)
        .bind(record.timestamp)
        .bind(&record.latitude)
        .bind(&record.longitude)
        .bind(&record.accuracy)
        .bind(&record.ip_address)
        .bind(record.distance)
        .bind(record.date)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            // unique (email, date) key
            Err(e) if is_duplicate(&e) => Ok(false),
            Err(e) => Err(e).context("failed to append attendance record"),
        }
    }

    async fn list_all(&self) -> Result<Vec<AttendanceRecord>> {
        sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT email, full_name, `timestamp`, latitude, longitude, accuracy,
                   ip_address, distance, `date`
            FROM attendance
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list attendance")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn only_integrity_violations_count_as_duplicates() {
        assert!(is_duplicate_code(Some("23000")));
        assert!(!is_duplicate_code(Some("42S02"))); // unknown table
        assert!(!is_duplicate_code(Some("HY000")));
        assert!(!is_duplicate_code(None));
        assert!(!is_duplicate(&sqlx::Error::RowNotFound));
        assert!(!is_duplicate(&sqlx::Error::PoolTimedOut));
    }

    // Set TEST_DATABASE_URL to a disposable MySQL database to run these.
    async fn pool() -> Option<MySqlPool> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        Some(crate::db::init_db(&url).await.unwrap())
    }

    fn unique_email() -> String {
        format!("{}@test.h.org", uuid::Uuid::new_v4())
    }

    fn record(email: &str, at: &str) -> AttendanceRecord {
        let timestamp = NaiveDateTime::parse_from_str(at, "%Y-%m-%dT%H:%M:%S%.f").unwrap();
        AttendanceRecord {
            email: email.to_string(),
            full_name: "Someone".to_string(),
            timestamp,
            latitude: "22.930758".to_string(),
            longitude: "-82.689342".to_string(),
            accuracy: "5".to_string(),
            ip_address: "1".repeat(255),
            distance: 3.5,
            date: timestamp.date(),
        }
    }

    #[actix_web::test]
    async fn schema_refuses_second_record_for_the_same_day() {
        let Some(pool) = pool().await else { return };
        let ledger = MySqlAttendanceLedger::new(pool);
        let email = unique_email();

        assert!(ledger.append(record(&email, "2026-03-02T07:45:00.123456")).await.unwrap());
        assert!(!ledger.append(record(&email, "2026-03-02T18:00:00")).await.unwrap());
        assert!(ledger.append(record(&email, "2026-03-03T07:45:00")).await.unwrap());

        let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert!(ledger.has_checked_in_on(&email, day).await.unwrap());
        assert!(!ledger.has_checked_in_on(&unique_email(), day).await.unwrap());
    }

    #[actix_web::test]
    async fn listing_keeps_insertion_order_and_precision() {
        let Some(pool) = pool().await else { return };
        let ledger = MySqlAttendanceLedger::new(pool);
        let (first, second) = (unique_email(), unique_email());

        let stored = record(&first, "2026-03-05T07:45:00.123456");
        ledger.append(stored.clone()).await.unwrap();
        ledger.append(record(&second, "2026-03-04T07:00:00")).await.unwrap();

        let ours: Vec<_> = ledger
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.email == first || r.email == second)
            .collect();
        assert_eq!(ours.len(), 2);
        assert_eq!(ours[0], stored);
        assert_eq!(ours[1].email, second);
    }

    #[actix_web::test]
    async fn user_insert_refuses_taken_email() {
        let Some(pool) = pool().await else { return };
        let store = MySqlUserStore::new(pool);
        let email = unique_email();
        let user = User {
            email: email.clone(),
            password_hash: "hash".to_string(),
            full_name: "Someone".to_string(),
            is_admin: false,
        };

        assert!(store.insert(user.clone()).await.unwrap());
        assert!(!store.insert(user).await.unwrap());
        assert!(store.get(&email).await.unwrap().is_some());
        // binary collation: exact match only
        assert!(store.get(&email.to_uppercase()).await.unwrap().is_none());
    }
}
