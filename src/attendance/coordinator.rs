use std::sync::Arc;

use chrono::{Local, NaiveDateTime, SubsecRound};
use futures::lock::Mutex;
use tracing::{info, instrument};

use crate::{
    attendance::geofence::{MAX_DISTANCE_METERS, distance_to_hospital, parse_coordinate, within_radius},
    auth::service::AuthService,
    error::AppError,
    model::attendance::AttendanceRecord,
    models::CheckInReq,
    store::AttendanceLedger,
};

/// Source of "now" for timestamps and the check-in calendar date.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the process-local timezone, at microsecond precision so
/// the value handed back to clients is the one MySQL stores.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local().trunc_subsecs(6)
    }
}

pub struct CheckInReceipt {
    pub distance: f64,
    pub timestamp: NaiveDateTime,
}

/// Runs a check-in through token, geofence and duplicate-day checks before
/// committing it to the ledger. Each step short-circuits on failure.
pub struct CheckInCoordinator {
    auth: Arc<AuthService>,
    ledger: Arc<dyn AttendanceLedger>,
    clock: Arc<dyn Clock>,
    // duplicate check + append must not interleave
    commit_lock: Mutex<()>,
}

impl CheckInCoordinator {
    pub fn new(
        auth: Arc<AuthService>,
        ledger: Arc<dyn AttendanceLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            auth,
            ledger,
            clock,
            commit_lock: Mutex::new(()),
        }
    }

    #[instrument(name = "attendance_check_in", skip_all)]
    pub async fn check_in(
        &self,
        token: Option<&str>,
        submission: &CheckInReq,
    ) -> Result<CheckInReceipt, AppError> {
        let user = self.auth.authenticate(token).await?;

        if !submission.fits_storage() {
            info!(email = %user.email, "Check-in field too long");
            return Err(AppError::InvalidBody);
        }

        let (lat, lon) = parse_coordinate(&submission.latitude, &submission.longitude)?;
        let distance = distance_to_hospital(lat, lon);
        if !within_radius(distance, MAX_DISTANCE_METERS) {
            info!(email = %user.email, distance, "Check-in out of range");
            return Err(AppError::OutOfRange(distance));
        }

        let _guard = self.commit_lock.lock().await;

        let timestamp = self.clock.now();
        let today = timestamp.date();

        if self.ledger.has_checked_in_on(&user.email, today).await? {
            info!(email = %user.email, %today, "Already checked in");
            return Err(AppError::AlreadyCheckedIn);
        }

        let record = AttendanceRecord {
            email: user.email.clone(),
            full_name: user.full_name,
            timestamp,
            latitude: submission.latitude.clone(),
            longitude: submission.longitude.clone(),
            accuracy: submission.accuracy.clone(),
            ip_address: submission.ip_address.clone(),
            distance,
            date: today,
        };

        if !self.ledger.append(record).await? {
            info!(email = %user.email, %today, "Ledger refused duplicate check-in");
            return Err(AppError::AlreadyCheckedIn);
        }

        info!(email = %user.email, distance, "Check-in recorded");
        Ok(CheckInReceipt { distance, timestamp })
    }

    /// Every record from every user; admins only.
    pub async fn list(&self, token: Option<&str>) -> Result<Vec<AttendanceRecord>, AppError> {
        let user = self.auth.authenticate(token).await?;
        if !user.is_admin {
            return Err(AppError::Forbidden);
        }

        Ok(self.ledger.list_all().await?)
    }
}

/// Settable clock for tests
#[cfg(test)]
pub(crate) struct FixedClock(std::sync::Mutex<NaiveDateTime>);

#[cfg(test)]
impl FixedClock {
    pub fn at(at: &str) -> Self {
        let at = NaiveDateTime::parse_from_str(at, "%Y-%m-%dT%H:%M:%S").unwrap();
        Self(std::sync::Mutex::new(at))
    }

    pub fn advance(&self, by: chrono::Duration) {
        *self.0.lock().unwrap() += by;
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.0.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::geofence::{HOSPITAL_LAT, HOSPITAL_LON, destination};
    use crate::store::memory::{MemoryAttendanceLedger, MemoryUserStore};
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate, Timelike};

    /// Hands control back to the executor before every duplicate-day lookup,
    /// so concurrent check-ins interleave between the lookup and the append.
    #[derive(Default)]
    struct YieldingLedger(MemoryAttendanceLedger);

    #[async_trait]
    impl AttendanceLedger for YieldingLedger {
        async fn has_checked_in_on(&self, email: &str, date: NaiveDate) -> anyhow::Result<bool> {
            actix_web::rt::task::yield_now().await;
            self.0.has_checked_in_on(email, date).await
        }

        async fn append(&self, record: AttendanceRecord) -> anyhow::Result<bool> {
            self.0.append(record).await
        }

        async fn list_all(&self) -> anyhow::Result<Vec<AttendanceRecord>> {
            self.0.list_all().await
        }
    }

    struct Fixture {
        coordinator: Arc<CheckInCoordinator>,
        clock: Arc<FixedClock>,
        nurse: String,
        admin: String,
    }

    async fn fixture() -> Fixture {
        fixture_with(Arc::new(MemoryAttendanceLedger::new())).await
    }

    async fn fixture_with(ledger: Arc<dyn AttendanceLedger>) -> Fixture {
        let auth = Arc::new(AuthService::new(
            Arc::new(MemoryUserStore::new()),
            "k".to_string(),
            86_400,
        ));
        auth.register("nurse@h.org", "pw", "Nurse").await.unwrap();
        auth.bootstrap_admin("admin@h.org", "pw", "Admin").await.unwrap();
        let (nurse, _) = auth.login("nurse@h.org", "pw").await.unwrap();
        let (admin, _) = auth.login("admin@h.org", "pw").await.unwrap();

        let clock = Arc::new(FixedClock::at("2026-03-02T07:45:00"));
        let coordinator = Arc::new(CheckInCoordinator::new(
            auth,
            ledger,
            clock.clone(),
        ));

        Fixture {
            coordinator,
            clock,
            nurse,
            admin,
        }
    }

    fn at(lat: f64, lon: f64) -> CheckInReq {
        CheckInReq {
            latitude: lat.to_string(),
            longitude: lon.to_string(),
            accuracy: "8".to_string(),
            photo_data: String::new(),
            ip_address: "10.0.0.7".to_string(),
        }
    }

    fn hospital() -> CheckInReq {
        at(HOSPITAL_LAT, HOSPITAL_LON)
    }

    #[actix_web::test]
    async fn check_in_at_hospital_succeeds() {
        let f = fixture().await;
        let receipt = f
            .coordinator
            .check_in(Some(&f.nurse), &hospital())
            .await
            .unwrap();

        assert_eq!(receipt.distance, 0.0);
        assert_eq!(receipt.timestamp, f.clock.now());

        let records = f.coordinator.list(Some(&f.admin)).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].email, "nurse@h.org");
        assert_eq!(records[0].full_name, "Nurse");
        assert_eq!(records[0].latitude, HOSPITAL_LAT.to_string());
        assert_eq!(records[0].date, f.clock.now().date());
    }

    #[actix_web::test]
    async fn missing_or_bad_token_is_rejected_first() {
        let f = fixture().await;
        // bad coordinates would fail too, but the token is checked first
        let bad = CheckInReq {
            latitude: "x".to_string(),
            ..hospital()
        };

        assert!(matches!(
            f.coordinator.check_in(None, &bad).await,
            Err(AppError::TokenRequired)
        ));
        assert!(matches!(
            f.coordinator.check_in(Some("forged"), &bad).await,
            Err(AppError::Unauthorized)
        ));
    }

    #[actix_web::test]
    async fn unparseable_coordinates_are_rejected() {
        let f = fixture().await;
        let bad = CheckInReq {
            longitude: "west".to_string(),
            ..hospital()
        };

        assert!(matches!(
            f.coordinator.check_in(Some(&f.nurse), &bad).await,
            Err(AppError::InvalidCoordinate)
        ));
    }

    #[actix_web::test]
    async fn far_check_in_reports_distance() {
        let f = fixture().await;
        let (lat, lon) = destination(HOSPITAL_LAT, HOSPITAL_LON, 30.0, 5_000.0);

        let err = f
            .coordinator
            .check_in(Some(&f.nurse), &at(lat, lon))
            .await
            .err()
            .unwrap();

        assert!(matches!(err, AppError::OutOfRange(_)));
        assert!(err.to_string().contains("5000"), "{err}");
        assert!(f.coordinator.list(Some(&f.admin)).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn edge_of_the_geofence() {
        let f = fixture().await;

        let (lat, lon) = destination(HOSPITAL_LAT, HOSPITAL_LON, 180.0, 200.5);
        assert!(matches!(
            f.coordinator.check_in(Some(&f.nurse), &at(lat, lon)).await,
            Err(AppError::OutOfRange(_))
        ));

        let (lat, lon) = destination(HOSPITAL_LAT, HOSPITAL_LON, 180.0, 199.5);
        let receipt = f
            .coordinator
            .check_in(Some(&f.nurse), &at(lat, lon))
            .await
            .unwrap();
        assert!((receipt.distance - 199.5).abs() < 0.01);
    }

    #[actix_web::test]
    async fn one_check_in_per_day() {
        let f = fixture().await;
        f.coordinator
            .check_in(Some(&f.nurse), &hospital())
            .await
            .unwrap();

        f.clock.advance(Duration::hours(10));
        assert!(matches!(
            f.coordinator.check_in(Some(&f.nurse), &hospital()).await,
            Err(AppError::AlreadyCheckedIn)
        ));

        // next calendar day
        f.clock.advance(Duration::hours(10));
        f.coordinator
            .check_in(Some(&f.nurse), &hospital())
            .await
            .unwrap();

        let records = f.coordinator.list(Some(&f.admin)).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_ne!(records[0].date, records[1].date);
    }

    #[actix_web::test]
    async fn concurrent_check_ins_commit_once() {
        let f = fixture_with(Arc::new(YieldingLedger::default())).await;
        let submission = hospital();

        let attempts = (0..8).map(|_| f.coordinator.check_in(Some(&f.nurse), &submission));
        let results = futures::future::join_all(attempts).await;

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| matches!(e, AppError::AlreadyCheckedIn))
        );
        assert_eq!(f.coordinator.list(Some(&f.admin)).await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn listing_is_admin_only() {
        let f = fixture().await;
        f.coordinator
            .check_in(Some(&f.nurse), &hospital())
            .await
            .unwrap();
        f.coordinator
            .check_in(Some(&f.admin), &hospital())
            .await
            .unwrap();

        assert!(matches!(
            f.coordinator.list(Some(&f.nurse)).await,
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            f.coordinator.list(None).await,
            Err(AppError::TokenRequired)
        ));

        let emails: Vec<_> = f
            .coordinator
            .list(Some(&f.admin))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.email)
            .collect();
        assert_eq!(emails, ["nurse@h.org", "admin@h.org"]);
    }

    #[actix_web::test]
    async fn oversize_fields_are_rejected_before_commit() {
        let f = fixture().await;
        let long = CheckInReq {
            accuracy: "9".repeat(256),
            ..hospital()
        };

        assert!(matches!(
            f.coordinator.check_in(Some(&f.nurse), &long).await,
            Err(AppError::InvalidBody)
        ));
        assert!(f.coordinator.list(Some(&f.admin)).await.unwrap().is_empty());

        let longest = CheckInReq {
            ip_address: "1".repeat(255),
            ..hospital()
        };
        f.coordinator
            .check_in(Some(&f.nurse), &longest)
            .await
            .unwrap();
    }

    #[test]
    fn system_clock_has_microsecond_precision() {
        for _ in 0..20 {
            assert_eq!(SystemClock.now().nanosecond() % 1_000, 0);
        }
    }
}
