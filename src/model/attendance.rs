use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One accepted check-in. Coordinates are kept exactly as submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = "nurse@hospital.org")]
    pub email: String,
    #[schema(example = "Ana Perez")]
    pub full_name: String,
    #[schema(example = "2026-01-01T07:58:12.402113", format = "date-time", value_type = String)]
    pub timestamp: NaiveDateTime,
    #[schema(example = "22.930758")]
    pub latitude: String,
    #[schema(example = "-82.689342")]
    pub longitude: String,
    #[schema(example = "12.5")]
    pub accuracy: String,
    #[schema(example = "10.0.0.7")]
    pub ip_address: String,
    /// meters from the hospital
    #[schema(example = 14.2)]
    pub distance: f64,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
}
