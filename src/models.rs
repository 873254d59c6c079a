use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::{attendance::AttendanceRecord, user::User};

/// Longest text value the storage columns accept
pub const MAX_FIELD_LEN: usize = 255;

#[derive(Deserialize, ToSchema)]
pub struct RegisterReq {
    #[schema(example = "nurse@hospital.org")]
    pub email: String,
    #[schema(example = "s3cret")]
    pub password: String,
    #[schema(example = "Ana Perez")]
    pub full_name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "nurse@hospital.org")]
    pub email: String,
    #[schema(example = "s3cret")]
    pub password: String,
}

/// Coordinates arrive as decimal strings, the way browsers report them.
#[derive(Deserialize, ToSchema)]
pub struct CheckInReq {
    #[schema(example = "22.930758")]
    pub latitude: String,
    #[schema(example = "-82.689342")]
    pub longitude: String,
    #[schema(example = "12.5")]
    pub accuracy: String,
    /// accepted for client compatibility, ignored
    #[schema(example = "")]
    pub photo_data: String,
    #[schema(example = "10.0.0.7")]
    pub ip_address: String,
}

impl CheckInReq {
    /// Every stored field fits its column
    pub fn fits_storage(&self) -> bool {
        [&self.latitude, &self.longitude, &self.accuracy, &self.ip_address]
            .iter()
            .all(|v| v.len() <= MAX_FIELD_LEN)
    }
}

#[derive(Serialize, ToSchema)]
pub struct UserSummary {
    pub email: String,
    pub full_name: String,
    pub is_admin: bool,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            full_name: user.full_name,
            is_admin: user.is_admin,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserSummary,
}

#[derive(Serialize, ToSchema)]
pub struct CheckInResponse {
    #[schema(example = "attendance recorded successfully")]
    pub message: String,
    /// meters from the hospital
    #[schema(example = 14.2)]
    pub distance: f64,
    #[schema(example = "2026-01-01T07:58:12.402113", format = "date-time", value_type = String)]
    pub timestamp: chrono::NaiveDateTime,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub attendance: Vec<AttendanceRecord>,
}
