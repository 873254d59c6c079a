use actix_web::{HttpResponse, Responder, web};
use tracing::debug;

use crate::{
    attendance::coordinator::CheckInCoordinator,
    auth::auth::BearerToken,
    config::Config,
    models::{AttendanceListResponse, CheckInReq, CheckInResponse},
};

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/attendance/checkin",
    request_body = CheckInReq,
    params(
        ("token" = Option<String>, Query, description = "Alternative to the Authorization header")
    ),
    responses(
        (status = 200, description = "Recorded, or `error` when the token is missing or invalid, the coordinates are unparseable, the caller is outside the geofence, or already checked in today", body = CheckInResponse),
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    token: BearerToken,
    payload: web::Json<CheckInReq>,
    coordinator: web::Data<CheckInCoordinator>,
    config: web::Data<Config>,
) -> impl Responder {
    debug!(photo_bytes = payload.photo_data.len(), "Check-in received");

    match coordinator.check_in(token.as_deref(), &payload).await {
        Ok(receipt) => HttpResponse::Ok().json(CheckInResponse {
            message: "attendance recorded successfully".to_string(),
            distance: receipt.distance,
            timestamp: receipt.timestamp,
        }),
        Err(e) => e.to_response(config.strict_status_codes),
    }
}

/// All check-ins, admins only
#[utoipa::path(
    get,
    path = "/attendance/list",
    params(
        ("token" = Option<String>, Query, description = "Alternative to the Authorization header")
    ),
    responses(
        (status = 200, description = "Every record in insertion order, or `error` for a missing/invalid token or a non-admin caller", body = AttendanceListResponse),
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list(
    token: BearerToken,
    coordinator: web::Data<CheckInCoordinator>,
    config: web::Data<Config>,
) -> impl Responder {
    match coordinator.list(token.as_deref()).await {
        Ok(attendance) => HttpResponse::Ok().json(AttendanceListResponse { attendance }),
        Err(e) => e.to_response(config.strict_status_codes),
    }
}
