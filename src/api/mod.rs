use actix_web::{HttpResponse, Responder, get};
use serde_json::json;

pub mod attendance;

/// Liveness check
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is up", body = Object, example = json!({
            "message": "Hospital Attendance API",
            "status": "active"
        })),
    ),
    tag = "Health"
)]
#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Hospital Attendance API",
        "status": "active"
    }))
}
