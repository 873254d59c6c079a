use crate::model::attendance::AttendanceRecord;
use crate::models::{
    AttendanceListResponse, CheckInReq, CheckInResponse, LoginReqDto, LoginResponse, RegisterReq,
    UserSummary,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hospital Attendance API",
        version = "1.0.0",
        description = r#"
## Hospital staff attendance

Staff register, log in, and check in once per day from their phone.
A check-in is accepted only within **200 m** of the hospital.

### 🔐 Security
Attendance endpoints take the **JWT** from `/auth/login`, either as
`Authorization: Bearer <token>` or as a `token` query parameter.
Tokens live 24 hours. Only administrators can list attendance.

### 📦 Response Format
Failures are answered with `200 OK` and a body of `{"error": "<message>"}`
unless the server runs with `STRICT_STATUS_CODES=true`.
"#,
    ),
    paths(
        crate::api::index,

        crate::auth::handlers::register,
        crate::auth::handlers::login,

        crate::api::attendance::check_in,
        crate::api::attendance::list
    ),
    components(
        schemas(
            RegisterReq,
            LoginReqDto,
            LoginResponse,
            UserSummary,
            CheckInReq,
            CheckInResponse,
            AttendanceRecord,
            AttendanceListResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service status"),
        (name = "Auth", description = "Registration and login"),
        (name = "Attendance", description = "Geofenced daily check-in"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
