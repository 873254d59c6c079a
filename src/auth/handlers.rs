use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use crate::{
    auth::service::AuthService,
    config::Config,
    models::{LoginReqDto, LoginResponse, RegisterReq},
};

/// User registration handler
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterReq,
    responses(
        (status = 200, description = "Registered, or `error` when the email is taken", body = Object, example = json!({
            "message": "user registered successfully"
        })),
    ),
    tag = "Auth"
)]
pub async fn register(
    payload: web::Json<RegisterReq>,
    auth: web::Data<AuthService>,
    config: web::Data<Config>,
) -> impl Responder {
    match auth
        .register(&payload.email, &payload.password, &payload.full_name)
        .await
    {
        Ok(()) => HttpResponse::Ok().json(json!({
            "message": "user registered successfully"
        })),
        Err(e) => e.to_response(config.strict_status_codes),
    }
}

/// Exchanges credentials for a 24h access token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Token issued, or `error` on bad credentials", body = LoginResponse),
    ),
    tag = "Auth"
)]
pub async fn login(
    payload: web::Json<LoginReqDto>,
    auth: web::Data<AuthService>,
    config: web::Data<Config>,
) -> impl Responder {
    match auth.login(&payload.email, &payload.password).await {
        Ok((access_token, user)) => HttpResponse::Ok().json(LoginResponse {
            access_token,
            user: user.into(),
        }),
        Err(e) => e.to_response(config.strict_status_codes),
    }
}
