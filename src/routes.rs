use crate::{
    api::{self, attendance},
    auth::handlers,
    config::Config,
    error::AppError,
};
use actix_web::{error::InternalError, web};

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let strict = config.strict_status_codes;

    // Malformed bodies follow the same `{"error": ..}` convention
    cfg.app_data(web::JsonConfig::default().error_handler(move |err, _req| {
        InternalError::from_response(err, AppError::InvalidBody.to_response(strict)).into()
    }));

    cfg.service(api::index);

    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(handlers::register))
            .route("/login", web::post().to(handlers::login)),
    );

    cfg.service(
        web::scope("/attendance")
            .route("/checkin", web::post().to(attendance::check_in))
            .route("/list", web::get().to(attendance::list)),
    );
}

// LOGIN
//  └─ access_token (24h, not revocable)

// API REQUEST
//  └─ Authorization: Bearer access_token   (or ?token=access_token)
