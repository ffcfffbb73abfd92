use crate::presentation::auth::{list_users, login, register};
use crate::presentation::handlers::{health_check, json_error_handler, run};
use actix_web::web;

/// Route table shared by the server and the integration tests.
///
/// Bodies are decoded as JSON whatever `Content-Type` the client sends.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default()
        .content_type_required(false)
        .error_handler(json_error_handler);

    cfg.app_data(json_config)
        .route("/health", web::get().to(health_check))
        .route("/run", web::post().to(run))
        .service(
            web::scope("/users")
                .route("", web::post().to(register))
                .route("", web::get().to(list_users))
                .route("/login", web::post().to(login)),
        );
}
