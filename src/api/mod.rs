pub mod health;
pub mod metrics;
pub mod swagger;
pub mod users;

use actix_web::web;

/// Registers every route. The caller provides `web::Data<dyn UserStore>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(users::json_error_handler))
        .route("/", web::get().to(health::index))
        .route("/health", web::get().to(health::health_check))
        .route("/metrics", web::get().to(metrics::get_metrics))
        .service(
            web::scope("/users")
                .route("", web::get().to(users::list_users))
                .route("", web::post().to(users::create_user))
                .route("/{id}", web::put().to(users::update_user))
                .route("/{id}", web::delete().to(users::delete_user)),
        );
}
