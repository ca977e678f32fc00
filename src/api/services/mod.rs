pub mod download;
pub mod health;
pub mod pages;
pub mod report;

use actix_web::web;

pub use download::handle_download;
pub use health::HealthService;
pub use pages::{handle_index, handle_search};
pub use report::{handle_course_info, handle_favicon};

/// All routes. Fixed paths are registered before the catch-all report
/// patterns so `/search` is never read as a subject.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handle_index))
        .route("/health", web::get().to(HealthService::health_check))
        .route("/health", web::head().to(HealthService::health_check))
        .route("/favicon.ico", web::get().to(handle_favicon))
        .route("/search", web::get().to(handle_search))
        .route("/download/{filename}", web::get().to(handle_download))
        .route("/{subject}", web::get().to(handle_course_info))
        .route("/{subject}/{spec1}", web::get().to(handle_course_info))
        .route("/{subject}/{spec1}/{spec2}", web::get().to(handle_course_info));
}
