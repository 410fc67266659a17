// Route exports
pub mod supports;

use actix_web::web;

pub use supports::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(supports::configure),
    );
}
