pub mod health;
pub mod submit;
pub mod verify;

use actix_web::{HttpResponse, error::InternalError, web};

use crate::models::response::ApiResponse;

pub fn init(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let response =
            HttpResponse::BadRequest().json(ApiResponse::failed("Invalid request body."));
        InternalError::from_response(err, response).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        let response =
            HttpResponse::BadRequest().json(ApiResponse::failed("Missing or invalid link."));
        InternalError::from_response(err, response).into()
    }))
    .service(web::scope("/health").configure(health::init))
    .configure(submit::init)
    .configure(verify::init);
}
