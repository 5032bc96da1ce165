use actix_cors::Cors;
use actix_web::http::header;

use crate::constants::FRONTEND_URL;

pub fn configure_cors() -> Cors {
    Cors::default()
        .allowed_origin((*FRONTEND_URL).as_str())
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::ACCEPT_LANGUAGE,
        ])
        .supports_credentials()
        .max_age(3600)
}
