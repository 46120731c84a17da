use actix_cors::Cors;
use actix_web::http::header;

/// The dashboard only reads, so only GET and preflight requests are allowed.
pub fn middleware(origin: &str) -> Cors {
    Cors::default()
        .allowed_methods(vec!["GET", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .allowed_origin(origin)
        .max_age(3600)
}
