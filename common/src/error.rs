use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use thiserror::Error;

pub type Res<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    // === CONVERSION ERRORS ===
    #[error("Stripe error: {0}")]
    Stripe(#[from] stripe::StripeError),

    // === APPLICATION ERRORS ===
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Configuration(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Stripe(_) | AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_http_response(&self) -> HttpResponse {
        match self {
            // === CONVERSION ERRORS ===
            AppError::Stripe(error) => log::error!("Stripe error: {}", error),

            // === APPLICATION ERRORS ===
            AppError::Configuration(error) => log::error!("Configuration error: {}", error),
            AppError::BadRequest(_) => {}
        }

        HttpResponse::build(self.status()).json(serde_json::json!({
            "error": { "message": self.to_string() }
        }))
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        self.to_http_response()
    }
}
