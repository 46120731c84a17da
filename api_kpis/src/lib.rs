use actix_web::web::{self};
use common::error::AppError;

pub mod routes {
    pub mod kpis;
}

pub mod source;

mod services {
    pub(crate) mod kpis;
}

mod dtos {
    pub(crate) mod kpis;
}

mod misc {
    pub(crate) mod convert;
}

pub use source::{BillingSource, Snapshot, StripeSource};

pub fn mount_kpis() -> actix_web::Scope {
    // Malformed query strings get the same JSON envelope as validation failures.
    let query_config = web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid query parameters: {}", err)).into()
    });

    web::scope("/kpis")
        .app_data(query_config)
        .service(routes::kpis::get_kpis)
}
