use actix_web::{Responder, get, web};
use common::{env_config::Config, error::Res, http::Success};
use kpi::KpiOptions;
use std::sync::Arc;

use crate::{dtos::kpis::KpiQuery, services, source::BillingSource};

/// Computes the KPI dashboard for a date window.
///
/// # Input
/// - `start`, `end`: required calendar dates, `YYYY-MM-DD`, inclusive
/// - `plan`: optional product name, `all` by default
///
/// # Output
/// - 200 with the KPI report
/// - 400 `{ "error": { "message" } }` on missing or invalid dates
/// - 500 `{ "error": { "message" } }` when Stripe is not configured or fails
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/kpis?start=2025-08-01&end=2025-08-31&plan=all');
/// const data = await response.json();
/// console.log(data.revenueRetention.mrr, data.trialFunnel.conversionRate);
/// ```
#[get("")]
pub async fn get_kpis(
    query: web::Query<KpiQuery>,
    source: web::Data<Arc<dyn BillingSource>>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    let request = query.validate()?;
    let options = KpiOptions::with_offset_minutes(config.report_utc_offset_minutes);
    let report = services::kpis::get_kpis(source.get_ref().as_ref(), &request, &options).await?;
    Success::ok(report)
}
