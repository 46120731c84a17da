use chrono::Utc;
use common::error::Res;
use kpi::{
    KpiOptions, KpiReport, ProductCatalog, compute_kpis, normalize_invoices,
    normalize_subscriptions,
};

use crate::dtos::kpis::KpiRequest;
use crate::source::BillingSource;

/// Fetches a fresh snapshot and runs the engine over it.
pub(crate) async fn get_kpis(
    source: &dyn BillingSource,
    request: &KpiRequest,
    options: &KpiOptions,
) -> Res<KpiReport> {
    let snapshot = source.fetch_snapshot().await?;

    let catalog: ProductCatalog = snapshot.products.into_iter().collect();
    let subscriptions = normalize_subscriptions(&snapshot.subscriptions, &catalog);
    let invoices = normalize_invoices(&snapshot.invoices);

    Ok(compute_kpis(
        &subscriptions,
        &invoices,
        &request.range,
        &request.plan,
        Utc::now().timestamp(),
        options,
    ))
}
