use common::error::Res;
use common::stripe::create_client;
use futures::future::{LocalBoxFuture, join_all};
use kpi::models::{Product, RawInvoice, RawSubscription};
use kpi::unresolved_product_ids;
use stripe::{
    Client, Invoice, InvoiceId, InvoiceStatus, ListInvoices, ListSubscriptions, ProductId,
    Subscription, SubscriptionId, SubscriptionStatusFilter,
};

use crate::misc::convert;

const PAGE_SIZE: u64 = 100;

/// Everything the engine needs from the billing provider for one request.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub subscriptions: Vec<RawSubscription>,
    pub invoices: Vec<RawInvoice>,
    /// Products looked up for references the subscriptions did not expand.
    pub products: Vec<Product>,
}

/// Source of subscription and invoice records.
pub trait BillingSource: Send + Sync {
    fn fetch_snapshot(&self) -> LocalBoxFuture<'_, Res<Snapshot>>;
}

/// Reads a full snapshot from the Stripe API.
pub struct StripeSource {
    secret_key: String,
}

impl StripeSource {
    pub fn new(secret_key: impl Into<String>) -> Self {
        StripeSource {
            secret_key: secret_key.into(),
        }
    }
}

impl BillingSource for StripeSource {
    fn fetch_snapshot(&self) -> LocalBoxFuture<'_, Res<Snapshot>> {
        Box::pin(async move {
            let client = create_client(&self.secret_key)?;

            let (subscriptions, invoices) =
                futures::try_join!(list_subscriptions(&client), list_paid_invoices(&client))?;

            let subscriptions: Vec<RawSubscription> = subscriptions
                .iter()
                .filter_map(convert::subscription)
                .collect();
            let invoices: Vec<RawInvoice> =
                invoices.iter().filter_map(convert::invoice).collect();

            let product_ids = unresolved_product_ids(&subscriptions);
            let products: Vec<Product> =
                join_all(product_ids.iter().map(|id| retrieve_product(&client, id)))
                    .await
                    .into_iter()
                    .flatten()
                    .collect();

            log::debug!(
                "Fetched {} subscriptions, {} paid invoices, {}/{} products from Stripe",
                subscriptions.len(),
                invoices.len(),
                products.len(),
                product_ids.len()
            );

            Ok(Snapshot {
                subscriptions,
                invoices,
                products,
            })
        })
    }
}

/// Every subscription in any status, following the cursor until the last page.
async fn list_subscriptions(client: &Client) -> Res<Vec<Subscription>> {
    let mut all = Vec::new();
    let mut starting_after: Option<SubscriptionId> = None;

    loop {
        let params = ListSubscriptions {
            status: Some(SubscriptionStatusFilter::All),
            limit: Some(PAGE_SIZE),
            starting_after: starting_after.take(),
            ..Default::default()
        };
        let page = Subscription::list(client, &params).await?;
        starting_after = page.data.last().map(|sub| sub.id.clone());
        let has_more = page.has_more;
        all.extend(page.data);

        if !has_more || starting_after.is_none() {
            break;
        }
    }
    Ok(all)
}

async fn list_paid_invoices(client: &Client) -> Res<Vec<Invoice>> {
    let mut all = Vec::new();
    let mut starting_after: Option<InvoiceId> = None;

    loop {
        let params = ListInvoices {
            status: Some(InvoiceStatus::Paid),
            limit: Some(PAGE_SIZE),
            starting_after: starting_after.take(),
            ..Default::default()
        };
        let page = Invoice::list(client, &params).await?;
        starting_after = page.data.last().map(|inv| inv.id.clone());
        let has_more = page.has_more;
        all.extend(page.data);

        if !has_more || starting_after.is_none() {
            break;
        }
    }
    Ok(all)
}

/// A failed lookup only costs the plan its name, so it is logged and skipped.
async fn retrieve_product(client: &Client, id: &str) -> Option<Product> {
    let product_id = match id.parse::<ProductId>() {
        Ok(product_id) => product_id,
        Err(e) => {
            log::warn!("Invalid product id {}: {}", id, e);
            return None;
        }
    };

    match stripe::Product::retrieve(client, &product_id, &[]).await {
        Ok(product) => Some(convert::product(&product)),
        Err(e) => {
            log::warn!("Failed to look up product {}: {}", id, e);
            None
        }
    }
}
