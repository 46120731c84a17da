//! Raw record builders for the engine integration tests.

use kpi::models::{
    Customer, InvoiceStatus, Product, RawInvoice, RawPrice, RawSubscription, RawSubscriptionItem,
    Recurring, Ref, SubscriptionStatus,
};
use kpi::{DateRange, ProductCatalog, normalize_invoices, normalize_subscriptions};
use kpi::models::{Invoice, Subscription};

pub const DAY: i64 = 86_400;

/// 2025-08-01 .. 2025-08-31.
pub fn august() -> DateRange {
    DateRange::parse("2025-08-01", "2025-08-31").unwrap()
}

/// 2025-08-20 00:00:00 UTC.
pub fn now() -> i64 {
    august().start + 19 * DAY
}

pub fn raw_subscription(
    id: &str,
    customer: &str,
    status: SubscriptionStatus,
    unit_amount: i64,
    recurring: Recurring,
    product_id: &str,
) -> RawSubscription {
    RawSubscription {
        id: id.to_string(),
        customer: Ref::Id(customer.to_string()),
        status,
        created_at: august().start - 60 * DAY,
        canceled_at: None,
        current_period_end: now() + 10 * DAY,
        trial_start: None,
        trial_end: None,
        items: vec![RawSubscriptionItem {
            price: RawPrice {
                unit_amount,
                recurring: Some(recurring),
                product: Some(Ref::Id(product_id.to_string())),
            },
            quantity: 1,
        }],
    }
}

pub fn monthly(id: &str, customer: &str, unit_amount: i64) -> RawSubscription {
    raw_subscription(
        id,
        customer,
        SubscriptionStatus::Active,
        unit_amount,
        Recurring::monthly(),
        "prod_studio",
    )
}

pub fn paid_invoice(id: &str, customer: &str, created_at: i64, amount: i64) -> RawInvoice {
    RawInvoice {
        id: id.to_string(),
        customer: Ref::Expanded(Customer {
            id: customer.to_string(),
        }),
        status: InvoiceStatus::Paid,
        created_at,
        amount_paid: amount,
        total: amount,
        subscription: None,
        lines: Vec::new(),
    }
}

pub fn catalog() -> ProductCatalog {
    [("prod_studio", "Studio"), ("prod_agency", "Agency")]
        .into_iter()
        .map(|(id, name)| Product {
            id: id.to_string(),
            name: Some(name.to_string()),
        })
        .collect()
}

pub fn normalize(
    subscriptions: &[RawSubscription],
    invoices: &[RawInvoice],
) -> (Vec<Subscription>, Vec<Invoice>) {
    (
        normalize_subscriptions(subscriptions, &catalog()),
        normalize_invoices(invoices),
    )
}
