//! Record builders shared by the unit tests.

use crate::models::{
    Invoice, InvoiceStatus, Price, Product, Recurring, Subscription, SubscriptionItem,
    SubscriptionStatus,
};

pub fn priced_subscription(
    id: &str,
    customer_id: &str,
    unit_amount: i64,
    recurring: Recurring,
    plan_name: &str,
) -> Subscription {
    Subscription {
        id: id.to_string(),
        customer_id: customer_id.to_string(),
        status: SubscriptionStatus::Active,
        created_at: 100,
        canceled_at: None,
        current_period_end: i64::MAX,
        trial_start: None,
        trial_end: None,
        items: vec![SubscriptionItem {
            price: Price {
                unit_amount,
                recurring: Some(recurring),
                product: Product {
                    id: format!("prod_{}", plan_name.to_lowercase()),
                    name: Some(plan_name.to_string()),
                },
            },
            quantity: 1,
        }],
    }
}

pub fn subscription(
    id: &str,
    customer_id: &str,
    status: SubscriptionStatus,
    created_at: i64,
) -> Subscription {
    Subscription {
        status,
        created_at,
        ..priced_subscription(id, customer_id, 5000, Recurring::monthly(), "Pro")
    }
}

pub fn named_subscription(id: &str, customer_id: &str, plan_name: &str) -> Subscription {
    priced_subscription(id, customer_id, 5000, Recurring::monthly(), plan_name)
}

pub fn invoice(id: &str, customer_id: &str, created_at: i64, amount: i64) -> Invoice {
    Invoice {
        id: id.to_string(),
        customer_id: customer_id.to_string(),
        status: InvoiceStatus::Paid,
        created_at,
        amount_paid: amount,
        total: amount,
        subscription_id: None,
        lines: Vec::new(),
    }
}
