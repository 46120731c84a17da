use kpi::models::{
    Customer, Interval, InvoiceLine, InvoiceStatus, Product, RawInvoice, RawPrice, RawSubscription,
    RawSubscriptionItem, Recurring, Ref, SubscriptionStatus,
};
use stripe::Expandable;

fn customer_ref(customer: &Expandable<stripe::Customer>) -> Ref<Customer> {
    match customer {
        Expandable::Id(id) => Ref::Id(id.to_string()),
        Expandable::Object(customer) => Ref::Expanded(Customer {
            id: customer.id.to_string(),
        }),
    }
}

pub(crate) fn product(product: &stripe::Product) -> Product {
    Product {
        id: product.id.to_string(),
        name: product.name.clone(),
    }
}

fn product_ref(product_ref: &Expandable<stripe::Product>) -> Ref<Product> {
    match product_ref {
        Expandable::Id(id) => Ref::Id(id.to_string()),
        Expandable::Object(object) => Ref::Expanded(product(object)),
    }
}

fn recurring(recurring: &stripe::Recurring) -> Option<Recurring> {
    match recurring.interval.as_str().parse::<Interval>() {
        Ok(interval) => Some(Recurring {
            interval,
            interval_count: u32::try_from(recurring.interval_count).unwrap_or(1),
        }),
        Err(e) => {
            log::warn!("{}", e);
            None
        }
    }
}

fn price(price: &stripe::Price) -> RawPrice {
    RawPrice {
        unit_amount: price.unit_amount.unwrap_or(0),
        recurring: price.recurring.as_ref().and_then(recurring),
        product: price.product.as_ref().map(product_ref),
    }
}

/// Subscriptions with a status the engine does not know are skipped.
pub(crate) fn subscription(sub: &stripe::Subscription) -> Option<RawSubscription> {
    let status = match sub.status.as_str().parse::<SubscriptionStatus>() {
        Ok(status) => status,
        Err(e) => {
            log::warn!("Skipping subscription {}: {}", sub.id, e);
            return None;
        }
    };

    Some(RawSubscription {
        id: sub.id.to_string(),
        customer: customer_ref(&sub.customer),
        status,
        created_at: sub.created,
        canceled_at: sub.canceled_at,
        current_period_end: sub.current_period_end,
        trial_start: sub.trial_start,
        trial_end: sub.trial_end,
        items: sub
            .items
            .data
            .iter()
            .filter_map(|item| {
                item.price.as_ref().map(|p| RawSubscriptionItem {
                    price: price(p),
                    quantity: item.quantity.unwrap_or(1),
                })
            })
            .collect(),
    })
}

/// Invoices without a customer or a status cannot be attributed and are dropped.
pub(crate) fn invoice(inv: &stripe::Invoice) -> Option<RawInvoice> {
    let Some(customer) = inv.customer.as_ref() else {
        log::debug!("Skipping invoice {} without customer", inv.id);
        return None;
    };
    let status = match inv.status.map(|s| s.as_str().parse::<InvoiceStatus>()) {
        Some(Ok(status)) => status,
        Some(Err(e)) => {
            log::warn!("Skipping invoice {}: {}", inv.id, e);
            return None;
        }
        None => {
            log::debug!("Skipping invoice {} without status", inv.id);
            return None;
        }
    };

    let lines = inv
        .lines
        .as_ref()
        .map(|lines| {
            lines
                .data
                .iter()
                .map(|line| InvoiceLine {
                    amount: line.amount,
                    recurring: line
                        .price
                        .as_ref()
                        .and_then(|p| p.recurring.as_ref())
                        .and_then(recurring),
                })
                .collect()
        })
        .unwrap_or_default();

    Some(RawInvoice {
        id: inv.id.to_string(),
        customer: customer_ref(customer),
        status,
        created_at: inv.created.unwrap_or(0),
        amount_paid: inv.amount_paid.unwrap_or(0),
        total: inv.total.unwrap_or(0),
        subscription: inv.subscription.as_ref().map(|s| s.id().to_string()),
        lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stripe::{List, RecurringInterval, SubscriptionItem};

    fn stripe_price(product: Expandable<stripe::Product>) -> stripe::Price {
        stripe::Price {
            id: "price_1".parse().unwrap(),
            unit_amount: Some(120_000),
            recurring: Some(stripe::Recurring {
                interval: RecurringInterval::Year,
                interval_count: 1,
                ..Default::default()
            }),
            product: Some(product),
            ..Default::default()
        }
    }

    #[test]
    fn converts_subscription_with_referenced_product() {
        let sub = stripe::Subscription {
            id: "sub_1".parse().unwrap(),
            customer: Expandable::Id("cus_1".parse().unwrap()),
            status: stripe::SubscriptionStatus::Canceled,
            created: 100,
            canceled_at: Some(200),
            current_period_end: 300,
            items: List {
                data: vec![SubscriptionItem {
                    id: "si_1".parse().unwrap(),
                    price: Some(stripe_price(Expandable::Id("prod_1".parse().unwrap()))),
                    quantity: Some(2),
                    ..Default::default()
                }],
                ..Default::default()
            },
            ..Default::default()
        };

        let raw = subscription(&sub).unwrap();
        assert_eq!(raw.customer.id(), "cus_1");
        assert_eq!(raw.status, SubscriptionStatus::Canceled);
        assert_eq!(raw.canceled_at, Some(200));
        assert_eq!(raw.items[0].quantity, 2);
        assert_eq!(raw.items[0].price.recurring, Some(Recurring::yearly()));
        assert_eq!(raw.items[0].price.product, Some(Ref::Id("prod_1".to_string())));
    }

    #[test]
    fn drops_invoices_without_customer() {
        let inv = stripe::Invoice {
            id: "in_1".parse().unwrap(),
            status: Some(stripe::InvoiceStatus::Paid),
            ..Default::default()
        };
        assert!(invoice(&inv).is_none());
    }

    #[test]
    fn converts_paid_invoice() {
        let inv = stripe::Invoice {
            id: "in_1".parse().unwrap(),
            customer: Some(Expandable::Id("cus_1".parse().unwrap())),
            status: Some(stripe::InvoiceStatus::Paid),
            created: Some(1_000),
            amount_paid: Some(4_900),
            total: Some(4_900),
            subscription: Some(Expandable::Id("sub_1".parse().unwrap())),
            ..Default::default()
        };

        let raw = invoice(&inv).unwrap();
        assert_eq!(raw.customer.id(), "cus_1");
        assert_eq!(raw.status, InvoiceStatus::Paid);
        assert_eq!(raw.amount_paid, 4_900);
        assert_eq!(raw.subscription.as_deref(), Some("sub_1"));
        assert!(raw.lines.is_empty());
    }
}
