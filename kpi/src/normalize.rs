use std::collections::{BTreeSet, HashMap, HashSet};

use crate::models::{
    Invoice, Price, Product, RawInvoice, RawPrice, RawSubscription, Ref, Subscription,
    SubscriptionItem,
};

/// Products looked up by id for the lifetime of one aggregation call.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: HashMap<String, Product>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }
}

impl FromIterator<Product> for ProductCatalog {
    fn from_iter<I: IntoIterator<Item = Product>>(iter: I) -> Self {
        let mut catalog = ProductCatalog::new();
        for product in iter {
            catalog.insert(product);
        }
        catalog
    }
}

/// Product ids that are only referenced, never expanded, across all subscription items.
pub fn unresolved_product_ids(subscriptions: &[RawSubscription]) -> BTreeSet<String> {
    subscriptions
        .iter()
        .flat_map(|sub| sub.items.iter())
        .filter_map(|item| match &item.price.product {
            Some(Ref::Id(id)) => Some(id.clone()),
            _ => None,
        })
        .collect()
}

fn resolve_product(product: Option<&Ref<Product>>, catalog: &ProductCatalog) -> Product {
    match product {
        Some(Ref::Expanded(product)) => product.clone(),
        Some(Ref::Id(id)) => catalog.get(id).cloned().unwrap_or_else(|| {
            log::debug!("Product {} was not resolved, labelling as unnamed", id);
            Product {
                id: id.clone(),
                name: None,
            }
        }),
        None => Product {
            id: String::new(),
            name: None,
        },
    }
}

fn normalize_price(price: &RawPrice, catalog: &ProductCatalog) -> Price {
    Price {
        unit_amount: price.unit_amount,
        recurring: price.recurring,
        product: resolve_product(price.product.as_ref(), catalog),
    }
}

/// Resolves every customer and product reference so calculators only see plain records.
pub fn normalize_subscriptions(
    raw: &[RawSubscription],
    catalog: &ProductCatalog,
) -> Vec<Subscription> {
    raw.iter()
        .map(|sub| Subscription {
            id: sub.id.clone(),
            customer_id: sub.customer.id().to_string(),
            status: sub.status,
            created_at: sub.created_at,
            canceled_at: sub.canceled_at,
            current_period_end: sub.current_period_end,
            trial_start: sub.trial_start,
            trial_end: sub.trial_end,
            items: sub
                .items
                .iter()
                .map(|item| SubscriptionItem {
                    price: normalize_price(&item.price, catalog),
                    quantity: item.quantity,
                })
                .collect(),
        })
        .collect()
}

pub fn normalize_invoices(raw: &[RawInvoice]) -> Vec<Invoice> {
    raw.iter()
        .map(|inv| Invoice {
            id: inv.id.clone(),
            customer_id: inv.customer.id().to_string(),
            status: inv.status,
            created_at: inv.created_at,
            amount_paid: inv.amount_paid,
            total: inv.total,
            subscription_id: inv.subscription.clone(),
            lines: inv.lines.clone(),
        })
        .collect()
}

/// Distinct product names across all subscriptions, in first-seen order.
pub fn available_plans(subscriptions: &[Subscription]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut plans = Vec::new();
    let names = subscriptions
        .iter()
        .flat_map(|sub| sub.items.iter())
        .filter_map(|item| item.price.product.name.as_ref());
    for name in names {
        if seen.insert(name.as_str()) {
            plans.push(name.clone());
        }
    }
    plans
}
