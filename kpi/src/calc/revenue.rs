use std::collections::HashSet;

use crate::models::Subscription;

/// Sum of the monthly-normalized price of every item, in minor units.
pub fn monthly_recurring_revenue(paying: &[&Subscription]) -> f64 {
    paying
        .iter()
        .flat_map(|sub| sub.items.iter())
        .map(|item| item.price.monthly_amount())
        .sum()
}

/// Distinct customers behind the paying subscriptions.
pub fn paying_customer_count(paying: &[&Subscription]) -> usize {
    paying
        .iter()
        .map(|sub| sub.customer_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Average revenue per account, `0` without customers.
pub fn arpa(mrr: f64, customers: usize) -> f64 {
    if customers == 0 {
        return 0.0;
    }
    mrr / customers as f64
}
