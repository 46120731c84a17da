use std::collections::{HashMap, HashSet};

use crate::models::{Invoice, Subscription};
use crate::period::DateRange;

/// LTV multiple of ARPA used when the window shows no churn at all.
///
/// A business policy cap for young accounts, not a general constant.
pub const LTV_FALLBACK_MULTIPLIER: f64 = 24.0;

/// Fraction of customers active at window start who churned during it.
///
/// Churned subscriptions are deduplicated by customer here.
pub fn churn_rate(churned: &[&Subscription], active_at_start: &HashSet<&str>) -> f64 {
    if active_at_start.is_empty() {
        return 0.0;
    }
    let churned_customers: HashSet<&str> =
        churned.iter().map(|sub| sub.customer_id.as_str()).collect();
    churned_customers.len() as f64 / active_at_start.len() as f64
}

pub fn lifetime_value(arpa: f64, churn_rate: f64) -> f64 {
    if churn_rate > 0.0 {
        arpa / churn_rate
    } else {
        arpa * LTV_FALLBACK_MULTIPLIER
    }
}

/// Date of each customer's earliest paid invoice across the whole history.
pub fn first_paid_invoice_dates(invoices: &[Invoice]) -> HashMap<&str, i64> {
    let mut paid: Vec<&Invoice> = invoices.iter().filter(|inv| inv.is_paid()).collect();
    paid.sort_by_key(|inv| inv.created_at);

    let mut first = HashMap::new();
    for inv in paid {
        first.entry(inv.customer_id.as_str()).or_insert(inv.created_at);
    }
    first
}

/// Customers whose first-ever payment falls inside `range`.
pub fn new_customers(first_dates: &HashMap<&str, i64>, range: &DateRange) -> usize {
    first_dates
        .values()
        .filter(|ts| range.contains(**ts))
        .count()
}
