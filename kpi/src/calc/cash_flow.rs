use std::collections::HashMap;

use crate::models::{Invoice, PlanKind, Subscription};
use crate::period::{DateRange, MonthBin};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevenueCategory {
    MonthlyPlans,
    AnnualPlans,
    OneTimeCharges,
}

impl From<PlanKind> for RevenueCategory {
    fn from(kind: PlanKind) -> Self {
        match kind {
            PlanKind::Monthly => RevenueCategory::MonthlyPlans,
            PlanKind::Annual => RevenueCategory::AnnualPlans,
        }
    }
}

/// Paid invoice totals for one calendar month, in minor units.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthRevenue {
    pub bin: MonthBin,
    pub revenue: i64,
    pub invoice_count: usize,
    pub monthly_plans: i64,
    pub annual_plans: i64,
    pub one_time_charges: i64,
}

/// Cash actually collected in the window, in minor units.
pub fn revenue_collected(invoices: &[Invoice], range: &DateRange) -> i64 {
    invoices
        .iter()
        .filter(|inv| inv.is_paid() && range.contains(inv.created_at))
        .map(|inv| inv.amount_paid)
        .sum()
}

/// Assigns invoices to a revenue category, looking up the subscriptions they relate to.
pub struct InvoiceCategorizer<'a> {
    by_id: HashMap<&'a str, &'a Subscription>,
    first_by_customer: HashMap<&'a str, &'a Subscription>,
}

impl<'a> InvoiceCategorizer<'a> {
    pub fn new(subscriptions: &'a [Subscription]) -> Self {
        let mut by_id = HashMap::new();
        let mut first_by_customer = HashMap::new();
        for sub in subscriptions {
            by_id.insert(sub.id.as_str(), sub);
            first_by_customer.entry(sub.customer_id.as_str()).or_insert(sub);
        }
        InvoiceCategorizer {
            by_id,
            first_by_customer,
        }
    }

    /// First matching rule wins:
    /// 1. the referenced subscription's first item interval
    /// 2. the first line item carrying a month or year interval
    /// 3. the customer's first subscription's first item interval
    /// 4. one-time charge
    pub fn categorize(&self, invoice: &Invoice) -> RevenueCategory {
        let from_subscription = invoice
            .subscription_id
            .as_deref()
            .and_then(|id| self.by_id.get(id))
            .and_then(|sub| sub.first_item_plan_kind());

        let kind = from_subscription
            .or_else(|| {
                invoice
                    .lines
                    .iter()
                    .find_map(|line| line.recurring.and_then(|r| r.plan_kind()))
            })
            .or_else(|| {
                self.first_by_customer
                    .get(invoice.customer_id.as_str())
                    .and_then(|sub| sub.first_item_plan_kind())
            });

        kind.map(RevenueCategory::from)
            .unwrap_or(RevenueCategory::OneTimeCharges)
    }
}

/// Per-month revenue table; months are whole calendar months, not clipped to the window.
pub fn monthly_revenue(
    invoices: &[Invoice],
    subscriptions: &[Subscription],
    bins: &[MonthBin],
) -> Vec<MonthRevenue> {
    let categorizer = InvoiceCategorizer::new(subscriptions);

    bins.iter()
        .map(|bin| {
            let month = MonthRevenue {
                bin: *bin,
                revenue: 0,
                invoice_count: 0,
                monthly_plans: 0,
                annual_plans: 0,
                one_time_charges: 0,
            };
            invoices
                .iter()
                .filter(|inv| inv.is_paid() && bin.contains(inv.created_at))
                .fold(month, |mut month, inv| {
                    month.revenue += inv.amount_paid;
                    month.invoice_count += 1;
                    match categorizer.categorize(inv) {
                        RevenueCategory::MonthlyPlans => month.monthly_plans += inv.amount_paid,
                        RevenueCategory::AnnualPlans => month.annual_plans += inv.amount_paid,
                        RevenueCategory::OneTimeCharges => month.one_time_charges += inv.amount_paid,
                    }
                    month
                })
        })
        .collect()
}
