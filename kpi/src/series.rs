//! Monthly time series for the growth charts.
//!
//! Bins are reconstructed from current subscription state, so a subscription
//! that changed plan reports its present price in every past month.

use std::collections::{HashMap, HashSet};

use crate::models::{Subscription, SubscriptionStatus};
use crate::period::MonthBin;

#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionPoint {
    pub bin: MonthBin,
    pub new: usize,
    pub churned: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevenuePoint {
    pub bin: MonthBin,
    /// Minor units.
    pub revenue: f64,
    pub customers: usize,
}

/// New customers by first payment and churned customers by cancellation date, per month.
pub fn acquisition_chart(
    bins: &[MonthBin],
    first_paid: &HashMap<&str, i64>,
    subscriptions: &[Subscription],
    paid_customers: &HashSet<&str>,
) -> Vec<AcquisitionPoint> {
    bins.iter()
        .map(|bin| {
            let new = first_paid.values().filter(|ts| bin.contains(**ts)).count();
            let churned = subscriptions
                .iter()
                .filter(|sub| paid_customers.contains(sub.customer_id.as_str()))
                .filter(|sub| sub.status == SubscriptionStatus::Canceled)
                .filter(|sub| sub.canceled_at.is_some_and(|ts| bin.contains(ts)))
                .map(|sub| sub.customer_id.as_str())
                .collect::<HashSet<_>>()
                .len();
            AcquisitionPoint {
                bin: *bin,
                new,
                churned,
            }
        })
        .collect()
}

/// Recurring revenue and customer count alive at the end of each month.
pub fn revenue_chart(
    bins: &[MonthBin],
    subscriptions: &[Subscription],
    paid_customers: &HashSet<&str>,
) -> Vec<RevenuePoint> {
    bins.iter()
        .map(|bin| {
            let (revenue, customers) = subscriptions
                .iter()
                .filter(|sub| paid_customers.contains(sub.customer_id.as_str()))
                .filter(|sub| sub.alive_at(bin.end))
                .fold((0.0, HashSet::new()), |(revenue, mut customers), sub| {
                    customers.insert(sub.customer_id.as_str());
                    (revenue + sub.first_item_monthly_amount(), customers)
                });
            RevenuePoint {
                bin: *bin,
                revenue,
                customers: customers.len(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::{DateRange, month_bins};
    use crate::testing::subscription;
    use chrono::FixedOffset;

    fn bins() -> Vec<MonthBin> {
        let range = DateRange::parse("2025-07-01", "2025-08-31").unwrap();
        month_bins(&range, FixedOffset::east_opt(0).unwrap())
    }

    #[test]
    fn acquisition_counts_first_payments_and_distinct_churners() {
        let bins = bins();
        let (july, august) = (bins[0], bins[1]);

        let first_paid: HashMap<&str, i64> =
            [("cus_a", july.start + 5), ("cus_b", august.start), ("cus_c", july.start - 1)]
                .into_iter()
                .collect();

        let mut c1 = subscription("sub_c1", "cus_c", SubscriptionStatus::Canceled, 0);
        c1.canceled_at = Some(august.start + 10);
        let mut c2 = subscription("sub_c2", "cus_c", SubscriptionStatus::Canceled, 0);
        c2.canceled_at = Some(august.end);
        let mut stranger = subscription("sub_x", "cus_x", SubscriptionStatus::Canceled, 0);
        stranger.canceled_at = Some(august.start + 10);
        let subs = vec![c1, c2, stranger];
        let paid: HashSet<&str> = ["cus_a", "cus_b", "cus_c"].into_iter().collect();

        let chart = acquisition_chart(&bins, &first_paid, &subs, &paid);
        assert_eq!((chart[0].new, chart[0].churned), (1, 0));
        assert_eq!((chart[1].new, chart[1].churned), (1, 1));
    }

    #[test]
    fn revenue_follows_subscriptions_alive_at_month_end() {
        let bins = bins();
        let (july, august) = (bins[0], bins[1]);

        let early = subscription("sub_a", "cus_a", SubscriptionStatus::Active, july.start);
        let mut late = subscription("sub_b", "cus_b", SubscriptionStatus::Active, august.start);
        late.items.push(early.items[0].clone());
        let mut gone = subscription("sub_c", "cus_c", SubscriptionStatus::Canceled, july.start);
        gone.canceled_at = Some(july.end);
        let subs = vec![early, late, gone];
        let paid: HashSet<&str> = ["cus_a", "cus_b", "cus_c"].into_iter().collect();

        let chart = revenue_chart(&bins, &subs, &paid);
        assert_eq!(chart[0].revenue, 5000.0);
        assert_eq!(chart[0].customers, 1);
        // Only the first item of a subscription is charted.
        assert_eq!(chart[1].revenue, 10_000.0);
        assert_eq!(chart[1].customers, 2);
    }
}
