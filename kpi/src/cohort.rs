//! Named customer and subscription sets shared by every calculator.
//!
//! All sets are recomputed per call from the same snapshot so that every metric
//! agrees on who is paying, who was active at the start of the window and who churned.

use std::collections::HashSet;

use crate::models::{Invoice, Subscription, SubscriptionStatus};
use crate::period::DateRange;

/// Restricts the paying cohort to subscriptions carrying one product.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlanFilter {
    #[default]
    All,
    Named(String),
}

impl PlanFilter {
    /// `"all"` (or an empty value) selects every plan; anything else is an exact product name.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == "all" {
            PlanFilter::All
        } else {
            PlanFilter::Named(value.to_string())
        }
    }

    pub fn matches(&self, sub: &Subscription) -> bool {
        match self {
            PlanFilter::All => true,
            PlanFilter::Named(name) => sub.has_plan(name),
        }
    }
}

/// Customers with at least one paid invoice, whatever its amount or date.
pub fn paid_customer_ids(invoices: &[Invoice]) -> HashSet<&str> {
    invoices
        .iter()
        .filter(|inv| inv.is_paid())
        .map(|inv| inv.customer_id.as_str())
        .collect()
}

/// Customers with at least one paid invoice of a positive total.
pub fn paid_customer_ids_positive(invoices: &[Invoice]) -> HashSet<&str> {
    invoices
        .iter()
        .filter(|inv| inv.is_paid() && inv.total > 0)
        .map(|inv| inv.customer_id.as_str())
        .collect()
}

/// Subscriptions currently generating revenue for paying customers.
///
/// A canceled subscription still counts until its paid-for period ends.
pub fn paying_subscriptions<'a>(
    subscriptions: &'a [Subscription],
    paid_customers: &HashSet<&str>,
    plan: &PlanFilter,
    now: i64,
) -> Vec<&'a Subscription> {
    subscriptions
        .iter()
        .filter(|sub| paid_customers.contains(sub.customer_id.as_str()))
        .filter(|sub| {
            sub.status.is_billing()
                || (sub.status == SubscriptionStatus::Canceled && sub.current_period_end > now)
        })
        .filter(|sub| plan.matches(sub))
        .collect()
}

/// Paying customers holding a billing subscription that already existed at `range.start`.
pub fn customers_active_at_start<'a>(
    subscriptions: &'a [Subscription],
    paid_customers: &HashSet<&str>,
    range: &DateRange,
) -> HashSet<&'a str> {
    subscriptions
        .iter()
        .filter(|sub| paid_customers.contains(sub.customer_id.as_str()))
        .filter(|sub| sub.status.is_billing() && sub.alive_at(range.start))
        .map(|sub| sub.customer_id.as_str())
        .collect()
}

/// Canceled subscriptions whose cancellation falls in the window, limited to
/// customers that were active when the window opened. Keyed by subscription.
pub fn churned_in_range<'a>(
    subscriptions: &'a [Subscription],
    paid_customers: &HashSet<&str>,
    active_at_start: &HashSet<&str>,
    range: &DateRange,
) -> Vec<&'a Subscription> {
    subscriptions
        .iter()
        .filter(|sub| paid_customers.contains(sub.customer_id.as_str()))
        .filter(|sub| sub.status == SubscriptionStatus::Canceled)
        .filter(|sub| range.contains_opt(sub.canceled_at))
        .filter(|sub| active_at_start.contains(sub.customer_id.as_str()))
        .collect()
}

/// Subscriptions whose trial began inside the window.
pub fn trial_cohort<'a>(subscriptions: &'a [Subscription], range: &DateRange) -> Vec<&'a Subscription> {
    subscriptions
        .iter()
        .filter(|sub| range.contains_opt(sub.trial_start))
        .collect()
}

/// Every cohort for one window, computed once and borrowed by the calculators.
#[derive(Debug)]
pub struct Cohorts<'a> {
    pub paid_customer_ids: HashSet<&'a str>,
    pub paid_customer_ids_positive: HashSet<&'a str>,
    pub paying_subscriptions: Vec<&'a Subscription>,
    pub customers_active_at_start: HashSet<&'a str>,
    pub churned_in_range: Vec<&'a Subscription>,
    pub trial_cohort: Vec<&'a Subscription>,
}

impl<'a> Cohorts<'a> {
    pub fn classify(
        subscriptions: &'a [Subscription],
        invoices: &'a [Invoice],
        range: &DateRange,
        plan: &PlanFilter,
        now: i64,
    ) -> Self {
        let paid = paid_customer_ids(invoices);
        let paid_positive = paid_customer_ids_positive(invoices);
        let paying = paying_subscriptions(subscriptions, &paid, plan, now);
        let active_at_start = customers_active_at_start(subscriptions, &paid, range);
        let churned = churned_in_range(subscriptions, &paid, &active_at_start, range);
        let trials = trial_cohort(subscriptions, range);

        log::debug!(
            "Cohorts: paid={} paid_positive={} paying_subs={} active_at_start={} churned_subs={} trials={}",
            paid.len(),
            paid_positive.len(),
            paying.len(),
            active_at_start.len(),
            churned.len(),
            trials.len()
        );

        Cohorts {
            paid_customer_ids: paid,
            paid_customer_ids_positive: paid_positive,
            paying_subscriptions: paying,
            customers_active_at_start: active_at_start,
            churned_in_range: churned,
            trial_cohort: trials,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{invoice, named_subscription, subscription};

    const NOW: i64 = 1_000_000;

    fn window() -> DateRange {
        DateRange::new(500_000, 900_000).unwrap()
    }

    #[test]
    fn paid_sets_differ_on_zero_total_invoices() {
        let mut zero = invoice("in_0", "cus_zero", 100, 0);
        zero.total = 0;
        let invoices = vec![invoice("in_1", "cus_a", 100, 5000), zero];

        let paid = paid_customer_ids(&invoices);
        let positive = paid_customer_ids_positive(&invoices);
        assert!(paid.contains("cus_zero"));
        assert!(!positive.contains("cus_zero"));
        assert!(positive.contains("cus_a"));
    }

    #[test]
    fn canceled_subscription_pays_until_period_end() {
        let invoices = vec![invoice("in_1", "cus_a", 100, 5000), invoice("in_2", "cus_b", 100, 5000)];
        let mut still_paid = subscription("sub_a", "cus_a", SubscriptionStatus::Canceled, 100);
        still_paid.canceled_at = Some(NOW - 10);
        still_paid.current_period_end = NOW + 10;
        let mut expired = subscription("sub_b", "cus_b", SubscriptionStatus::Canceled, 100);
        expired.canceled_at = Some(NOW - 10);
        expired.current_period_end = NOW - 1;
        let unpaid = subscription("sub_c", "cus_nobody", SubscriptionStatus::Active, 100);
        let subs = vec![still_paid, expired, unpaid];

        let paid = paid_customer_ids(&invoices);
        let paying = paying_subscriptions(&subs, &paid, &PlanFilter::All, NOW);
        let ids: Vec<&str> = paying.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["sub_a"]);
    }

    #[test]
    fn plan_filter_requires_an_item_with_the_exact_name() {
        let invoices = vec![invoice("in_1", "cus_a", 100, 5000), invoice("in_2", "cus_b", 100, 5000)];
        let subs = vec![
            named_subscription("sub_a", "cus_a", "Studio"),
            named_subscription("sub_b", "cus_b", "Agency"),
        ];
        let paid = paid_customer_ids(&invoices);

        let studio = paying_subscriptions(&subs, &paid, &PlanFilter::parse("Studio"), NOW);
        assert_eq!(studio.len(), 1);
        assert_eq!(studio[0].id, "sub_a");
        assert!(paying_subscriptions(&subs, &paid, &PlanFilter::parse("studio"), NOW).is_empty());
        assert_eq!(paying_subscriptions(&subs, &paid, &PlanFilter::parse("all"), NOW).len(), 2);
    }

    #[test]
    fn churn_requires_activity_at_window_start() {
        let range = window();
        let invoices = vec![invoice("in_1", "cus_a", 100, 5000), invoice("in_2", "cus_b", 100, 5000)];

        // cus_a keeps one active subscription and cancels a second one in range.
        let kept = subscription("sub_a1", "cus_a", SubscriptionStatus::Active, 100);
        let mut dropped = subscription("sub_a2", "cus_a", SubscriptionStatus::Canceled, 100);
        dropped.canceled_at = Some(600_000);
        // cus_b only ever had the subscription that was canceled.
        let mut lone = subscription("sub_b", "cus_b", SubscriptionStatus::Canceled, 100);
        lone.canceled_at = Some(600_000);
        let subs = vec![kept, dropped, lone];

        let paid = paid_customer_ids(&invoices);
        let active = customers_active_at_start(&subs, &paid, &range);
        assert_eq!(active.len(), 1);
        assert!(active.contains("cus_a"));

        let churned = churned_in_range(&subs, &paid, &active, &range);
        let ids: Vec<&str> = churned.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["sub_a2"]);
    }

    #[test]
    fn subscriptions_created_after_start_are_not_active_at_start() {
        let range = window();
        let invoices = vec![invoice("in_1", "cus_a", 100, 5000)];
        let subs = vec![subscription("sub_a", "cus_a", SubscriptionStatus::Active, 700_000)];
        let paid = paid_customer_ids(&invoices);
        assert!(customers_active_at_start(&subs, &paid, &range).is_empty());
    }

    #[test]
    fn trial_cohort_is_bounded_by_trial_start() {
        let range = window();
        let mut inside = subscription("sub_in", "cus_a", SubscriptionStatus::Trialing, 100);
        inside.trial_start = Some(range.start);
        let mut outside = subscription("sub_out", "cus_b", SubscriptionStatus::Trialing, 100);
        outside.trial_start = Some(range.end + 1);
        let never = subscription("sub_none", "cus_c", SubscriptionStatus::Active, 100);
        let subs = vec![inside, outside, never];

        let cohort = trial_cohort(&subs, &range);
        assert_eq!(cohort.len(), 1);
        assert_eq!(cohort[0].id, "sub_in");
    }
}
