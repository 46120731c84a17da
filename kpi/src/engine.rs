use chrono::{FixedOffset, Offset, Utc};

use crate::calc::cash_flow::{monthly_revenue, revenue_collected};
use crate::calc::plans::plan_counts;
use crate::calc::retention::{churn_rate, first_paid_invoice_dates, new_customers};
use crate::calc::revenue::{monthly_recurring_revenue, paying_customer_count};
use crate::calc::trial::trial_funnel;
use crate::cohort::{Cohorts, PlanFilter};
use crate::models::{Invoice, Subscription};
use crate::normalize::available_plans;
use crate::period::{DateRange, month_bins};
use crate::report::{KpiReport, MetricSet, assemble};
use crate::series::{acquisition_chart, revenue_chart};

#[derive(Debug, Clone, Copy)]
pub struct KpiOptions {
    /// Time zone the monthly bins are cut in.
    pub utc_offset: FixedOffset,
}

impl Default for KpiOptions {
    fn default() -> Self {
        KpiOptions {
            utc_offset: Utc.fix(),
        }
    }
}

impl KpiOptions {
    /// Offset in minutes east of UTC; out-of-range values fall back to UTC.
    pub fn with_offset_minutes(minutes: i32) -> Self {
        let utc_offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());
        KpiOptions { utc_offset }
    }
}

/// Computes the full report for `range`, with deltas against the preceding window of equal length.
///
/// `now` is the reference instant for "currently paying" and "trial still running".
pub fn compute_kpis(
    subscriptions: &[Subscription],
    invoices: &[Invoice],
    range: &DateRange,
    plan: &PlanFilter,
    now: i64,
    options: &KpiOptions,
) -> KpiReport {
    let current = measure(subscriptions, invoices, range, plan, now, options);
    let previous = measure(subscriptions, invoices, &range.previous(), plan, now, options);

    log::debug!(
        "KPIs {}..{}: mrr={} customers={} churn={:.4} collected={} trials={}",
        range.start,
        range.end,
        current.mrr,
        current.paying_customers,
        current.churn_rate,
        current.revenue_collected,
        current.trials.started
    );

    assemble(current, &previous.figures())
}

fn measure(
    subscriptions: &[Subscription],
    invoices: &[Invoice],
    range: &DateRange,
    plan: &PlanFilter,
    now: i64,
    options: &KpiOptions,
) -> MetricSet {
    let cohorts = Cohorts::classify(subscriptions, invoices, range, plan, now);
    let first_paid = first_paid_invoice_dates(invoices);
    let bins = month_bins(range, options.utc_offset);

    MetricSet {
        range: *range,
        mrr: monthly_recurring_revenue(&cohorts.paying_subscriptions),
        paying_customers: paying_customer_count(&cohorts.paying_subscriptions),
        churn_rate: churn_rate(&cohorts.churned_in_range, &cohorts.customers_active_at_start),
        new_customers: new_customers(&first_paid, range),
        revenue_collected: revenue_collected(invoices, range),
        plan_counts: plan_counts(&cohorts.paying_subscriptions),
        acquisition: acquisition_chart(&bins, &first_paid, subscriptions, &cohorts.paid_customer_ids),
        revenue_series: revenue_chart(&bins, subscriptions, &cohorts.paid_customer_ids),
        monthly_revenue: monthly_revenue(invoices, subscriptions, &bins),
        trials: trial_funnel(&cohorts.trial_cohort, &cohorts.paid_customer_ids_positive, now),
        available_plans: available_plans(subscriptions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_minutes_are_validated() {
        assert_eq!(
            KpiOptions::with_offset_minutes(120).utc_offset.local_minus_utc(),
            7200
        );
        assert_eq!(
            KpiOptions::with_offset_minutes(-300).utc_offset.local_minus_utc(),
            -18_000
        );
        assert_eq!(
            KpiOptions::with_offset_minutes(24 * 60).utc_offset.local_minus_utc(),
            0
        );
        assert_eq!(KpiOptions::default().utc_offset.local_minus_utc(), 0);
    }
}
