//! Response assembly. Unit conversion and rounding happen here and nowhere else.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::calc::cash_flow::MonthRevenue;
use crate::calc::plans::{PlanShare, plan_breakdown};
use crate::calc::retention::lifetime_value;
use crate::calc::revenue::arpa;
use crate::calc::trial::TrialCounts;
use crate::period::{CHART_LABEL_FORMAT, DATE_FORMAT, DateRange, TABLE_LABEL_FORMAT};
use crate::series::{AcquisitionPoint, RevenuePoint};

const MINOR_UNITS_PER_MAJOR: f64 = 100.0;

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn to_major(minor: f64) -> f64 {
    minor / MINOR_UNITS_PER_MAJOR
}

/// Percent change from `previous` to `current`, one decimal.
///
/// A zero baseline reports `100` for any growth and `0` when both are zero.
pub fn get_delta(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current == 0.0 { 0.0 } else { 100.0 };
    }
    round1((current - previous) / previous * 100.0)
}

/// Everything the calculators produce for one window, before presentation.
#[derive(Debug, Clone)]
pub struct MetricSet {
    pub range: DateRange,
    /// Minor units.
    pub mrr: f64,
    pub paying_customers: usize,
    pub churn_rate: f64,
    pub new_customers: usize,
    /// Minor units.
    pub revenue_collected: i64,
    pub plan_counts: BTreeMap<String, u64>,
    pub acquisition: Vec<AcquisitionPoint>,
    pub revenue_series: Vec<RevenuePoint>,
    pub monthly_revenue: Vec<MonthRevenue>,
    pub trials: TrialCounts,
    pub available_plans: Vec<String>,
}

/// The range-dependent figures compared between two windows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodFigures {
    pub churn_rate: f64,
    pub ltv: f64,
    pub new_customers: f64,
    pub revenue_collected: f64,
    pub trials_started: f64,
}

impl PeriodFigures {
    pub fn delta(&self, previous: &PeriodFigures) -> Deltas {
        Deltas {
            churn_rate: get_delta(self.churn_rate, previous.churn_rate),
            ltv: get_delta(self.ltv, previous.ltv),
            new_this_period: get_delta(self.new_customers, previous.new_customers),
            revenue_collected: get_delta(self.revenue_collected, previous.revenue_collected),
            trials_started: get_delta(self.trials_started, previous.trials_started),
        }
    }
}

impl MetricSet {
    /// Presented ARPA, major units rounded to cents.
    fn arpa(&self) -> f64 {
        round2(arpa(to_major(self.mrr), self.paying_customers))
    }

    /// Derived from the presented ARPA, so `ltv == arpa * 24` holds on the output when nobody churned.
    fn ltv(&self) -> f64 {
        lifetime_value(self.arpa(), self.churn_rate)
    }

    /// Presented (rounded) values of the figures that get a period delta.
    pub fn figures(&self) -> PeriodFigures {
        PeriodFigures {
            churn_rate: round2(self.churn_rate * 100.0),
            ltv: round2(self.ltv()),
            new_customers: self.new_customers as f64,
            revenue_collected: round2(to_major(self.revenue_collected as f64)),
            trials_started: self.trials.started as f64,
        }
    }
}

// === RESPONSE SHAPES ===

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiReport {
    pub period: Period,
    pub revenue_retention: RevenueRetention,
    pub summary_stats: SummaryStats,
    pub growth: Growth,
    pub cash_flow: CashFlow,
    pub trial_funnel: TrialFunnel,
    pub deltas: Deltas,
    pub available_plans: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Period {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueRetention {
    pub mrr: f64,
    pub arr: f64,
    pub ltv: f64,
    /// Percent.
    pub churn_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub arpa: f64,
    pub total_customers: usize,
    pub new_this_period: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Growth {
    pub plan_distribution: PlanDistribution,
    pub plan_breakdown: Vec<PlanRow>,
    pub customer_acquisition_chart: Vec<AcquisitionRow>,
    pub revenue_customer_chart: Vec<RevenueRow>,
}

/// Serialized as one object: a counter per plan name plus `total`.
///
/// A plan literally named `total` is shadowed by the overall count.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanDistribution {
    pub counts: BTreeMap<String, u64>,
    pub total: usize,
}

impl Serialize for PlanDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (plan, count) in self.counts.iter().filter(|(plan, _)| plan.as_str() != "total") {
            map.serialize_entry(plan, count)?;
        }
        map.serialize_entry("total", &self.total)?;
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanRow {
    pub plan: String,
    pub users: u64,
    pub percent: String,
}

impl From<PlanShare> for PlanRow {
    fn from(share: PlanShare) -> Self {
        PlanRow {
            plan: share.plan,
            users: share.users,
            percent: share.percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcquisitionRow {
    pub month: String,
    pub new: usize,
    pub churned: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueRow {
    pub month: String,
    pub revenue: f64,
    pub customers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlow {
    pub revenue_collected: f64,
    pub monthly_revenue_data: Vec<MonthlyRevenueRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenueRow {
    pub month: String,
    pub revenue: f64,
    pub invoice_count: usize,
    pub monthly_plans: f64,
    pub annual_plans: f64,
    pub one_time_charges: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialFunnel {
    pub trials_started: usize,
    pub active_trials: usize,
    pub converted_to_paid: usize,
    pub canceled_trials: usize,
    /// Fraction, unrounded.
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deltas {
    pub churn_rate: f64,
    pub ltv: f64,
    pub new_this_period: f64,
    pub revenue_collected: f64,
    pub trials_started: f64,
}

fn minor_to_money(minor: i64) -> f64 {
    round2(to_major(minor as f64))
}

/// Builds the response from already-computed metrics for the current and previous windows.
pub fn assemble(current: MetricSet, previous: &PeriodFigures) -> KpiReport {
    let figures = current.figures();
    let deltas = figures.delta(previous);

    let mrr = round2(to_major(current.mrr));
    let arpa = current.arpa();

    let period = Period {
        start: format_day(current.range.start_date()),
        end: format_day(current.range.end_date()),
    };

    let plan_breakdown = plan_breakdown(&current.plan_counts)
        .into_iter()
        .map(PlanRow::from)
        .collect();

    let customer_acquisition_chart = current
        .acquisition
        .iter()
        .map(|point| AcquisitionRow {
            month: point.bin.label(CHART_LABEL_FORMAT),
            new: point.new,
            churned: point.churned,
        })
        .collect();

    let revenue_customer_chart = current
        .revenue_series
        .iter()
        .map(|point| RevenueRow {
            month: point.bin.label(CHART_LABEL_FORMAT),
            revenue: round2(to_major(point.revenue)),
            customers: point.customers,
        })
        .collect();

    let monthly_revenue_data = current
        .monthly_revenue
        .iter()
        .map(|month| MonthlyRevenueRow {
            month: month.bin.label(TABLE_LABEL_FORMAT),
            revenue: minor_to_money(month.revenue),
            invoice_count: month.invoice_count,
            monthly_plans: minor_to_money(month.monthly_plans),
            annual_plans: minor_to_money(month.annual_plans),
            one_time_charges: minor_to_money(month.one_time_charges),
        })
        .collect();

    KpiReport {
        period,
        revenue_retention: RevenueRetention {
            mrr,
            arr: round2(mrr * 12.0),
            ltv: figures.ltv,
            churn_rate: figures.churn_rate,
        },
        summary_stats: SummaryStats {
            arpa,
            total_customers: current.paying_customers,
            new_this_period: current.new_customers,
        },
        growth: Growth {
            plan_distribution: PlanDistribution {
                counts: current.plan_counts,
                total: current.paying_customers,
            },
            plan_breakdown,
            customer_acquisition_chart,
            revenue_customer_chart,
        },
        cash_flow: CashFlow {
            revenue_collected: figures.revenue_collected,
            monthly_revenue_data,
        },
        trial_funnel: TrialFunnel {
            trials_started: current.trials.started,
            active_trials: current.trials.active,
            converted_to_paid: current.trials.converted,
            canceled_trials: current.trials.canceled,
            conversion_rate: current.trials.conversion_rate(),
        },
        deltas,
        available_plans: current.available_plans,
    }
}

fn format_day(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}
