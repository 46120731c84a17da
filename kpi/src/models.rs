use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KpiError;

/// Plan label used when a price has no resolvable product name.
pub const UNNAMED_PLAN: &str = "Unnamed Plan";

/// A reference the billing provider either returns as a bare id or expands in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Ref<T> {
    Id(String),
    Expanded(T),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: Option<String>,
}

impl Product {
    pub fn plan_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED_PLAN)
    }
}

impl Ref<Customer> {
    pub fn id(&self) -> &str {
        match self {
            Ref::Id(id) => id,
            Ref::Expanded(customer) => &customer.id,
        }
    }
}

impl Ref<Product> {
    pub fn id(&self) -> &str {
        match self {
            Ref::Id(id) => id,
            Ref::Expanded(product) => &product.id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Canceled,
    Trialing,
    Incomplete,
    IncompleteExpired,
    Unpaid,
    Paused,
}

impl SubscriptionStatus {
    /// Statuses that count as currently billing.
    pub fn is_billing(self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::PastDue)
    }
}

impl FromStr for SubscriptionStatus {
    type Err = KpiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "past_due" => Ok(SubscriptionStatus::PastDue),
            "canceled" => Ok(SubscriptionStatus::Canceled),
            "trialing" => Ok(SubscriptionStatus::Trialing),
            "incomplete" => Ok(SubscriptionStatus::Incomplete),
            "incomplete_expired" => Ok(SubscriptionStatus::IncompleteExpired),
            "unpaid" => Ok(SubscriptionStatus::Unpaid),
            "paused" => Ok(SubscriptionStatus::Paused),
            other => Err(KpiError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Open,
    Paid,
    Uncollectible,
    Void,
}

impl FromStr for InvoiceStatus {
    type Err = KpiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(InvoiceStatus::Draft),
            "open" => Ok(InvoiceStatus::Open),
            "paid" => Ok(InvoiceStatus::Paid),
            "uncollectible" => Ok(InvoiceStatus::Uncollectible),
            "void" => Ok(InvoiceStatus::Void),
            other => Err(KpiError::UnknownInvoiceStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interval {
    Day,
    Week,
    Month,
    Year,
}

impl FromStr for Interval {
    type Err = KpiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Interval::Day),
            "week" => Ok(Interval::Week),
            "month" => Ok(Interval::Month),
            "year" => Ok(Interval::Year),
            other => Err(KpiError::UnknownInterval(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Recurring {
    pub interval: Interval,
    pub interval_count: u32,
}

impl Recurring {
    pub fn monthly() -> Self {
        Recurring {
            interval: Interval::Month,
            interval_count: 1,
        }
    }

    pub fn yearly() -> Self {
        Recurring {
            interval: Interval::Year,
            interval_count: 1,
        }
    }

    /// Converts a per-period amount (minor units) into its monthly equivalent.
    ///
    /// Yearly prices are divided by 12; every other interval is taken as-is.
    /// The result is then spread over `interval_count` periods.
    pub fn monthly_amount(&self, unit_amount: i64) -> f64 {
        let per_period = match self.interval {
            Interval::Year => unit_amount as f64 / 12.0,
            _ => unit_amount as f64,
        };
        per_period / f64::from(self.interval_count.max(1))
    }

    /// Interval used for cash-flow categorization; only month and year qualify.
    pub fn plan_kind(&self) -> Option<PlanKind> {
        match self.interval {
            Interval::Month => Some(PlanKind::Monthly),
            Interval::Year => Some(PlanKind::Annual),
            Interval::Day | Interval::Week => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanKind {
    Monthly,
    Annual,
}

// === RAW PROVIDER SHAPES ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPrice {
    pub unit_amount: i64,
    pub recurring: Option<Recurring>,
    pub product: Option<Ref<Product>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSubscriptionItem {
    pub price: RawPrice,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSubscription {
    pub id: String,
    pub customer: Ref<Customer>,
    pub status: SubscriptionStatus,
    pub created_at: i64,
    pub canceled_at: Option<i64>,
    pub current_period_end: i64,
    pub trial_start: Option<i64>,
    pub trial_end: Option<i64>,
    pub items: Vec<RawSubscriptionItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInvoice {
    pub id: String,
    pub customer: Ref<Customer>,
    pub status: InvoiceStatus,
    pub created_at: i64,
    pub amount_paid: i64,
    pub total: i64,
    pub subscription: Option<String>,
    pub lines: Vec<InvoiceLine>,
}

// === NORMALIZED SHAPES ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub unit_amount: i64,
    pub recurring: Option<Recurring>,
    pub product: Product,
}

impl Price {
    pub fn monthly_amount(&self) -> f64 {
        self.recurring
            .map(|r| r.monthly_amount(self.unit_amount))
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionItem {
    pub price: Price,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub customer_id: String,
    pub status: SubscriptionStatus,
    pub created_at: i64,
    pub canceled_at: Option<i64>,
    pub current_period_end: i64,
    pub trial_start: Option<i64>,
    pub trial_end: Option<i64>,
    pub items: Vec<SubscriptionItem>,
}

impl Subscription {
    pub fn first_item(&self) -> Option<&SubscriptionItem> {
        self.items.first()
    }

    /// Monthly cost of the first item, the figure the growth chart tracks per subscription.
    pub fn first_item_monthly_amount(&self) -> f64 {
        self.first_item()
            .map(|item| item.price.monthly_amount())
            .unwrap_or(0.0)
    }

    pub fn first_item_plan_kind(&self) -> Option<PlanKind> {
        self.first_item()
            .and_then(|item| item.price.recurring)
            .and_then(|r| r.plan_kind())
    }

    pub fn has_plan(&self, plan_name: &str) -> bool {
        self.items
            .iter()
            .any(|item| item.price.product.name.as_deref() == Some(plan_name))
    }

    /// True if the subscription was still alive at `ts`.
    pub fn alive_at(&self, ts: i64) -> bool {
        self.created_at <= ts && self.canceled_at.is_none_or(|canceled| canceled > ts)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub amount: i64,
    pub recurring: Option<Recurring>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub customer_id: String,
    pub status: InvoiceStatus,
    pub created_at: i64,
    pub amount_paid: i64,
    pub total: i64,
    pub subscription_id: Option<String>,
    pub lines: Vec<InvoiceLine>,
}

impl Invoice {
    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yearly_price_is_spread_over_twelve_months() {
        assert_eq!(Recurring::yearly().monthly_amount(120_000), 10_000.0);
        assert_eq!(Recurring::monthly().monthly_amount(5_000), 5_000.0);
    }

    #[test]
    fn interval_count_divides_the_monthly_amount() {
        let quarterly = Recurring {
            interval: Interval::Month,
            interval_count: 3,
        };
        assert_eq!(quarterly.monthly_amount(30_000), 10_000.0);

        let biennial = Recurring {
            interval: Interval::Year,
            interval_count: 2,
        };
        assert_eq!(biennial.monthly_amount(240_000), 10_000.0);
    }

    #[test]
    fn parses_provider_statuses() {
        assert_eq!(
            "incomplete_expired".parse::<SubscriptionStatus>(),
            Ok(SubscriptionStatus::IncompleteExpired)
        );
        assert_eq!(
            "bogus".parse::<SubscriptionStatus>(),
            Err(KpiError::UnknownStatus("bogus".to_string()))
        );
        assert_eq!("paid".parse::<InvoiceStatus>(), Ok(InvoiceStatus::Paid));
        assert_eq!("week".parse::<Interval>(), Ok(Interval::Week));
    }

    #[test]
    fn missing_product_name_falls_back_to_unnamed_plan() {
        let product = Product {
            id: "prod_1".to_string(),
            name: None,
        };
        assert_eq!(product.plan_name(), UNNAMED_PLAN);
    }
}
