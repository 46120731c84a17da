pub mod cohort;
pub mod engine;
pub mod error;
pub mod models;
pub mod normalize;
pub mod period;
pub mod report;
pub mod series;

pub mod calc {
    pub mod cash_flow;
    pub mod plans;
    pub mod retention;
    pub mod revenue;
    pub mod trial;
}

#[cfg(test)]
mod testing;

pub use cohort::PlanFilter;
pub use engine::{KpiOptions, compute_kpis};
pub use error::{KpiError, Res};
pub use normalize::{ProductCatalog, normalize_invoices, normalize_subscriptions, unresolved_product_ids};
pub use period::DateRange;
pub use report::KpiReport;
