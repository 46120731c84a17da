use common::error::{AppError, Res};
use kpi::{DateRange, PlanFilter};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct KpiQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub plan: Option<String>,
}

/// A validated KPI query.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiRequest {
    pub range: DateRange,
    pub plan: PlanFilter,
}

impl KpiQuery {
    /// Both dates are required; `plan` defaults to every plan.
    pub fn validate(&self) -> Res<KpiRequest> {
        let start = required(&self.start, "start")?;
        let end = required(&self.end, "end")?;
        let range =
            DateRange::parse(start, end).map_err(|e| AppError::BadRequest(e.to_string()))?;

        Ok(KpiRequest {
            range,
            plan: PlanFilter::parse(self.plan.as_deref().unwrap_or_default()),
        })
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Res<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(AppError::BadRequest(format!(
            "Missing required query parameter: {}",
            name
        ))),
    }
}
