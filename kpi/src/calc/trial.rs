use std::collections::HashSet;

use crate::models::{Subscription, SubscriptionStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrialCounts {
    pub started: usize,
    pub active: usize,
    pub converted: usize,
    pub canceled: usize,
}

impl TrialCounts {
    /// Converted over decided trials (converted plus canceled), `0` when none are decided.
    pub fn conversion_rate(&self) -> f64 {
        let decided = self.converted + self.canceled;
        if decided == 0 {
            return 0.0;
        }
        self.converted as f64 / decided as f64
    }
}

/// Buckets the trial cohort. A trial may land in none of the buckets
/// (a lapsed trial that never paid and was not canceled).
pub fn trial_funnel(
    cohort: &[&Subscription],
    paid_positive: &HashSet<&str>,
    now: i64,
) -> TrialCounts {
    cohort.iter().fold(
        TrialCounts {
            started: cohort.len(),
            ..TrialCounts::default()
        },
        |mut counts, sub| {
            let paid = paid_positive.contains(sub.customer_id.as_str());
            if paid {
                counts.converted += 1;
            } else if matches!(
                sub.status,
                SubscriptionStatus::Canceled | SubscriptionStatus::IncompleteExpired
            ) {
                counts.canceled += 1;
            } else if sub.status == SubscriptionStatus::Trialing
                && sub.trial_end.is_some_and(|end| end > now)
            {
                counts.active += 1;
            }
            counts
        },
    )
}
