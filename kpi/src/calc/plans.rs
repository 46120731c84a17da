use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::Subscription;

/// One row of the plan breakdown table.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanShare {
    pub plan: String,
    pub users: u64,
    pub percent: String,
}

/// Counts paying subscription items by product name.
pub fn plan_counts(paying: &[&Subscription]) -> BTreeMap<String, u64> {
    paying
        .iter()
        .flat_map(|sub| sub.items.iter())
        .fold(BTreeMap::new(), |mut counts, item| {
            *counts
                .entry(item.price.product.plan_name().to_string())
                .or_insert(0) += 1;
            counts
        })
}

/// Plans ordered by descending count, ties by name, each with its share of all counted items.
pub fn plan_breakdown(counts: &BTreeMap<String, u64>) -> Vec<PlanShare> {
    let total: u64 = counts.values().sum();

    let mut shares: Vec<PlanShare> = counts
        .iter()
        .map(|(plan, users)| PlanShare {
            plan: plan.clone(),
            users: *users,
            percent: format_percent(*users, total),
        })
        .collect();

    shares.sort_by(|a, b| match b.users.cmp(&a.users) {
        Ordering::Equal => a.plan.cmp(&b.plan),
        other => other,
    });
    shares
}

fn format_percent(part: u64, total: u64) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{:.1}%", part as f64 / total as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNNAMED_PLAN;
    use crate::testing::named_subscription;

    #[test]
    fn counts_every_item_by_product_name() {
        let studio = named_subscription("sub_1", "cus_a", "Studio");
        let mut agency = named_subscription("sub_2", "cus_b", "Agency");
        let extra = named_subscription("x", "cus_b", "Studio").items.remove(0);
        agency.items.push(extra);
        let mut unnamed = named_subscription("sub_3", "cus_c", "ignored");
        unnamed.items[0].price.product.name = None;

        let counts = plan_counts(&[&studio, &agency, &unnamed]);
        assert_eq!(counts["Studio"], 2);
        assert_eq!(counts["Agency"], 1);
        assert_eq!(counts[UNNAMED_PLAN], 1);
    }

    #[test]
    fn breakdown_is_sorted_with_one_decimal_percentages() {
        let counts: BTreeMap<String, u64> = [
            ("Agency".to_string(), 1),
            ("Basic".to_string(), 1),
            ("Studio".to_string(), 4),
        ]
        .into_iter()
        .collect();

        let rows = plan_breakdown(&counts);
        let plans: Vec<&str> = rows.iter().map(|r| r.plan.as_str()).collect();
        assert_eq!(plans, vec!["Studio", "Agency", "Basic"]);
        assert_eq!(rows[0].percent, "66.7%");
        assert_eq!(rows[1].percent, "16.7%");
    }

    #[test]
    fn empty_counts_give_an_empty_breakdown() {
        assert!(plan_breakdown(&BTreeMap::new()).is_empty());
        assert_eq!(format_percent(0, 0), "0%");
    }
}
