//! Relationship between discount level and acceptance.

use serde::{Deserialize, Serialize};

use crate::analyzer::mean;
use crate::domain::QuoteRecord;

/// Fixed bucket edges for the headline sensitivity table. Buckets are
/// half-open `(lo, hi]`, except the first which includes its lower edge so a
/// 0% discount is not dropped.
const BUCKET_EDGES: [(f64, f64, &str); 7] = [
    (0.0, 5.0, "0-5%"),
    (5.0, 10.0, "5-10%"),
    (10.0, 15.0, "10-15%"),
    (15.0, 20.0, "15-20%"),
    (20.0, 25.0, "20-25%"),
    (25.0, 30.0, "25-30%"),
    (30.0, 100.0, "30%+"),
];

/// Number of equal-width bins used to locate the best observed range.
const OPTIMAL_RANGE_BINS: usize = 20;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BucketStat {
    pub label: String,
    pub total_quotes: usize,
    pub accepted_quotes: usize,
    pub acceptance_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimalRange {
    pub low: f64,
    pub high: f64,
    pub acceptance_rate: f64,
    pub sample_size: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscountSensitivity {
    /// Non-empty fixed buckets, in edge order.
    pub buckets: Vec<BucketStat>,
    /// Pearson correlation between discount and acceptance; `None` when
    /// either side has zero variance.
    pub correlation: Option<f64>,
    pub optimal_range: Option<OptimalRange>,
    pub insights: Vec<String>,
}

pub fn discount_sensitivity(quotes: &[QuoteRecord]) -> DiscountSensitivity {
    let buckets = bucket_stats(quotes);
    let correlation = discount_acceptance_correlation(quotes);
    let optimal_range = optimal_discount_range(quotes);
    let insights = generate_insights(&buckets);

    DiscountSensitivity { buckets, correlation, optimal_range, insights }
}

fn bucket_stats(quotes: &[QuoteRecord]) -> Vec<BucketStat> {
    let mut counts = [(0usize, 0usize); BUCKET_EDGES.len()];

    for quote in quotes {
        let discount = quote.discount_offered;
        let index = BUCKET_EDGES.iter().position(|(low, high, _)| {
            (discount > *low || (*low == 0.0 && discount == 0.0)) && discount <= *high
        });
        if let Some(index) = index {
            counts[index].0 += 1;
            if quote.accepted {
                counts[index].1 += 1;
            }
        }
    }

    BUCKET_EDGES
        .iter()
        .zip(counts.iter())
        .filter(|(_, (total, _))| *total > 0)
        .map(|((_, _, label), (total, accepted))| BucketStat {
            label: (*label).to_string(),
            total_quotes: *total,
            accepted_quotes: *accepted,
            acceptance_rate: *accepted as f64 / *total as f64,
        })
        .collect()
}

fn discount_acceptance_correlation(quotes: &[QuoteRecord]) -> Option<f64> {
    if quotes.len() < 2 {
        return None;
    }

    let discounts: Vec<f64> = quotes.iter().map(|quote| quote.discount_offered).collect();
    let outcomes: Vec<f64> =
        quotes.iter().map(|quote| if quote.accepted { 1.0 } else { 0.0 }).collect();

    let discount_mean = mean(&discounts)?;
    let outcome_mean = mean(&outcomes)?;

    let mut covariance = 0.0;
    let mut discount_var = 0.0;
    let mut outcome_var = 0.0;
    for (discount, outcome) in discounts.iter().zip(outcomes.iter()) {
        let dd = discount - discount_mean;
        let od = outcome - outcome_mean;
        covariance += dd * od;
        discount_var += dd * dd;
        outcome_var += od * od;
    }

    if discount_var == 0.0 || outcome_var == 0.0 {
        return None;
    }

    Some(covariance / (discount_var.sqrt() * outcome_var.sqrt()))
}

/// Best-performing discount band over equal-width bins spanning the observed
/// discounts. Ties go to the lower band.
fn optimal_discount_range(quotes: &[QuoteRecord]) -> Option<OptimalRange> {
    if quotes.is_empty() {
        return None;
    }

    let min = quotes.iter().map(|quote| quote.discount_offered).fold(f64::INFINITY, f64::min);
    let max = quotes.iter().map(|quote| quote.discount_offered).fold(f64::NEG_INFINITY, f64::max);

    if min == max {
        let accepted = quotes.iter().filter(|quote| quote.accepted).count();
        return Some(OptimalRange {
            low: min,
            high: max,
            acceptance_rate: accepted as f64 / quotes.len() as f64,
            sample_size: quotes.len(),
        });
    }

    let width = (max - min) / OPTIMAL_RANGE_BINS as f64;
    let mut bins = [(0usize, 0usize); OPTIMAL_RANGE_BINS];
    for quote in quotes {
        let index = (((quote.discount_offered - min) / width) as usize).min(OPTIMAL_RANGE_BINS - 1);
        bins[index].0 += 1;
        if quote.accepted {
            bins[index].1 += 1;
        }
    }

    bins.iter()
        .enumerate()
        .filter(|(_, (total, _))| *total > 0)
        .map(|(index, (total, accepted))| OptimalRange {
            low: min + index as f64 * width,
            high: min + (index + 1) as f64 * width,
            acceptance_rate: *accepted as f64 / *total as f64,
            sample_size: *total,
        })
        .max_by(|a, b| a.acceptance_rate.total_cmp(&b.acceptance_rate).then(b.low.total_cmp(&a.low)))
}

fn generate_insights(buckets: &[BucketStat]) -> Vec<String> {
    let mut insights = Vec::new();

    let Some(best) = buckets
        .iter()
        .max_by(|a, b| a.acceptance_rate.total_cmp(&b.acceptance_rate))
    else {
        return insights;
    };

    insights.push(format!(
        "highest acceptance rate ({:.1}%) in the {} discount range",
        best.acceptance_rate * 100.0,
        best.label
    ));

    let high_acceptance = buckets.iter().filter(|bucket| bucket.acceptance_rate > 0.6).count();
    if high_acceptance > 0 {
        insights.push(format!(
            "{high_acceptance} discount range(s) show high acceptance rates (>60%)"
        ));
    }

    if let Some(most_popular) =
        buckets.iter().max_by_key(|bucket| bucket.total_quotes).filter(|bucket| bucket.label != best.label)
    {
        insights.push(format!(
            "most popular discount range ({}) has a {:.1}% acceptance rate",
            most_popular.label,
            most_popular.acceptance_rate * 100.0
        ));
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::discount_sensitivity;
    use crate::analyzer::fixtures::quote;
    use crate::domain::ShipmentType;

    const ROUTE: (&str, &str, &str, &str) = ("usa", "lax", "germany", "ham");

    fn quote_at(discount: f64, accepted: bool) -> crate::domain::QuoteRecord {
        quote("A", "2024-01-01", ShipmentType::Air, "general", ROUTE, discount, accepted)
    }

    #[test]
    fn buckets_cover_edges_including_zero() {
        let quotes = vec![
            quote_at(0.0, true),
            quote_at(5.0, true),
            quote_at(5.5, false),
            quote_at(30.0, false),
            quote_at(45.0, true),
        ];

        let sensitivity = discount_sensitivity(&quotes);
        let labels: Vec<&str> =
            sensitivity.buckets.iter().map(|bucket| bucket.label.as_str()).collect();
        assert_eq!(labels, vec!["0-5%", "5-10%", "25-30%", "30%+"]);

        // Both 0.0 and 5.0 land in the first bucket.
        assert_eq!(sensitivity.buckets[0].total_quotes, 2);
        assert_eq!(sensitivity.buckets[0].acceptance_rate, 1.0);
    }

    #[test]
    fn correlation_sign_tracks_the_relationship() {
        // Higher discounts accepted, lower rejected: positive correlation.
        let positive = vec![
            quote_at(5.0, false),
            quote_at(10.0, false),
            quote_at(20.0, true),
            quote_at(25.0, true),
        ];
        let r = discount_sensitivity(&positive).correlation.expect("defined");
        assert!(r > 0.9, "correlation {r}");

        // Uniform outcomes: zero variance, no correlation defined.
        let uniform = vec![quote_at(5.0, true), quote_at(25.0, true)];
        assert_eq!(discount_sensitivity(&uniform).correlation, None);
    }

    #[test]
    fn optimal_range_finds_the_best_band() {
        let mut quotes = Vec::new();
        // Discounts 0..20 rejected, 20..=30 accepted.
        for d in 0..=30 {
            quotes.push(quote_at(d as f64, d >= 20));
        }

        let range = discount_sensitivity(&quotes).optimal_range.expect("non-empty");
        assert_eq!(range.acceptance_rate, 1.0);
        assert!(range.low >= 19.5, "low {}", range.low);
    }

    #[test]
    fn insights_mention_the_best_bucket() {
        let quotes = vec![quote_at(12.0, true), quote_at(22.0, false)];
        let sensitivity = discount_sensitivity(&quotes);
        assert!(!sensitivity.insights.is_empty());
        assert!(sensitivity.insights[0].contains("10-15%"));
    }

    #[test]
    fn empty_input_is_not_an_error() {
        let sensitivity = discount_sensitivity(&[]);
        assert!(sensitivity.buckets.is_empty());
        assert_eq!(sensitivity.correlation, None);
        assert_eq!(sensitivity.optimal_range, None);
        assert!(sensitivity.insights.is_empty());
    }
}
