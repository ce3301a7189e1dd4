//! Per-dimension performance reports and the combined comprehensive report.

use serde::{Deserialize, Serialize};

use crate::analyzer::sensitivity::{discount_sensitivity, DiscountSensitivity};
use crate::analyzer::summary::{dataset_summary, spread, DatasetSummary, DiscountSpread};
use crate::analyzer::temporal::{temporal_analysis, TemporalAnalysis};
use crate::analyzer::{group_stats, mean, median, sample_std, AggregateStat, Dimension};
use crate::domain::QuoteRecord;

/// Acceptance-rate threshold above which a customer or lane counts as
/// high-value, and below (mirrored) which it counts as low-value.
const HIGH_VALUE_RATE: f64 = 0.7;
const LOW_VALUE_RATE: f64 = 0.3;

/// List length for top/bottom rankings.
const TOP_N: usize = 10;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateSummary {
    pub mean: f64,
    pub median: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomerAnalysis {
    pub total_customers: usize,
    pub acceptance_rates: Option<RateSummary>,
    /// Customers with acceptance rate above 0.7.
    pub high_value_customers: Vec<String>,
    /// Customers with acceptance rate below 0.3.
    pub low_value_customers: Vec<String>,
    /// Top customers by quote volume.
    pub most_active_customers: Vec<AggregateStat>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LanePerformance {
    pub lane: String,
    pub total_quotes: usize,
    pub acceptance_rate: f64,
    pub average_discount: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceDistribution {
    /// Rate above 0.7.
    pub high: usize,
    /// Rate in [0.3, 0.7].
    pub medium: usize,
    /// Rate below 0.3.
    pub low: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneAnalysis {
    pub total_lanes: usize,
    pub best_performing: Vec<LanePerformance>,
    pub worst_performing: Vec<LanePerformance>,
    pub high_volume: Vec<LanePerformance>,
    pub distribution: AcceptanceDistribution,
}

/// Per-key performance for the closed-vocabulary dimensions (shipment type,
/// commodity).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyPerformance {
    pub key: String,
    pub total_quotes: usize,
    pub accepted_quotes: usize,
    pub acceptance_rate: f64,
    pub discount: Option<DiscountSpread>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryAnalysis {
    pub performance: Vec<KeyPerformance>,
    /// Key with the highest acceptance rate.
    pub best: Option<String>,
    /// Key with the most quotes.
    pub most_popular: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveReport {
    pub summary: DatasetSummary,
    pub customers: CustomerAnalysis,
    pub lanes: LaneAnalysis,
    pub shipment_types: CategoryAnalysis,
    pub commodities: CategoryAnalysis,
    pub temporal: TemporalAnalysis,
    pub sensitivity: DiscountSensitivity,
}

pub fn customer_analysis(quotes: &[QuoteRecord]) -> CustomerAnalysis {
    let stats = group_stats(quotes, Dimension::Customer);
    let rates: Vec<f64> = stats.iter().map(|stat| stat.acceptance_rate).collect();

    let acceptance_rates = (!rates.is_empty()).then(|| RateSummary {
        mean: mean(&rates).unwrap_or(0.0),
        median: median(&rates).unwrap_or(0.0),
        std: sample_std(&rates),
        min: rates.iter().copied().fold(f64::INFINITY, f64::min),
        max: rates.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    });

    let high_value_customers = stats
        .iter()
        .filter(|stat| stat.acceptance_rate > HIGH_VALUE_RATE)
        .map(|stat| stat.key.clone())
        .collect();
    let low_value_customers = stats
        .iter()
        .filter(|stat| stat.acceptance_rate < LOW_VALUE_RATE)
        .map(|stat| stat.key.clone())
        .collect();

    let mut by_volume = stats.clone();
    by_volume.sort_by(|a, b| b.total_count.cmp(&a.total_count).then(a.key.cmp(&b.key)));
    by_volume.truncate(TOP_N);

    CustomerAnalysis {
        total_customers: stats.len(),
        acceptance_rates,
        high_value_customers,
        low_value_customers,
        most_active_customers: by_volume,
    }
}

pub fn lane_analysis(quotes: &[QuoteRecord]) -> LaneAnalysis {
    let performances: Vec<LanePerformance> = group_stats(quotes, Dimension::Lane)
        .into_iter()
        .map(|stat| {
            let discounts: Vec<f64> = quotes
                .iter()
                .filter(|quote| quote.lane().to_string() == stat.key)
                .map(|quote| quote.discount_offered)
                .collect();
            LanePerformance {
                lane: stat.key,
                total_quotes: stat.total_count,
                acceptance_rate: stat.acceptance_rate,
                average_discount: mean(&discounts).unwrap_or(0.0),
            }
        })
        .collect();

    let mut distribution = AcceptanceDistribution::default();
    for performance in &performances {
        if performance.acceptance_rate > HIGH_VALUE_RATE {
            distribution.high += 1;
        } else if performance.acceptance_rate < LOW_VALUE_RATE {
            distribution.low += 1;
        } else {
            distribution.medium += 1;
        }
    }

    let best_performing = ranked(&performances, |a, b| {
        b.acceptance_rate.total_cmp(&a.acceptance_rate).then(a.lane.cmp(&b.lane))
    });
    let worst_performing = ranked(&performances, |a, b| {
        a.acceptance_rate.total_cmp(&b.acceptance_rate).then(a.lane.cmp(&b.lane))
    });
    let high_volume = ranked(&performances, |a, b| {
        b.total_quotes.cmp(&a.total_quotes).then(a.lane.cmp(&b.lane))
    });

    LaneAnalysis {
        total_lanes: performances.len(),
        best_performing,
        worst_performing,
        high_volume,
        distribution,
    }
}

pub fn shipment_type_analysis(quotes: &[QuoteRecord]) -> CategoryAnalysis {
    category_analysis(quotes, Dimension::ShipmentType)
}

pub fn commodity_analysis(quotes: &[QuoteRecord]) -> CategoryAnalysis {
    category_analysis(quotes, Dimension::Commodity)
}

pub fn comprehensive_report(quotes: &[QuoteRecord]) -> ComprehensiveReport {
    ComprehensiveReport {
        summary: dataset_summary(quotes),
        customers: customer_analysis(quotes),
        lanes: lane_analysis(quotes),
        shipment_types: shipment_type_analysis(quotes),
        commodities: commodity_analysis(quotes),
        temporal: temporal_analysis(quotes),
        sensitivity: discount_sensitivity(quotes),
    }
}

fn category_analysis(quotes: &[QuoteRecord], dimension: Dimension) -> CategoryAnalysis {
    let performance: Vec<KeyPerformance> = group_stats(quotes, dimension)
        .into_iter()
        .map(|stat| {
            let discounts: Vec<f64> = quotes
                .iter()
                .filter(|quote| dimension.key_of(quote) == stat.key)
                .map(|quote| quote.discount_offered)
                .collect();
            KeyPerformance {
                key: stat.key,
                total_quotes: stat.total_count,
                accepted_quotes: stat.accepted_count,
                acceptance_rate: stat.acceptance_rate,
                discount: spread(&discounts),
            }
        })
        .collect();

    let best = performance
        .iter()
        .max_by(|a, b| a.acceptance_rate.total_cmp(&b.acceptance_rate))
        .map(|entry| entry.key.clone());
    let most_popular = performance
        .iter()
        .max_by_key(|entry| entry.total_quotes)
        .map(|entry| entry.key.clone());

    CategoryAnalysis { performance, best, most_popular }
}

fn ranked<F>(performances: &[LanePerformance], compare: F) -> Vec<LanePerformance>
where
    F: Fn(&LanePerformance, &LanePerformance) -> std::cmp::Ordering,
{
    let mut sorted = performances.to_vec();
    sorted.sort_by(compare);
    sorted.truncate(TOP_N);
    sorted
}
