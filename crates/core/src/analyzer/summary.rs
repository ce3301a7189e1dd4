//! Dataset-level summary statistics.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analyzer::{mean, median, quantile, sample_std};
use crate::domain::QuoteRecord;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub span_days: i64,
}

/// Spread of discount percentages over some subset of quotes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscountSpread {
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; `None` for fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    pub q25: f64,
    pub q75: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_quotes: usize,
    pub total_customers: usize,
    pub total_lanes: usize,
    pub total_accepted: usize,
    pub overall_acceptance_rate: f64,
    pub date_range: Option<DateSpan>,
    pub discount: Option<DiscountSpread>,
    pub discount_quartiles: Option<Quartiles>,
    /// Spread over accepted quotes only; `None` when nothing was accepted.
    pub accepted_discount: Option<DiscountSpread>,
}

pub fn dataset_summary(quotes: &[QuoteRecord]) -> DatasetSummary {
    let total_quotes = quotes.len();
    let total_customers =
        quotes.iter().map(|quote| quote.customer.0.as_str()).collect::<HashSet<_>>().len();
    let total_lanes = quotes.iter().map(|quote| quote.lane().to_string()).collect::<HashSet<_>>().len();

    let accepted: Vec<f64> = quotes
        .iter()
        .filter(|quote| quote.accepted)
        .map(|quote| quote.discount_offered)
        .collect();
    let total_accepted = accepted.len();
    let overall_acceptance_rate =
        if total_quotes == 0 { 0.0 } else { total_accepted as f64 / total_quotes as f64 };

    let discounts: Vec<f64> = quotes.iter().map(|quote| quote.discount_offered).collect();

    let date_range = quotes.iter().map(|quote| quote.quote_date).min().and_then(|start| {
        let end = quotes.iter().map(|quote| quote.quote_date).max()?;
        Some(DateSpan { start, end, span_days: (end - start).num_days() })
    });

    let discount_quartiles = quantile(&discounts, 0.25)
        .zip(quantile(&discounts, 0.75))
        .map(|(q25, q75)| Quartiles { q25, q75 });

    DatasetSummary {
        total_quotes,
        total_customers,
        total_lanes,
        total_accepted,
        overall_acceptance_rate,
        date_range,
        discount: spread(&discounts),
        discount_quartiles,
        accepted_discount: spread(&accepted),
    }
}

pub(crate) fn spread(values: &[f64]) -> Option<DiscountSpread> {
    let mean = mean(values)?;
    let median = median(values)?;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(DiscountSpread { mean, median, std: sample_std(values), min, max })
}
