//! Static acceptance analytics.
//!
//! Pure filter-group-aggregate over a caller-owned quote slice. Nothing here
//! holds state or calls out; every stat is recomputed from the quotes passed
//! in.

pub mod report;
pub mod sensitivity;
pub mod summary;
pub mod temporal;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{LaneKey, QuoteRecord};

/// Grouping dimension for acceptance statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Customer,
    Lane,
    ShipmentType,
    Commodity,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Lane => "lane",
            Self::ShipmentType => "shipment_type",
            Self::Commodity => "commodity",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "customer" => Some(Self::Customer),
            "lane" => Some(Self::Lane),
            "shipment_type" => Some(Self::ShipmentType),
            "commodity" => Some(Self::Commodity),
            _ => None,
        }
    }

    /// Grouping key of a quote along this dimension.
    pub fn key_of(&self, quote: &QuoteRecord) -> String {
        match self {
            Self::Customer => quote.customer.to_string(),
            Self::Lane => quote.lane().to_string(),
            Self::ShipmentType => quote.shipment_type.as_str().to_string(),
            Self::Commodity => quote.commodity_type.clone(),
        }
    }

    /// Canonicalize a caller-supplied key the same way ingest canonicalizes
    /// the underlying fields, so lookups match regardless of input casing.
    pub fn normalize_key(&self, key: &str) -> String {
        match self {
            Self::Customer => key.trim().to_ascii_uppercase(),
            Self::Lane => LaneKey::parse(key)
                .map(|lane| lane.to_string())
                .unwrap_or_else(|| key.trim().to_ascii_lowercase()),
            Self::ShipmentType | Self::Commodity => key.trim().to_ascii_lowercase(),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Acceptance statistics for one key of one dimension. Derived, recomputed
/// per request, never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateStat {
    pub dimension: Dimension,
    pub key: String,
    pub total_count: usize,
    pub accepted_count: usize,
    /// accepted_count / total_count; 0.0 for an empty group.
    pub acceptance_rate: f64,
    /// Mean discount over accepted quotes only; `None` when none were
    /// accepted. Callers branch on `total_count` before interpreting.
    pub average_accepted_discount: Option<f64>,
}

/// Aggregate acceptance statistics for one key. Zero matching quotes is a
/// valid zero-count stat, not an error.
pub fn aggregate(quotes: &[QuoteRecord], dimension: Dimension, key: &str) -> AggregateStat {
    let key = dimension.normalize_key(key);
    let matching: Vec<&QuoteRecord> =
        quotes.iter().filter(|quote| dimension.key_of(quote) == key).collect();
    stat_for(dimension, key, &matching)
}

/// One stat per distinct key of the dimension, sorted by key.
pub fn group_stats(quotes: &[QuoteRecord], dimension: Dimension) -> Vec<AggregateStat> {
    let mut groups: BTreeMap<String, Vec<&QuoteRecord>> = BTreeMap::new();
    for quote in quotes {
        groups.entry(dimension.key_of(quote)).or_default().push(quote);
    }

    groups.into_iter().map(|(key, members)| stat_for(dimension, key, &members)).collect()
}

fn stat_for(dimension: Dimension, key: String, quotes: &[&QuoteRecord]) -> AggregateStat {
    let total_count = quotes.len();
    let accepted: Vec<f64> = quotes
        .iter()
        .filter(|quote| quote.accepted)
        .map(|quote| quote.discount_offered)
        .collect();
    let accepted_count = accepted.len();

    let acceptance_rate =
        if total_count == 0 { 0.0 } else { accepted_count as f64 / total_count as f64 };

    AggregateStat {
        dimension,
        key,
        total_count,
        accepted_count,
        acceptance_rate,
        average_accepted_discount: mean(&accepted),
    }
}

// Shared numeric helpers. Spread statistics follow the conventions of the
// tooling the historical exports come from: sample standard deviation
// (n - 1 denominator) and linear-interpolation quantiles.

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub(crate) fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let sum_sq: f64 = values.iter().map(|value| (value - mean).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

pub(crate) fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }

    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;

    use crate::domain::{CustomerId, QuoteRecord, ShipmentType};

    pub fn quote(
        customer: &str,
        date: &str,
        shipment_type: ShipmentType,
        commodity: &str,
        route: (&str, &str, &str, &str),
        discount: f64,
        accepted: bool,
    ) -> QuoteRecord {
        QuoteRecord {
            customer: CustomerId::new(customer),
            quote_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("fixture date"),
            origin_country: route.0.to_string(),
            origin_station: route.1.to_string(),
            destination_country: route.2.to_string(),
            destination_station: route.3.to_string(),
            shipment_type,
            commodity_type: commodity.to_string(),
            discount_offered: discount,
            accepted,
        }
    }

    /// Five-quote sample mirroring the shape of the historical test data.
    pub fn sample() -> Vec<QuoteRecord> {
        vec![
            quote("CUST001", "2024-01-01", ShipmentType::Air, "general", ("usa", "lax", "germany", "ham"), 15.0, true),
            quote("CUST002", "2024-01-02", ShipmentType::OfrFcl, "electronics", ("china", "sha", "usa", "nyc"), 12.0, false),
            quote("CUST001", "2024-01-03", ShipmentType::Air, "textiles", ("usa", "lax", "japan", "nrt"), 18.5, true),
            quote("CUST002", "2024-01-04", ShipmentType::OfrLcl, "general", ("china", "sha", "germany", "ham"), 20.0, true),
            quote("CUST003", "2024-01-05", ShipmentType::Air, "electronics", ("germany", "ham", "usa", "lax"), 25.0, false),
        ]
    }
}
