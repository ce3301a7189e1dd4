//! Deterministic predictor backed by the historical table.
//!
//! The offline counterpart to a remote LLM oracle: estimates acceptance
//! probability from quotes similar to the prediction context. Similar means
//! matching any of customer, lane, shipment type, or commodity; when nothing
//! matches, the whole table stands in.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyzer::{mean, median};
use crate::domain::QuoteRecord;
use crate::errors::{DomainError, OracleError};
use crate::optimizer::DiscountRange;
use crate::predictor::{AcceptancePredictor, Prediction, PredictionContext};

/// Confidence reported when more than this many similar accepted quotes
/// back the estimate.
const WELL_SUPPORTED_THRESHOLD: usize = 5;
const WELL_SUPPORTED_CONFIDENCE: f64 = 0.8;
const THIN_SUPPORT_CONFIDENCE: f64 = 0.6;

pub struct HistoryPredictor {
    quotes: Vec<QuoteRecord>,
    bandwidth: f64,
}

impl HistoryPredictor {
    /// Discount window half-width for the local acceptance estimate.
    pub const DEFAULT_BANDWIDTH: f64 = 2.5;

    pub fn new(quotes: &[QuoteRecord]) -> Self {
        Self::with_bandwidth(quotes, Self::DEFAULT_BANDWIDTH)
    }

    pub fn with_bandwidth(quotes: &[QuoteRecord], bandwidth: f64) -> Self {
        Self { quotes: quotes.to_vec(), bandwidth }
    }

    fn similar(&self, context: &PredictionContext) -> Vec<&QuoteRecord> {
        let matching: Vec<&QuoteRecord> = self
            .quotes
            .iter()
            .filter(|quote| {
                quote.customer == context.customer
                    || quote.lane() == context.lane
                    || quote.shipment_type == context.shipment_type
                    || quote.commodity_type == context.commodity_type
            })
            .collect();

        if matching.is_empty() {
            self.quotes.iter().collect()
        } else {
            matching
        }
    }
}

#[async_trait]
impl AcceptancePredictor for HistoryPredictor {
    async fn predict(
        &self,
        context: &PredictionContext,
        discount: f64,
    ) -> Result<Prediction, OracleError> {
        if self.quotes.is_empty() {
            return Err(OracleError::Unavailable("no historical quotes loaded".to_string()));
        }

        let similar = self.similar(context);
        let window: Vec<&&QuoteRecord> = similar
            .iter()
            .filter(|quote| (quote.discount_offered - discount).abs() <= self.bandwidth)
            .collect();

        // Acceptance share inside the discount window, or over the whole
        // similar set when the window is empty.
        let (total, accepted) = if window.is_empty() {
            (similar.len(), similar.iter().filter(|quote| quote.accepted).count())
        } else {
            (window.len(), window.iter().filter(|quote| quote.accepted).count())
        };
        let probability = accepted as f64 / total as f64;

        let accepted_similar = similar.iter().filter(|quote| quote.accepted).count();
        let confidence = if accepted_similar > WELL_SUPPORTED_THRESHOLD {
            WELL_SUPPORTED_CONFIDENCE
        } else {
            THIN_SUPPORT_CONFIDENCE
        };

        debug!(
            discount,
            similar = similar.len(),
            window = window.len(),
            probability,
            "history predictor estimate"
        );

        Ok(Prediction {
            probability,
            confidence: Some(confidence),
            rationale: Some(format!(
                "{total} similar historical quotes near {discount:.1}% discount"
            )),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoricalStats {
    pub total_similar: usize,
    pub accepted_similar: usize,
    pub mean_accepted_discount: f64,
    pub median_accepted_discount: f64,
    pub min_accepted_discount: f64,
    pub max_accepted_discount: f64,
}

/// A discount suggestion made without a sweep, from accepted history alone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscountSuggestion {
    pub suggested_discount: f64,
    pub success_probability: f64,
    pub confidence: f64,
    pub stats: HistoricalStats,
}

/// Suggest the mean accepted discount of the similar set, clamped into the
/// caller's range. Errors when no similar quote was ever accepted rather
/// than inventing a default.
pub fn suggest_discount(
    quotes: &[QuoteRecord],
    context: &PredictionContext,
    range: &DiscountRange,
) -> Result<DiscountSuggestion, DomainError> {
    let predictor = HistoryPredictor::new(quotes);
    let similar = predictor.similar(context);

    let accepted: Vec<f64> = similar
        .iter()
        .filter(|quote| quote.accepted)
        .map(|quote| quote.discount_offered)
        .collect();

    if accepted.is_empty() {
        return Err(DomainError::EmptyHistory);
    }

    let mean_accepted = mean(&accepted).unwrap_or(0.0);
    let stats = HistoricalStats {
        total_similar: similar.len(),
        accepted_similar: accepted.len(),
        mean_accepted_discount: mean_accepted,
        median_accepted_discount: median(&accepted).unwrap_or(0.0),
        min_accepted_discount: accepted.iter().copied().fold(f64::INFINITY, f64::min),
        max_accepted_discount: accepted.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    };

    let confidence = if accepted.len() > WELL_SUPPORTED_THRESHOLD {
        WELL_SUPPORTED_CONFIDENCE
    } else {
        THIN_SUPPORT_CONFIDENCE
    };

    Ok(DiscountSuggestion {
        suggested_discount: mean_accepted.clamp(range.low, range.high),
        success_probability: accepted.len() as f64 / similar.len() as f64,
        confidence,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::{suggest_discount, HistoryPredictor};
    use crate::analyzer::fixtures::quote;
    use crate::domain::{CustomerId, LaneKey, ShipmentType};
    use crate::errors::{DomainError, OracleError};
    use crate::optimizer::DiscountRange;
    use crate::predictor::{AcceptancePredictor, PredictionContext};

    const ROUTE: (&str, &str, &str, &str) = ("usa", "lax", "germany", "ham");

    fn context() -> PredictionContext {
        PredictionContext::new(
            CustomerId::new("CUST001"),
            LaneKey::new("usa", "lax", "germany", "ham"),
            ShipmentType::Air,
            "general",
        )
    }

    fn history() -> Vec<crate::domain::QuoteRecord> {
        vec![
            quote("CUST001", "2024-01-01", ShipmentType::Air, "general", ROUTE, 10.0, true),
            quote("CUST001", "2024-01-02", ShipmentType::Air, "general", ROUTE, 11.0, true),
            quote("CUST001", "2024-01-03", ShipmentType::Air, "general", ROUTE, 20.0, false),
            quote("CUST001", "2024-01-04", ShipmentType::Air, "general", ROUTE, 21.0, false),
        ]
    }

    #[tokio::test]
    async fn probability_follows_the_local_discount_window() {
        let predictor = HistoryPredictor::new(&history());

        // Window around 10.5 holds the two accepted quotes.
        let low = predictor.predict(&context(), 10.5).await.expect("estimate");
        assert_eq!(low.probability, 1.0);

        // Window around 20.5 holds the two rejected quotes.
        let high = predictor.predict(&context(), 20.5).await.expect("estimate");
        assert_eq!(high.probability, 0.0);
    }

    #[tokio::test]
    async fn empty_window_falls_back_to_the_similar_set() {
        let predictor = HistoryPredictor::new(&history());

        // No quote within 2.5 points of 50%; overall rate is 2/4.
        let fallback = predictor.predict(&context(), 50.0).await.expect("estimate");
        assert_eq!(fallback.probability, 0.5);
    }

    #[tokio::test]
    async fn confidence_reflects_sample_support() {
        let thin = HistoryPredictor::new(&history());
        let prediction = thin.predict(&context(), 10.0).await.expect("estimate");
        assert_eq!(prediction.confidence, Some(0.6));

        let mut quotes = history();
        for day in 10..=16 {
            quotes.push(quote(
                "CUST001",
                &format!("2024-01-{day}"),
                ShipmentType::Air,
                "general",
                ROUTE,
                10.0,
                true,
            ));
        }
        let supported = HistoryPredictor::new(&quotes);
        let prediction = supported.predict(&context(), 10.0).await.expect("estimate");
        assert_eq!(prediction.confidence, Some(0.8));
    }

    #[tokio::test]
    async fn no_history_is_an_oracle_failure() {
        let predictor = HistoryPredictor::new(&[]);
        let error = predictor.predict(&context(), 10.0).await.expect_err("no data");
        assert!(matches!(error, OracleError::Unavailable(_)));
    }

    #[test]
    fn suggestion_is_mean_accepted_discount_clamped_to_range() {
        let range = DiscountRange::new(0.0, 30.0, 0.5).expect("valid range");
        let suggestion = suggest_discount(&history(), &context(), &range).expect("history exists");

        assert_eq!(suggestion.suggested_discount, 10.5);
        assert_eq!(suggestion.success_probability, 0.5);
        assert_eq!(suggestion.stats.accepted_similar, 2);
        assert_eq!(suggestion.stats.min_accepted_discount, 10.0);
        assert_eq!(suggestion.stats.max_accepted_discount, 11.0);

        let narrow = DiscountRange::new(0.0, 5.0, 0.5).expect("valid range");
        let clamped = suggest_discount(&history(), &context(), &narrow).expect("history exists");
        assert_eq!(clamped.suggested_discount, 5.0);
    }

    #[test]
    fn suggestion_errors_without_accepted_history() {
        let quotes = vec![
            quote("CUST001", "2024-01-01", ShipmentType::Air, "general", ROUTE, 10.0, false),
        ];
        let range = DiscountRange::new(0.0, 30.0, 0.5).expect("valid range");

        let error = suggest_discount(&quotes, &context(), &range).expect_err("nothing accepted");
        assert_eq!(error, DomainError::EmptyHistory);
    }
}
