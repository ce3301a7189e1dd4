//! Discount sweep optimization.
//!
//! Evaluates an injected [`AcceptancePredictor`] at every point of a
//! discretized discount range and picks the arg-max. A plain linear scan:
//! the oracle is an opaque remote model, so no smoothness or monotonicity is
//! assumed and no bisection is attempted.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::{DomainError, SweepError};
use crate::predictor::{AcceptancePredictor, PredictionContext};

/// Closed discount range swept at a fixed step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscountRange {
    pub low: f64,
    pub high: f64,
    pub step: f64,
}

impl DiscountRange {
    pub fn new(low: f64, high: f64, step: f64) -> Result<Self, DomainError> {
        let range = Self { low, high, step };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.low.is_finite() || !self.high.is_finite() || !self.step.is_finite() {
            return Err(DomainError::InvalidRange("bounds and step must be finite".to_string()));
        }
        if self.step <= 0.0 {
            return Err(DomainError::InvalidRange(format!(
                "step must be positive, got {}",
                self.step
            )));
        }
        if self.low > self.high {
            return Err(DomainError::InvalidRange(format!(
                "low {} exceeds high {}",
                self.low, self.high
            )));
        }
        if self.low < 0.0 || self.high > 100.0 {
            return Err(DomainError::InvalidRange(format!(
                "bounds [{}, {}] outside [0, 100]",
                self.low, self.high
            )));
        }
        Ok(())
    }

    /// The arithmetic sequence from `low` to `high` inclusive. The step
    /// count is computed once so float error cannot drop the endpoint.
    pub fn points(&self) -> Vec<f64> {
        let count = ((self.high - self.low) / self.step + 1e-9).floor() as usize;
        (0..=count).map(|index| self.low + index as f64 * self.step).collect()
    }
}

/// One evaluated sweep point, kept for charting and audit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscountPoint {
    pub discount: f64,
    pub probability: f64,
    pub confidence: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub optimal_discount: f64,
    pub optimal_probability: f64,
    /// The full evaluated curve, in ascending discount order.
    pub points: Vec<DiscountPoint>,
}

/// Sweep the range sequentially and select the discount with the strictly
/// highest predicted probability; ties prefer the lowest discount, which
/// minimizes margin loss among equally good options. The rule is
/// scheduling-independent, so a future concurrent fan-out must preserve it.
///
/// Any failed oracle call, or a probability outside [0, 1], fails the whole
/// sweep with the offending discount attached; a partial curve is never
/// silently promoted to an optimum.
pub async fn sweep(
    predictor: &dyn AcceptancePredictor,
    context: &PredictionContext,
    range: DiscountRange,
) -> Result<SweepOutcome, SweepError> {
    range.validate()?;

    let candidates = range.points();
    info!(
        customer = %context.customer,
        lane = %context.lane,
        low = range.low,
        high = range.high,
        step = range.step,
        candidates = candidates.len(),
        "starting discount sweep"
    );

    let mut points = Vec::with_capacity(candidates.len());
    let mut best: Option<DiscountPoint> = None;

    for discount in candidates {
        let prediction = predictor
            .predict(context, discount)
            .await
            .map_err(|source| SweepError::Oracle { discount, source })?;

        let probability = prediction.probability;
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(SweepError::MalformedPrediction { discount, value: probability });
        }

        let point = DiscountPoint { discount, probability, confidence: prediction.confidence };
        debug!(discount, probability, "sweep point evaluated");
        points.push(point);

        // Strict comparison in ascending order keeps the lowest discount on
        // ties.
        match best {
            Some(current) if probability <= current.probability => {}
            _ => best = Some(point),
        }
    }

    // A validated range always yields at least one point.
    let best = best.expect("validated range produced no points");
    info!(
        optimal_discount = best.discount,
        optimal_probability = best.probability,
        points = points.len(),
        "discount sweep complete"
    );

    Ok(SweepOutcome {
        optimal_discount: best.discount,
        optimal_probability: best.probability,
        points,
    })
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::{sweep, DiscountRange};
    use crate::domain::{CustomerId, LaneKey, ShipmentType};
    use crate::errors::{DomainError, OracleError, SweepError};
    use crate::predictor::{AcceptancePredictor, Prediction, PredictionContext};

    /// Deterministic stand-in for the remote oracle.
    struct StubPredictor<F>(F);

    #[async_trait]
    impl<F> AcceptancePredictor for StubPredictor<F>
    where
        F: Fn(f64) -> Result<f64, OracleError> + Send + Sync,
    {
        async fn predict(
            &self,
            _context: &PredictionContext,
            discount: f64,
        ) -> Result<Prediction, OracleError> {
            Ok(Prediction { probability: (self.0)(discount)?, confidence: None, rationale: None })
        }
    }

    fn context() -> PredictionContext {
        PredictionContext::new(
            CustomerId::new("CUST001"),
            LaneKey::new("usa", "lax", "germany", "ham"),
            ShipmentType::Air,
            "general",
        )
    }

    fn range() -> DiscountRange {
        DiscountRange::new(0.0, 30.0, 0.5).expect("valid range")
    }

    #[test]
    fn points_cover_the_range_inclusively() {
        assert_eq!(range().points().len(), 61);
        assert_eq!(range().points().last().copied(), Some(30.0));

        let single = DiscountRange::new(5.0, 5.0, 1.0).expect("degenerate range");
        assert_eq!(single.points(), vec![5.0]);

        // Step that does not divide the span still includes the low end and
        // never overshoots the high end.
        let ragged = DiscountRange::new(0.0, 10.0, 3.0).expect("ragged range");
        assert_eq!(ragged.points(), vec![0.0, 3.0, 6.0, 9.0]);
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        assert!(matches!(
            DiscountRange::new(10.0, 5.0, 0.5),
            Err(DomainError::InvalidRange(_))
        ));
        assert!(matches!(DiscountRange::new(0.0, 30.0, 0.0), Err(DomainError::InvalidRange(_))));
        assert!(matches!(
            DiscountRange::new(0.0, 30.0, -1.0),
            Err(DomainError::InvalidRange(_))
        ));
        assert!(matches!(
            DiscountRange::new(-5.0, 30.0, 0.5),
            Err(DomainError::InvalidRange(_))
        ));
        assert!(matches!(
            DiscountRange::new(0.0, 101.0, 0.5),
            Err(DomainError::InvalidRange(_))
        ));
    }

    #[tokio::test]
    async fn constant_curve_ties_break_to_the_lowest_discount() {
        let predictor = StubPredictor(|_| Ok(0.5));
        let outcome = sweep(&predictor, &context(), range()).await.expect("sweep");

        assert_eq!(outcome.optimal_discount, 0.0);
        assert_eq!(outcome.optimal_probability, 0.5);
        assert_eq!(outcome.points.len(), 61);
    }

    #[tokio::test]
    async fn increasing_curve_selects_the_highest_discount() {
        let predictor = StubPredictor(|discount| Ok(discount / 100.0));
        let outcome = sweep(&predictor, &context(), range()).await.expect("sweep");

        assert_eq!(outcome.optimal_discount, 30.0);
        assert_eq!(outcome.optimal_probability, 0.3);
    }

    #[tokio::test]
    async fn decreasing_curve_selects_the_lowest_discount() {
        let predictor = StubPredictor(|discount| Ok(1.0 - discount / 100.0));
        let outcome = sweep(&predictor, &context(), range()).await.expect("sweep");

        assert_eq!(outcome.optimal_discount, 0.0);
        assert_eq!(outcome.optimal_probability, 1.0);
    }

    #[tokio::test]
    async fn triangular_curve_finds_the_interior_peak() {
        // Peaks at discount 11 within [0, 30].
        let predictor = StubPredictor(|discount: f64| Ok(1.0 - (discount - 11.0).abs() / 30.0));
        let outcome = sweep(&predictor, &context(), range()).await.expect("sweep");

        assert_eq!(outcome.optimal_discount, 11.0);
        assert_eq!(outcome.optimal_probability, 1.0);
        assert_eq!(outcome.points.len(), 61);
    }

    #[tokio::test]
    async fn oracle_failure_fails_the_whole_sweep() {
        let predictor = StubPredictor(|discount| {
            if discount >= 15.0 {
                Err(OracleError::Unavailable("remote oracle timed out".to_string()))
            } else {
                Ok(0.5)
            }
        });

        let error = sweep(&predictor, &context(), range()).await.expect_err("failing oracle");
        assert!(
            matches!(error, SweepError::Oracle { discount, .. } if discount == 15.0),
            "unexpected error: {error:?}"
        );
    }

    #[tokio::test]
    async fn out_of_range_probability_is_malformed_not_defaulted() {
        let predictor = StubPredictor(|discount| Ok(if discount >= 10.0 { 1.5 } else { 0.4 }));

        let error = sweep(&predictor, &context(), range()).await.expect_err("bad payload");
        assert!(
            matches!(
                error,
                SweepError::MalformedPrediction { discount, value }
                    if discount == 10.0 && value == 1.5
            ),
            "unexpected error: {error:?}"
        );
    }

    #[tokio::test]
    async fn unparseable_payload_surfaces_as_oracle_failure() {
        let predictor = StubPredictor(|_| {
            Err(OracleError::MalformedPayload("non-numeric probability".to_string()))
        });

        let error = sweep(&predictor, &context(), range()).await.expect_err("bad payload");
        assert!(matches!(
            error,
            SweepError::Oracle { source: OracleError::MalformedPayload(_), .. }
        ));
    }

    #[tokio::test]
    async fn non_finite_probability_is_malformed() {
        let predictor = StubPredictor(|_| Ok(f64::NAN));

        let error = sweep(&predictor, &context(), range()).await.expect_err("nan payload");
        assert!(matches!(error, SweepError::MalformedPrediction { .. }));
    }

    #[tokio::test]
    async fn sweep_rejects_an_invalid_range_up_front() {
        let predictor = StubPredictor(|_| Ok(0.5));
        let invalid = DiscountRange { low: 20.0, high: 10.0, step: 0.5 };

        let error = sweep(&predictor, &context(), invalid).await.expect_err("invalid range");
        assert!(matches!(error, SweepError::Domain(DomainError::InvalidRange(_))));
    }
}
