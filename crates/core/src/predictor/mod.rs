//! The prediction-oracle seam.
//!
//! The optimizer talks to an [`AcceptancePredictor`] and nothing else: it
//! never builds prompts or parses remote payloads. Production deployments
//! plug in an LLM-backed implementation; tests and offline use plug in
//! deterministic ones.

pub mod context;
pub mod history;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{CustomerId, LaneKey, ShipmentType};
use crate::errors::OracleError;

/// The fixed quote context a prediction is made for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionContext {
    pub customer: CustomerId,
    pub lane: LaneKey,
    pub shipment_type: ShipmentType,
    pub commodity_type: String,
}

impl PredictionContext {
    pub fn new(
        customer: CustomerId,
        lane: LaneKey,
        shipment_type: ShipmentType,
        commodity_type: &str,
    ) -> Self {
        Self {
            customer,
            lane,
            shipment_type,
            commodity_type: commodity_type.trim().to_ascii_lowercase(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Acceptance probability in [0, 1].
    pub probability: f64,
    pub confidence: Option<f64>,
    pub rationale: Option<String>,
}

#[async_trait]
pub trait AcceptancePredictor: Send + Sync {
    async fn predict(
        &self,
        context: &PredictionContext,
        discount: f64,
    ) -> Result<Prediction, OracleError>;
}
