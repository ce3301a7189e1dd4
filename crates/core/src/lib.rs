pub mod analyzer;
pub mod config;
pub mod domain;
pub mod errors;
pub mod ingest;
pub mod optimizer;
pub mod predictor;

pub use analyzer::report::{comprehensive_report, ComprehensiveReport};
pub use analyzer::summary::{dataset_summary, DatasetSummary};
pub use analyzer::{aggregate, group_stats, AggregateStat, Dimension};
pub use domain::{CustomerId, LaneKey, QuoteRecord, ShipmentType};
pub use errors::{DomainError, OracleError, SweepError};
pub use ingest::{ingest, IngestReport, InvalidRecordPolicy, RawQuoteRecord, RejectedRecord};
pub use optimizer::{sweep, DiscountPoint, DiscountRange, SweepOutcome};
pub use predictor::context::oracle_context;
pub use predictor::history::{suggest_discount, DiscountSuggestion, HistoryPredictor};
pub use predictor::{AcceptancePredictor, Prediction, PredictionContext};
