use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("malformed record at row {row}: {reason}")]
    MalformedRecord { row: usize, reason: String },
    #[error("invalid discount range: {0}")]
    InvalidRange(String),
    #[error("no accepted quotes found for similar scenarios")]
    EmptyHistory,
}

/// Failures on the prediction-oracle side of the seam. Implementations map
/// transport errors, timeouts, and unparseable payloads onto these; the
/// optimizer never fabricates a probability in their place.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum OracleError {
    #[error("prediction oracle unavailable: {0}")]
    Unavailable(String),
    #[error("prediction oracle returned a malformed payload: {0}")]
    MalformedPayload(String),
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SweepError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("oracle call failed at discount {discount}: {source}")]
    Oracle { discount: f64, source: OracleError },
    #[error("oracle returned probability {value} outside [0, 1] at discount {discount}")]
    MalformedPrediction { discount: f64, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::{DomainError, OracleError, SweepError};

    #[test]
    fn domain_errors_convert_transparently() {
        let error = SweepError::from(DomainError::InvalidRange("step must be positive".into()));
        assert_eq!(error.to_string(), "invalid discount range: step must be positive");
    }

    #[test]
    fn oracle_failure_carries_the_failing_discount() {
        let error = SweepError::Oracle {
            discount: 12.5,
            source: OracleError::Unavailable("connection refused".into()),
        };
        let rendered = error.to_string();
        assert!(rendered.contains("12.5"));
        assert!(rendered.contains("connection refused"));
    }
}
