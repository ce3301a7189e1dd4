pub mod analyze;
pub mod context;
pub mod optimize;
pub mod report;
pub mod suggest;
pub mod summary;

use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    command: String,
    status: String,
    error_class: String,
    message: String,
}

impl CommandResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    pub fn failure(command: &str, error_class: &str, message: impl Into<String>) -> Self {
        let payload = ErrorEnvelope {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: error_class.to_string(),
            message: message.into(),
        };
        let output = serde_json::to_string(&payload).unwrap_or_else(|error| {
            format!(
                "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
                error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
            )
        });
        Self { exit_code: 1, output }
    }

    pub fn from_json<T: Serialize>(command: &str, payload: &T) -> Self {
        match serde_json::to_string_pretty(payload) {
            Ok(output) => Self::success(output),
            Err(error) => Self::failure(command, "serialization", error.to_string()),
        }
    }
}

/// Build the prediction context from CLI arguments, or a failure envelope
/// naming the bad argument.
fn parse_context(
    command: &str,
    args: &crate::ContextArgs,
) -> Result<lanewise_core::PredictionContext, CommandResult> {
    use lanewise_core::{CustomerId, LaneKey, PredictionContext, ShipmentType};

    let customer = args.customer.trim();
    if customer.is_empty() {
        return Err(CommandResult::failure(command, "bad_context", "customer must not be empty"));
    }

    let lane = LaneKey::parse(&args.lane).ok_or_else(|| {
        CommandResult::failure(
            command,
            "bad_context",
            format!(
                "unparseable lane `{}` (expected `usa_lax-germany_ham` or `USA-LAX to Germany-HAM`)",
                args.lane
            ),
        )
    })?;

    let shipment_type = ShipmentType::parse(&args.shipment_type).ok_or_else(|| {
        CommandResult::failure(
            command,
            "bad_context",
            format!(
                "unknown shipment type `{}` (expected air|ofr fcl|ofr lcl)",
                args.shipment_type
            ),
        )
    })?;

    Ok(PredictionContext::new(CustomerId::new(customer), lane, shipment_type, &args.commodity))
}

/// Shared renderer for the ingest preamble of text output.
fn ingest_preamble(report: &lanewise_core::IngestReport) -> String {
    let mut lines = format!("loaded {} quotes", report.quotes.len());
    if !report.rejected.is_empty() {
        lines.push_str(&format!(" ({} rejected)", report.rejected.len()));
    }
    if report.duplicates_removed > 0 {
        lines.push_str(&format!(" ({} duplicates removed)", report.duplicates_removed));
    }
    lines
}
