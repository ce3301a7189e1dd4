use lanewise_core::config::AppConfig;
use lanewise_core::{sweep, DiscountRange, HistoryPredictor};

use crate::commands::{ingest_preamble, parse_context, CommandResult};
use crate::loader::load_quotes;
use crate::{ContextArgs, DataArgs, RangeArgs};

pub async fn run(
    config: &AppConfig,
    data: &DataArgs,
    context: &ContextArgs,
    range: &RangeArgs,
    json: bool,
) -> CommandResult {
    let context = match parse_context("optimize", context) {
        Ok(context) => context,
        Err(failure) => return failure,
    };

    let range = match DiscountRange::new(
        range.low.unwrap_or(config.sweep.low),
        range.high.unwrap_or(config.sweep.high),
        range.step.unwrap_or(config.sweep.step),
    ) {
        Ok(range) => range,
        Err(error) => return CommandResult::failure("optimize", "bad_range", error.to_string()),
    };

    let report = match load_quotes(config, &data.data) {
        Ok(report) => report,
        Err(error) => {
            return CommandResult::failure("optimize", "data_load", format!("{error:#}"))
        }
    };

    // The built-in predictor works from history alone; an LLM-backed oracle
    // plugs into the same seam through the library API.
    let predictor = HistoryPredictor::with_bandwidth(&report.quotes, config.predictor.bandwidth);

    let outcome = match sweep(&predictor, &context, range).await {
        Ok(outcome) => outcome,
        Err(error) => return CommandResult::failure("optimize", "sweep", error.to_string()),
    };

    if json {
        return CommandResult::from_json("optimize", &outcome);
    }

    let mut output = ingest_preamble(&report);
    output.push_str(&format!(
        "\nswept {} discounts in [{}, {}] by {}",
        outcome.points.len(),
        range.low,
        range.high,
        range.step,
    ));
    for point in &outcome.points {
        output.push_str(&format!(
            "\n  {:>5.1}% -> {:.3}",
            point.discount, point.probability
        ));
    }
    output.push_str(&format!(
        "\noptimal discount: {:.1}% (predicted acceptance {:.1}%)",
        outcome.optimal_discount,
        outcome.optimal_probability * 100.0,
    ));

    CommandResult::success(output)
}
