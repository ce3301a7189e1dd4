use lanewise_core::config::AppConfig;
use lanewise_core::{suggest_discount, DiscountRange};

use crate::commands::{ingest_preamble, parse_context, CommandResult};
use crate::loader::load_quotes;
use crate::{ContextArgs, DataArgs};

pub fn run(
    config: &AppConfig,
    data: &DataArgs,
    context: &ContextArgs,
    json: bool,
) -> CommandResult {
    let context = match parse_context("suggest", context) {
        Ok(context) => context,
        Err(failure) => return failure,
    };

    let range = match DiscountRange::new(config.sweep.low, config.sweep.high, config.sweep.step) {
        Ok(range) => range,
        Err(error) => return CommandResult::failure("suggest", "bad_range", error.to_string()),
    };

    let report = match load_quotes(config, &data.data) {
        Ok(report) => report,
        Err(error) => return CommandResult::failure("suggest", "data_load", format!("{error:#}")),
    };

    let suggestion = match suggest_discount(&report.quotes, &context, &range) {
        Ok(suggestion) => suggestion,
        Err(error) => return CommandResult::failure("suggest", "no_history", error.to_string()),
    };

    if json {
        return CommandResult::from_json("suggest", &suggestion);
    }

    let mut output = ingest_preamble(&report);
    output.push_str(&format!(
        "\nsuggested discount: {:.1}% (success probability {:.1}%, confidence {:.1})",
        suggestion.suggested_discount,
        suggestion.success_probability * 100.0,
        suggestion.confidence,
    ));
    output.push_str(&format!(
        "\nbased on {} accepted of {} similar quotes (accepted discounts {:.1}%-{:.1}%, median {:.1}%)",
        suggestion.stats.accepted_similar,
        suggestion.stats.total_similar,
        suggestion.stats.min_accepted_discount,
        suggestion.stats.max_accepted_discount,
        suggestion.stats.median_accepted_discount,
    ));

    CommandResult::success(output)
}
