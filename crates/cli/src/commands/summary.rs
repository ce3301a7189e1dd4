use lanewise_core::config::AppConfig;
use lanewise_core::dataset_summary;

use crate::commands::{ingest_preamble, CommandResult};
use crate::loader::load_quotes;
use crate::DataArgs;

pub fn run(config: &AppConfig, data: &DataArgs, json: bool) -> CommandResult {
    let report = match load_quotes(config, &data.data) {
        Ok(report) => report,
        Err(error) => return CommandResult::failure("summary", "data_load", format!("{error:#}")),
    };

    let summary = dataset_summary(&report.quotes);

    if json {
        return CommandResult::from_json("summary", &summary);
    }

    let mut output = ingest_preamble(&report);
    output.push_str(&format!(
        "\ncustomers: {}  lanes: {}\naccepted: {} of {} ({:.1}%)",
        summary.total_customers,
        summary.total_lanes,
        summary.total_accepted,
        summary.total_quotes,
        summary.overall_acceptance_rate * 100.0,
    ));

    if let Some(range) = &summary.date_range {
        output.push_str(&format!(
            "\ndates: {} to {} ({} days)",
            range.start, range.end, range.span_days
        ));
    }
    if let Some(discount) = &summary.discount {
        output.push_str(&format!(
            "\ndiscounts: mean {:.2}%  median {:.2}%  min {:.2}%  max {:.2}%",
            discount.mean, discount.median, discount.min, discount.max
        ));
    }
    if let Some(accepted) = &summary.accepted_discount {
        output.push_str(&format!(
            "\naccepted discounts: mean {:.2}%  median {:.2}%",
            accepted.mean, accepted.median
        ));
    }

    CommandResult::success(output)
}
