use lanewise_core::config::AppConfig;
use lanewise_core::{aggregate, group_stats, AggregateStat, Dimension};

use crate::commands::{ingest_preamble, CommandResult};
use crate::loader::load_quotes;
use crate::DataArgs;

pub fn run(
    config: &AppConfig,
    data: &DataArgs,
    dimension: &str,
    key: Option<&str>,
    json: bool,
) -> CommandResult {
    let Some(dimension) = Dimension::parse(dimension) else {
        return CommandResult::failure(
            "analyze",
            "bad_dimension",
            format!("unknown dimension `{dimension}` (expected customer|lane|shipment_type|commodity)"),
        );
    };

    let report = match load_quotes(config, &data.data) {
        Ok(report) => report,
        Err(error) => return CommandResult::failure("analyze", "data_load", format!("{error:#}")),
    };

    let stats: Vec<AggregateStat> = match key {
        Some(key) => vec![aggregate(&report.quotes, dimension, key)],
        None => group_stats(&report.quotes, dimension),
    };

    if json {
        return CommandResult::from_json("analyze", &stats);
    }

    let mut output = ingest_preamble(&report);
    output.push_str(&format!("\n{dimension} stats:"));
    for stat in &stats {
        let average = stat
            .average_accepted_discount
            .map(|discount| format!("{discount:.2}%"))
            .unwrap_or_else(|| "n/a".to_string());
        output.push_str(&format!(
            "\n  {}: {} of {} accepted ({:.1}%), avg accepted discount {}",
            stat.key,
            stat.accepted_count,
            stat.total_count,
            stat.acceptance_rate * 100.0,
            average,
        ));
    }

    CommandResult::success(output)
}
