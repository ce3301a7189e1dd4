use lanewise_core::comprehensive_report;
use lanewise_core::config::AppConfig;

use crate::commands::CommandResult;
use crate::loader::load_quotes;
use crate::DataArgs;

pub fn run(config: &AppConfig, data: &DataArgs) -> CommandResult {
    let report = match load_quotes(config, &data.data) {
        Ok(report) => report,
        Err(error) => return CommandResult::failure("report", "data_load", format!("{error:#}")),
    };

    CommandResult::from_json("report", &comprehensive_report(&report.quotes))
}
