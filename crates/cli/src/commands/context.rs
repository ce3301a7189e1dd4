use lanewise_core::config::AppConfig;
use lanewise_core::oracle_context;

use crate::commands::{parse_context, CommandResult};
use crate::loader::load_quotes;
use crate::{ContextArgs, DataArgs};

pub fn run(config: &AppConfig, data: &DataArgs, context: &ContextArgs) -> CommandResult {
    let context = match parse_context("context", context) {
        Ok(context) => context,
        Err(failure) => return failure,
    };

    let report = match load_quotes(config, &data.data) {
        Ok(report) => report,
        Err(error) => return CommandResult::failure("context", "data_load", format!("{error:#}")),
    };

    CommandResult::success(oracle_context(&report.quotes, &context))
}
