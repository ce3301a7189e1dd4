//! Historical context block for external oracles.
//!
//! An LLM-backed predictor embeds this block in its prompt; building it is
//! data-side work, so it lives here rather than with any client.

use std::fmt::Write;

use crate::analyzer::{aggregate, AggregateStat, Dimension};
use crate::domain::QuoteRecord;
use crate::predictor::PredictionContext;

/// Render the four stat blocks (customer, lane, shipment type, commodity)
/// for the given context.
pub fn oracle_context(quotes: &[QuoteRecord], context: &PredictionContext) -> String {
    let customer = aggregate(quotes, Dimension::Customer, &context.customer.0);
    let lane = aggregate(quotes, Dimension::Lane, &context.lane.to_string());
    let shipment =
        aggregate(quotes, Dimension::ShipmentType, context.shipment_type.as_str());
    let commodity = aggregate(quotes, Dimension::Commodity, &context.commodity_type);

    let mut block = String::from("Historical quote context:\n");
    push_section(&mut block, &format!("Customer {}", context.customer), &customer);
    push_section(&mut block, &format!("Lane {}", context.lane), &lane);
    push_section(&mut block, &format!("Shipment type {}", context.shipment_type), &shipment);
    push_section(&mut block, &format!("Commodity {}", context.commodity_type), &commodity);
    block
}

fn push_section(block: &mut String, heading: &str, stat: &AggregateStat) {
    let average = stat
        .average_accepted_discount
        .map(|discount| format!("{discount:.1}%"))
        .unwrap_or_else(|| "n/a".to_string());

    let _ = write!(
        block,
        "\n{heading}:\n- total quotes: {}\n- acceptance rate: {:.1}%\n- average accepted discount: {average}\n",
        stat.total_count,
        stat.acceptance_rate * 100.0,
    );
}
