//! Quote batch ingestion.
//!
//! Validates and normalizes raw string-typed records into canonical
//! [`QuoteRecord`]s. Invalid records are never coerced: depending on the
//! configured policy they are either rejected individually (reported with
//! row and reason) or fail the whole batch.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{CustomerId, QuoteRecord, ShipmentType};
use crate::errors::DomainError;

/// A record as it arrives from the presentation layer, every field still a
/// string. Serde aliases cover the legacy export headers (`customerName`,
/// `shipperCountry`, ...) alongside the canonical snake_case ones.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawQuoteRecord {
    #[serde(default)]
    pub date: String,
    #[serde(default, alias = "customerName")]
    pub customer_id: String,
    #[serde(default, alias = "shipmentType")]
    pub shipment_type: String,
    #[serde(default, alias = "commodityType")]
    pub commodity_type: String,
    #[serde(default, alias = "shipper_country", alias = "shipperCountry")]
    pub origin_country: String,
    #[serde(default, alias = "shipper_station", alias = "shipperStation")]
    pub origin_station: String,
    #[serde(default, alias = "consignee_country", alias = "consigneeCountry")]
    pub destination_country: String,
    #[serde(default, alias = "consignee_station", alias = "consigneeStation")]
    pub destination_station: String,
    #[serde(default, alias = "discount")]
    pub discount_offered: String,
    /// `accepted`/`rejected`; alternative to the boolean `accepted` column.
    #[serde(default)]
    pub status: Option<String>,
    /// Boolean-ish acceptance flag; alternative to `status`.
    #[serde(default)]
    pub accepted: Option<String>,
}

/// What to do with a record that fails validation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidRecordPolicy {
    /// Reject the record, keep the rest of the batch. The default.
    #[default]
    Skip,
    /// Fail the whole batch on the first invalid record.
    Abort,
}

impl InvalidRecordPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Abort => "abort",
        }
    }
}

impl FromStr for InvalidRecordPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            other => Err(format!("unsupported invalid-record policy `{other}` (expected skip|abort)")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RejectedRecord {
    /// 1-based data row index (header excluded).
    pub row: usize,
    pub reason: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct IngestReport {
    pub quotes: Vec<QuoteRecord>,
    pub rejected: Vec<RejectedRecord>,
    pub duplicates_removed: usize,
}

/// Validate and normalize a raw batch. The returned quote set replaces any
/// previously loaded one; callers own it and pass it into every analyzer and
/// optimizer call.
pub fn ingest(
    records: &[RawQuoteRecord],
    policy: InvalidRecordPolicy,
) -> Result<IngestReport, DomainError> {
    let mut report = IngestReport::default();
    let mut seen = HashSet::new();

    for (index, raw) in records.iter().enumerate() {
        let row = index + 1;
        let quote = match convert(raw) {
            Ok(quote) => quote,
            Err(reason) => {
                debug!(row, %reason, "rejecting malformed quote record");
                match policy {
                    InvalidRecordPolicy::Skip => {
                        report.rejected.push(RejectedRecord { row, reason });
                        continue;
                    }
                    InvalidRecordPolicy::Abort => {
                        return Err(DomainError::MalformedRecord { row, reason });
                    }
                }
            }
        };

        if seen.insert(dedup_key(&quote)) {
            report.quotes.push(quote);
        } else {
            report.duplicates_removed += 1;
        }
    }

    info!(
        loaded = report.quotes.len(),
        rejected = report.rejected.len(),
        duplicates_removed = report.duplicates_removed,
        "quote batch ingested"
    );

    Ok(report)
}

fn convert(raw: &RawQuoteRecord) -> Result<QuoteRecord, String> {
    let customer_id = raw.customer_id.trim();
    if customer_id.is_empty() {
        return Err("missing customer_id".to_string());
    }

    let quote_date = parse_date(&raw.date)?;
    let shipment_type = ShipmentType::parse(&raw.shipment_type)
        .ok_or_else(|| format!("unknown shipment_type `{}`", raw.shipment_type.trim()))?;

    let commodity_type = text_field("commodity_type", &raw.commodity_type)?;
    let origin_country = text_field("origin_country", &raw.origin_country)?;
    let origin_station = text_field("origin_station", &raw.origin_station)?;
    let destination_country = text_field("destination_country", &raw.destination_country)?;
    let destination_station = text_field("destination_station", &raw.destination_station)?;

    let discount_offered = parse_discount(&raw.discount_offered)?;
    let accepted = parse_outcome(raw)?;

    Ok(QuoteRecord {
        customer: CustomerId::new(customer_id),
        quote_date,
        origin_country,
        origin_station,
        destination_country,
        destination_station,
        shipment_type,
        commodity_type,
        discount_offered,
        accepted,
    })
}

fn text_field(name: &str, value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("missing {name}"));
    }
    Ok(trimmed.to_ascii_lowercase())
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("missing date".to_string());
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%m/%d/%Y"))
        .map_err(|_| format!("unparseable date `{trimmed}` (expected YYYY-MM-DD or M/D/YYYY)"))
}

fn parse_discount(value: &str) -> Result<f64, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("missing discount_offered".to_string());
    }

    let discount = trimmed
        .parse::<f64>()
        .map_err(|_| format!("non-numeric discount_offered `{trimmed}`"))?;

    if !discount.is_finite() || !(0.0..=100.0).contains(&discount) {
        return Err(format!("discount_offered {discount} outside [0, 100]"));
    }

    Ok(discount)
}

fn parse_outcome(raw: &RawQuoteRecord) -> Result<bool, String> {
    if let Some(flag) = raw.accepted.as_deref().map(str::trim).filter(|flag| !flag.is_empty()) {
        return match flag.to_ascii_lowercase().as_str() {
            "true" | "t" | "1" | "yes" | "y" => Ok(true),
            "false" | "f" | "0" | "no" | "n" => Ok(false),
            other => Err(format!("unrecognized accepted flag `{other}`")),
        };
    }

    if let Some(status) = raw.status.as_deref().map(str::trim).filter(|status| !status.is_empty())
    {
        return match status.to_ascii_lowercase().as_str() {
            "accepted" => Ok(true),
            "rejected" => Ok(false),
            other => Err(format!("unrecognized status `{other}` (expected accepted|rejected)")),
        };
    }

    Err("missing acceptance outcome (`accepted` or `status`)".to_string())
}

fn dedup_key(quote: &QuoteRecord) -> (String, NaiveDate, &'static str, String, String, u64, bool) {
    (
        quote.customer.0.clone(),
        quote.quote_date,
        quote.shipment_type.as_str(),
        quote.commodity_type.clone(),
        quote.lane().to_string(),
        quote.discount_offered.to_bits(),
        quote.accepted,
    )
}
