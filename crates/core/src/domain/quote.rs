use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::lane::LaneKey;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

impl CustomerId {
    /// Canonical form: trimmed, uppercase.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentType {
    Air,
    OfrFcl,
    OfrLcl,
}

impl ShipmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Air => "air",
            Self::OfrFcl => "ofr fcl",
            Self::OfrLcl => "ofr lcl",
        }
    }

    /// Accepts spaced, underscored, and hyphenated spellings in any case.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "air" => Some(Self::Air),
            "ofr fcl" => Some(Self::OfrFcl),
            "ofr lcl" => Some(Self::OfrLcl),
            _ => None,
        }
    }
}

impl fmt::Display for ShipmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One historical quotation row. Immutable once built; a session's quote set
/// is replaced wholesale on each new load, never merged incrementally.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub customer: CustomerId,
    pub quote_date: NaiveDate,
    pub origin_country: String,
    pub origin_station: String,
    pub destination_country: String,
    pub destination_station: String,
    pub shipment_type: ShipmentType,
    /// Open string category, canonical lowercase.
    pub commodity_type: String,
    /// Percentage in [0, 100].
    pub discount_offered: f64,
    pub accepted: bool,
}

impl QuoteRecord {
    /// Derived route key; not stored, computed on demand.
    pub fn lane(&self) -> LaneKey {
        LaneKey::new(
            &self.origin_country,
            &self.origin_station,
            &self.destination_country,
            &self.destination_station,
        )
    }
}
