pub mod lane;
pub mod quote;

pub use lane::LaneKey;
pub use quote::{CustomerId, QuoteRecord, ShipmentType};
