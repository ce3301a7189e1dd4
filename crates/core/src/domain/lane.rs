use std::fmt;

use serde::{Deserialize, Serialize};

/// Origin-destination route key, derived from a quote's four route fields.
/// Renders as `origin_country_origin_station-destination_country_destination_station`,
/// e.g. `usa_lax-germany_ham`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaneKey {
    pub origin_country: String,
    pub origin_station: String,
    pub destination_country: String,
    pub destination_station: String,
}

impl LaneKey {
    pub fn new(
        origin_country: &str,
        origin_station: &str,
        destination_country: &str,
        destination_station: &str,
    ) -> Self {
        Self {
            origin_country: canonical(origin_country),
            origin_station: canonical(origin_station),
            destination_country: canonical(destination_country),
            destination_station: canonical(destination_station),
        }
    }

    /// Accepts the canonical `usa_lax-germany_ham` form as well as the
    /// human-facing `USA-LAX to Germany-HAM` form.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();

        if let Some((origin, destination)) = value.split_once(" to ") {
            let origin = origin.trim().replace('-', "_");
            let destination = destination.trim().replace('-', "_");
            return Self::from_halves(&origin, &destination);
        }

        let (origin, destination) = value.split_once('-')?;
        Self::from_halves(origin, destination)
    }

    fn from_halves(origin: &str, destination: &str) -> Option<Self> {
        let (origin_country, origin_station) = origin.split_once('_')?;
        let (destination_country, destination_station) = destination.split_once('_')?;

        if [origin_country, origin_station, destination_country, destination_station]
            .iter()
            .any(|part| part.trim().is_empty())
        {
            return None;
        }

        Some(Self::new(origin_country, origin_station, destination_country, destination_station))
    }
}

impl fmt::Display for LaneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}-{}_{}",
            self.origin_country,
            self.origin_station,
            self.destination_country,
            self.destination_station
        )
    }
}

fn canonical(part: &str) -> String {
    part.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::LaneKey;

    #[test]
    fn renders_canonical_form() {
        let lane = LaneKey::new("USA", "LAX", "Germany", "HAM");
        assert_eq!(lane.to_string(), "usa_lax-germany_ham");
    }

    #[test]
    fn parses_canonical_form() {
        let lane = LaneKey::parse("usa_lax-germany_ham").expect("canonical form");
        assert_eq!(lane, LaneKey::new("usa", "lax", "germany", "ham"));
    }

    #[test]
    fn parses_human_form() {
        let lane = LaneKey::parse("USA-LAX to Germany-HAM").expect("human form");
        assert_eq!(lane.to_string(), "usa_lax-germany_ham");
    }

    #[test]
    fn rejects_incomplete_keys() {
        assert_eq!(LaneKey::parse("usa_lax"), None);
        assert_eq!(LaneKey::parse("usa-germany_ham"), None);
        assert_eq!(LaneKey::parse(""), None);
    }
}
