//! Airport classification.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Classification column of the airport dataset.
///
/// Unknown values are preserved verbatim in [`AirportClass::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AirportClass {
    Large,
    Medium,
    Small,
    Heliport,
    SeaplaneBase,
    Balloonport,
    Closed,
    Other(String),
}

impl AirportClass {
    pub fn as_str(&self) -> &str {
        match self {
            AirportClass::Large => "large_airport",
            AirportClass::Medium => "medium_airport",
            AirportClass::Small => "small_airport",
            AirportClass::Heliport => "heliport",
            AirportClass::SeaplaneBase => "seaplane_base",
            AirportClass::Balloonport => "balloonport",
            AirportClass::Closed => "closed",
            AirportClass::Other(raw) => raw,
        }
    }
}

impl FromStr for AirportClass {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let class = match s.trim().to_lowercase().as_str() {
            "large_airport" => AirportClass::Large,
            "medium_airport" => AirportClass::Medium,
            "small_airport" => AirportClass::Small,
            "heliport" => AirportClass::Heliport,
            "seaplane_base" => AirportClass::SeaplaneBase,
            "balloonport" => AirportClass::Balloonport,
            "closed" => AirportClass::Closed,
            _ => AirportClass::Other(s.trim().to_string()),
        };
        Ok(class)
    }
}

impl fmt::Display for AirportClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_classes() {
        assert_eq!(
            "large_airport".parse::<AirportClass>().unwrap(),
            AirportClass::Large
        );
        assert_eq!(
            "Small_Airport".parse::<AirportClass>().unwrap(),
            AirportClass::Small
        );
        assert_eq!("closed".parse::<AirportClass>().unwrap(), AirportClass::Closed);
    }

    #[test]
    fn test_unknown_class_is_preserved() {
        let class: AirportClass = "spaceport".parse().unwrap();
        assert_eq!(class, AirportClass::Other("spaceport".to_string()));
        assert_eq!(class.to_string(), "spaceport");
    }

    #[test]
    fn test_display_round_trips() {
        for class in [
            AirportClass::Large,
            AirportClass::Medium,
            AirportClass::Small,
            AirportClass::Heliport,
            AirportClass::SeaplaneBase,
            AirportClass::Balloonport,
            AirportClass::Closed,
        ] {
            assert_eq!(class.to_string().parse::<AirportClass>().unwrap(), class);
        }
    }
}
