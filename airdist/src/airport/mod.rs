//! Airport entity model and dataset loading.
//!
//! An [`Airport`] is the point-located entity everything else in the crate
//! works with: the proximity grid buckets airports by coordinates and the
//! distance cache keys its records by airport UID.
//!
//! # Data Source
//!
//! Airports are read from a delimited text file with a header row:
//!
//! ```text
//! name;iso_country;iso_region;municipality;latitude;longitude;type;iata_code;local_code
//! Sofia Airport;BG;BG-23;Sofia;42.6952;23.4062;large_airport;SOF;
//! ```
//!
//! # Example
//!
//! ```
//! use airdist::airport::Airport;
//!
//! let sofia = Airport::builder("Sofia Airport", 42.7, 23.4).primary_code("SOF").build();
//! assert_eq!(sofia.uid().as_deref(), Some("SOF"));
//! ```

mod class;
mod index;
mod matrix;
mod parser;

use std::hash::{Hash, Hasher};

pub use class::AirportClass;
pub use index::{cacheable_airports, AirportIndex, AirportIndexError};
pub use matrix::{DistanceMatrix, MatrixError};
pub use parser::{DatasetParser, ParseError, DEFAULT_DELIMITER};

use crate::geodesic;

/// A latitude/longitude pair in decimal degrees.
///
/// Equality and hashing are bit-exact on both components, with `-0.0`
/// folded into `0.0` so the two zeroes compare equal.
#[derive(Debug, Clone, Copy)]
pub struct Coordinates {
    /// Latitude in decimal degrees, -90 to 90.
    pub latitude: f64,
    /// Longitude in decimal degrees, -180 to 180.
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    fn key(&self) -> (u64, u64) {
        (canonical_bits(self.latitude), canonical_bits(self.longitude))
    }
}

fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

impl PartialEq for Coordinates {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Coordinates {}

impl Hash for Coordinates {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl From<(f64, f64)> for Coordinates {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

/// An airport with identity fields, a classification and a location.
///
/// Two airports compare equal when they sit at the same coordinates. The
/// proximity grid relies on this to recognise the query airport in its own
/// results.
#[derive(Debug, Clone)]
pub struct Airport {
    /// Full airport name.
    pub name: String,
    /// ISO country code.
    pub country: String,
    /// ISO region code.
    pub region: String,
    /// Served municipality.
    pub municipality: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Airport classification (large, medium, small, heliport...).
    pub class: AirportClass,
    /// Primary code (IATA). Airports without one are not cached.
    pub primary_code: Option<String>,
    /// Secondary code (local code), folded into the UID when present.
    pub secondary_code: Option<String>,
}

impl Airport {
    /// Start building an airport from the fields every record has.
    pub fn builder(name: &str, latitude: f64, longitude: f64) -> AirportBuilder {
        AirportBuilder {
            airport: Airport {
                name: name.to_string(),
                country: String::new(),
                region: String::new(),
                municipality: String::new(),
                latitude,
                longitude,
                class: AirportClass::Other(String::new()),
                primary_code: None,
                secondary_code: None,
            },
        }
    }

    /// Unique cache key for this airport.
    ///
    /// The primary code on its own, or `{primary}_{secondary}` when a
    /// secondary code exists. `None` when there is no primary code.
    pub fn uid(&self) -> Option<String> {
        let primary = self.primary_code.as_deref()?;
        match self.secondary_code.as_deref() {
            Some(secondary) => Some(format!("{}_{}", primary, secondary)),
            None => Some(primary.to_string()),
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Geodesic distance to another airport in kilometres.
    pub fn distance_to(&self, other: &Airport) -> f64 {
        geodesic::distance_km(self.coordinates(), other.coordinates())
    }
}

impl PartialEq for Airport {
    fn eq(&self, other: &Self) -> bool {
        self.coordinates() == other.coordinates()
    }
}

impl Eq for Airport {}

impl Hash for Airport {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.coordinates().hash(state);
    }
}

/// Builder for [`Airport`], mostly useful in tests and fixtures.
#[derive(Debug, Clone)]
pub struct AirportBuilder {
    airport: Airport,
}

impl AirportBuilder {
    pub fn country(mut self, country: &str) -> Self {
        self.airport.country = country.to_string();
        self
    }

    pub fn region(mut self, region: &str) -> Self {
        self.airport.region = region.to_string();
        self
    }

    pub fn municipality(mut self, municipality: &str) -> Self {
        self.airport.municipality = municipality.to_string();
        self
    }

    pub fn class(mut self, class: AirportClass) -> Self {
        self.airport.class = class;
        self
    }

    pub fn primary_code(mut self, code: &str) -> Self {
        self.airport.primary_code = Some(code.to_string());
        self
    }

    pub fn secondary_code(mut self, code: &str) -> Self {
        self.airport.secondary_code = Some(code.to_string());
        self
    }

    pub fn build(self) -> Airport {
        self.airport
    }
}
