//! [`AirportStore`] over the SQL gateway.

use super::gateway::SqlGateway;
use super::response::Row;
use super::schema::ENTITIES_TABLE;
use super::sql::{quote, InsertQuery, SqlValue};
use super::{AirportStore, StoreError};
use crate::airport::{Airport, AirportClass};
use crate::log_debug;

const COLUMNS: [&str; 10] = [
    "uid",
    "name",
    "country",
    "region",
    "municipality",
    "latitude",
    "longitude",
    "class",
    "primary_code",
    "secondary_code",
];

impl AirportStore for SqlGateway {
    fn import_airports(&self, airports: &[Airport]) -> Result<usize, StoreError> {
        let mut insert = InsertQuery::new(ENTITIES_TABLE, &COLUMNS).on_conflict_do_nothing("uid");
        for airport in airports {
            let (Some(uid), Some(primary)) = (airport.uid(), airport.primary_code.as_deref())
            else {
                continue;
            };
            insert.row(&[
                SqlValue::Text(&uid),
                SqlValue::Text(&airport.name),
                SqlValue::Text(&airport.country),
                SqlValue::Text(&airport.region),
                SqlValue::Text(&airport.municipality),
                SqlValue::Real(airport.latitude),
                SqlValue::Real(airport.longitude),
                SqlValue::Text(airport.class.as_str()),
                SqlValue::Text(primary),
                airport.secondary_code.as_deref().into(),
            ]);
        }
        if insert.is_empty() {
            return Ok(0);
        }
        log_debug!(self.logger, "Inserting {} airports", insert.len());
        Ok(self
            .run_quiet("airport insert", &insert.build(), false)?
            .row_count)
    }

    fn get_airport(&self, uid: &str) -> Result<Option<Airport>, StoreError> {
        let query = format!(
            "SELECT {} FROM {} WHERE uid = {}",
            COLUMNS[1..].join(", "),
            ENTITIES_TABLE,
            quote(uid)
        );
        let response = self.run("airport lookup", &query, true)?;
        match response.rows.first() {
            None => Ok(None),
            Some(row) => decode_airport(row).map(Some).ok_or_else(|| StoreError::Decode {
                operation: "airport lookup".to_string(),
                message: format!("unexpected row shape {:?}", row),
            }),
        }
    }

    fn count_airports(&self) -> Result<usize, StoreError> {
        let query = format!("SELECT COUNT(*) FROM {}", ENTITIES_TABLE);
        let response = self.run("airport count", &query, true)?;
        response
            .scalar()
            .and_then(|v| v.as_i64())
            .map(|n| n as usize)
            .ok_or_else(|| StoreError::Decode {
                operation: "airport count".to_string(),
                message: "missing count".to_string(),
            })
    }
}

fn decode_airport(row: &Row) -> Option<Airport> {
    let text = |i: usize| row.get(i).and_then(|v| v.as_str());
    let class = text(6)?
        .parse::<AirportClass>()
        .unwrap_or_else(|never| match never {});
    Some(Airport {
        name: text(0)?.to_string(),
        country: text(1)?.to_string(),
        region: text(2)?.to_string(),
        municipality: text(3)?.to_string(),
        latitude: row.get(4)?.as_f64()?,
        longitude: row.get(5)?.as_f64()?,
        class,
        primary_code: Some(text(7)?.to_string()),
        secondary_code: text(8).map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::NoOpLogger;
    use crate::store::{RetryPolicy, Schema, SqliteExecutor};
    use std::sync::Arc;

    fn store() -> SqlGateway {
        let executor = Arc::new(SqliteExecutor::open_in_memory().unwrap());
        let gateway =
            SqlGateway::new(executor, Arc::new(NoOpLogger)).with_retry(RetryPolicy::none());
        gateway.initialize(&Schema::Builtin).unwrap();
        gateway
    }

    fn sofia() -> Airport {
        Airport::builder("Sofia Airport", 42.6952, 23.4062)
            .country("BG")
            .region("BG-23")
            .municipality("Sofia")
            .class(AirportClass::Large)
            .primary_code("SOF")
            .build()
    }

    #[test]
    fn test_import_and_get() {
        let store = store();
        assert_eq!(store.import_airports(&[sofia()]).unwrap(), 1);

        let loaded = store.get_airport("SOF").unwrap().unwrap();
        assert_eq!(loaded.name, "Sofia Airport");
        assert_eq!(loaded.class, AirportClass::Large);
        assert_eq!(loaded.latitude, 42.6952);
        assert!(loaded.secondary_code.is_none());
        assert!(store.get_airport("XXX").unwrap().is_none());
    }

    #[test]
    fn test_import_skips_existing_and_codeless() {
        let store = store();
        let codeless = Airport::builder("Strip", 1.0, 1.0).build();
        assert_eq!(store.import_airports(&[sofia(), codeless]).unwrap(), 1);
        assert_eq!(store.import_airports(&[sofia()]).unwrap(), 0);
        assert_eq!(store.count_airports().unwrap(), 1);
    }

    #[test]
    fn test_secondary_code_round_trips() {
        let store = store();
        let heathrow = Airport::builder("Heathrow", 51.47, -0.46)
            .primary_code("LHR")
            .secondary_code("EGLL")
            .build();
        store.import_airports(&[heathrow]).unwrap();
        let loaded = store.get_airport("LHR_EGLL").unwrap().unwrap();
        assert_eq!(loaded.secondary_code.as_deref(), Some("EGLL"));
    }
}
