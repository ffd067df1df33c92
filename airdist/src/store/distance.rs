//! [`DistanceStore`] over the SQL gateway.

use std::collections::HashMap;

use super::gateway::SqlGateway;
use super::response::QueryResponse;
use super::schema::DISTANCES_TABLE;
use super::sql::{quote, InsertQuery, SqlValue};
use super::{DistanceStore, StoreError};
use crate::pipeline::{order_uids, DistanceRecord};
use crate::{log_debug, log_warn};

const COLUMNS: [&str; 4] = ["pair_id", "entity1_uid", "entity2_uid", "distance_km"];

fn insert_query(records: &[DistanceRecord]) -> InsertQuery {
    let mut insert = InsertQuery::new(DISTANCES_TABLE, &COLUMNS).on_conflict_do_nothing("pair_id");
    for record in records {
        insert.row(&[
            SqlValue::Text(record.pair_id.as_str()),
            SqlValue::Text(&record.uid1),
            SqlValue::Text(&record.uid2),
            SqlValue::Real(record.distance_km),
        ]);
    }
    insert
}

fn pair_filter(a: &str, b: &str) -> String {
    let (first, second) = order_uids(a, b);
    format!(
        "entity1_uid = {} AND entity2_uid = {}",
        quote(first),
        quote(second)
    )
}

fn decode_error(operation: &str, response: &QueryResponse) -> StoreError {
    StoreError::Decode {
        operation: operation.to_string(),
        message: format!("unexpected row shape {:?}", response.rows.first()),
    }
}

impl DistanceStore for SqlGateway {
    fn bulk_upsert(&self, records: &[DistanceRecord]) -> Result<usize, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }
        log_debug!(self.logger, "Bulk inserting {} distance records", records.len());
        let query = insert_query(records).build();
        let response = self.run_quiet("bulk insert", &query, false)?;
        if response.row_count != records.len() {
            log_warn!(
                self.logger,
                "Inserted {} distance records from a batch of {}",
                response.row_count,
                records.len()
            );
        }
        Ok(response.row_count)
    }

    fn insert_distance(&self, record: &DistanceRecord) -> Result<usize, StoreError> {
        log_debug!(
            self.logger,
            "Inserting distance {} -> {} (~{:.2}km)",
            record.uid1,
            record.uid2,
            record.distance_km
        );
        let query = insert_query(std::slice::from_ref(record)).build();
        Ok(self.run("insert distance", &query, false)?.row_count)
    }

    fn pair_exists(&self, a: &str, b: &str) -> Result<bool, StoreError> {
        let query = format!(
            "SELECT COUNT(*) FROM {} WHERE {}",
            DISTANCES_TABLE,
            pair_filter(a, b)
        );
        let response = self.run("pair lookup", &query, true)?;
        let count = response
            .scalar()
            .and_then(|v| v.as_i64())
            .ok_or_else(|| decode_error("pair lookup", &response))?;
        Ok(count > 0)
    }

    fn get_distance(&self, a: &str, b: &str) -> Result<Option<f64>, StoreError> {
        let query = format!(
            "SELECT distance_km FROM {} WHERE {}",
            DISTANCES_TABLE,
            pair_filter(a, b)
        );
        let response = self.run("distance lookup", &query, true)?;
        if response.row_count == 0 {
            log_debug!(self.logger, "No cached distance for {} -> {}", a, b);
            return Ok(None);
        }
        if response.row_count > 1 {
            log_warn!(
                self.logger,
                "Multiple ({}) entries found for distance pair {} -> {}",
                response.row_count,
                a,
                b
            );
        }
        response
            .scalar()
            .and_then(|v| v.as_f64())
            .map(Some)
            .ok_or_else(|| decode_error("distance lookup", &response))
    }

    fn pairs_for(&self, uid: &str) -> Result<HashMap<String, f64>, StoreError> {
        let uid_literal = quote(uid);
        let query = format!(
            "SELECT entity1_uid, distance_km FROM {table} WHERE entity2_uid = {uid} \
             UNION ALL \
             SELECT entity2_uid, distance_km FROM {table} WHERE entity1_uid = {uid}",
            table = DISTANCES_TABLE,
            uid = uid_literal
        );
        let response = self.run("pairs lookup", &query, true)?;

        let mut pairs = HashMap::with_capacity(response.row_count);
        for row in &response.rows {
            let (Some(partner), Some(km)) = (
                row.first().and_then(|v| v.as_str()),
                row.get(1).and_then(|v| v.as_f64()),
            ) else {
                return Err(decode_error("pairs lookup", &response));
            };
            if pairs.insert(partner.to_string(), km).is_some() {
                log_warn!(self.logger, "Duplicate pair {} -> {} found", uid, partner);
            }
        }
        log_debug!(self.logger, "Found {} pairs for airport {}", pairs.len(), uid);
        Ok(pairs)
    }
}
