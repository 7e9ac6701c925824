//! Access to stored records
//!
//! Records are loosely shaped rows; the schema layer only reads the columns
//! it needs (subtype discriminators and structure pointer fields).

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A stored row, column name to value
pub type Record = Map<String, Value>;

/// Column holding a record's unique id
pub const UID_FIELD: &str = "uid";

/// Fetches records by table and uid
pub trait RecordSource: Send + Sync {
    fn record(&self, table: &str, uid: u64) -> Option<Record>;
}

/// Records held in memory, grouped by table and keyed by `uid`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryRecords {
    tables: HashMap<String, Vec<Record>>,
}

impl MemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON map of table name to list of rows.
    ///
    /// Every row must be a map with a positive integer `uid`.
    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Object(tables) = value else {
            return Err(Error::InvalidRecord {
                table: "*".to_string(),
                message: "records root must be a map of tables".to_string(),
            });
        };

        let mut records = Self::new();
        for (table, rows) in tables {
            let Value::Array(rows) = rows else {
                return Err(Error::InvalidRecord {
                    table,
                    message: "rows must be a list".to_string(),
                });
            };
            for row in rows {
                let Value::Object(row) = row else {
                    return Err(Error::InvalidRecord {
                        table,
                        message: "row must be a map".to_string(),
                    });
                };
                records.insert(&table, row)?;
            }
        }
        Ok(records)
    }

    /// Insert or replace a row, keyed by its `uid`
    pub fn insert(&mut self, table: &str, row: Record) -> Result<()> {
        let uid = record_uid(&row).ok_or_else(|| Error::InvalidRecord {
            table: table.to_string(),
            message: "row has no positive integer uid".to_string(),
        })?;

        let rows = self.tables.entry(table.to_string()).or_default();
        match rows.iter_mut().find(|existing| record_uid(existing) == Some(uid)) {
            Some(existing) => *existing = row,
            None => rows.push(row),
        }
        Ok(())
    }

    /// Rows of `table` in insertion order
    pub fn rows(&self, table: &str) -> &[Record] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn record_mut(&mut self, table: &str, uid: u64) -> Option<&mut Record> {
        self.tables
            .get_mut(table)?
            .iter_mut()
            .find(|row| record_uid(row) == Some(uid))
    }

    /// Serialize back into the `{table: [rows]}` shape, tables sorted by name
    pub fn to_json(&self) -> Value {
        let mut names: Vec<_> = self.tables.keys().collect();
        names.sort();
        Value::Object(
            names
                .into_iter()
                .map(|name| {
                    let rows = self.tables[name].iter().cloned().map(Value::Object).collect();
                    (name.clone(), Value::Array(rows))
                })
                .collect(),
        )
    }
}

impl RecordSource for MemoryRecords {
    fn record(&self, table: &str, uid: u64) -> Option<Record> {
        self.rows(table)
            .iter()
            .find(|row| record_uid(row) == Some(uid))
            .cloned()
    }
}

/// Read the `uid` column as a positive integer; numeric strings are accepted
pub fn record_uid(record: &Record) -> Option<u64> {
    int_value(record.get(UID_FIELD)?).filter(|uid| *uid > 0)
}

/// Loose unsigned integer reading of a column value
pub fn int_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        Value::Bool(flag) => Some(u64::from(*flag)),
        _ => None,
    }
}
