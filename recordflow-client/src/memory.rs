//! In-memory record store
//!
//! Keeps records in a map and remembers every call in order. Used by tests
//! and by `--dry-run` executions.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::{ClientError, Result};
use crate::records::{Fields, RecordStore};

/// A write issued against the store
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Create {
        table: String,
        record_id: String,
        fields: Fields,
    },
    Update {
        table: String,
        record_id: String,
        fields: Fields,
    },
}

impl StoreCall {
    pub fn table(&self) -> &str {
        match self {
            StoreCall::Create { table, .. } | StoreCall::Update { table, .. } => table,
        }
    }

    pub fn record_id(&self) -> &str {
        match self {
            StoreCall::Create { record_id, .. } | StoreCall::Update { record_id, .. } => record_id,
        }
    }

    pub fn fields(&self) -> &Fields {
        match self {
            StoreCall::Create { fields, .. } | StoreCall::Update { fields, .. } => fields,
        }
    }
}

#[derive(Default)]
struct State {
    next_id: u64,
    records: HashMap<(String, String), Fields>,
    calls: Vec<StoreCall>,
    failing_tables: HashSet<String>,
}

/// Thread-safe in-memory implementation of [`RecordStore`]
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an existing record, as if created outside the pipeline
    pub fn insert(&self, table: &str, record_id: &str, fields: Fields) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state
            .records
            .insert((table.to_string(), record_id.to_string()), fields);
    }

    /// Makes every subsequent create in `table` fail with a 422
    pub fn fail_creates_in(&self, table: &str) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.failing_tables.insert(table.to_string());
    }

    /// Current fields of a record
    pub fn record(&self, table: &str, record_id: &str) -> Option<Fields> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state
            .records
            .get(&(table.to_string(), record_id.to_string()))
            .cloned()
    }

    /// Number of records stored in a table
    pub fn count(&self, table: &str) -> usize {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.records.keys().filter(|(t, _)| t == table).count()
    }

    /// Every successful write, in the order it happened
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).calls.clone()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn create(&self, table: &str, fields: Fields) -> Result<String> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if state.failing_tables.contains(table) {
            return Err(ClientError::api_error(
                422,
                format!("create rejected for table {}", table),
            ));
        }

        state.next_id += 1;
        let record_id = format!("rec{:06}", state.next_id);

        state
            .records
            .insert((table.to_string(), record_id.clone()), fields.clone());
        state.calls.push(StoreCall::Create {
            table: table.to_string(),
            record_id: record_id.clone(),
            fields,
        });

        Ok(record_id)
    }

    async fn update(&self, table: &str, record_id: &str, fields: Fields) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let key = (table.to_string(), record_id.to_string());
        let record = state.records.get_mut(&key).ok_or_else(|| {
            ClientError::api_error(404, format!("record {} not found in {}", record_id, table))
        })?;
        record.extend(fields.clone());

        state.calls.push(StoreCall::Update {
            table: table.to_string(),
            record_id: record_id.to_string(),
            fields,
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_unique_ids() {
        let store = InMemoryRecordStore::new();
        let a = store.create("People", Fields::new()).await.unwrap();
        let b = store.create("People", Fields::new()).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(store.count("People"), 2);
        assert_eq!(store.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = InMemoryRecordStore::new();
        store.insert("Companies", "rec123", fields(json!({"Name": "Acme"})));

        store
            .update("Companies", "rec123", fields(json!({"Status": "Synchronized"})))
            .await
            .unwrap();

        let record = store.record("Companies", "rec123").unwrap();
        assert_eq!(record["Name"], "Acme");
        assert_eq!(record["Status"], "Synchronized");
    }

    #[tokio::test]
    async fn test_update_unknown_record_is_not_found() {
        let store = InMemoryRecordStore::new();
        let err = store
            .update("Companies", "recMissing", Fields::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failing_table() {
        let store = InMemoryRecordStore::new();
        store.fail_creates_in("Pets");

        assert!(store.create("People", Fields::new()).await.is_ok());
        assert!(store.create("Pets", Fields::new()).await.is_err());
    }
}
