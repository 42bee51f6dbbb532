//! Record create/update endpoints

use async_trait::async_trait;
use recordflow_core::retry::with_retry;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::AirtableClient;
use crate::error::{ClientError, Result};

/// Field values of a record, keyed by column name
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Write access to the record store, one table at a time
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Creates a record and returns its id
    async fn create(&self, table: &str, fields: Fields) -> Result<String>;

    /// Updates the given fields of an existing record
    async fn update(&self, table: &str, record_id: &str, fields: Fields) -> Result<()>;
}

#[derive(Serialize)]
struct WriteRecords<'a> {
    records: Vec<WriteRecord<'a>>,
}

#[derive(Serialize)]
struct WriteRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    fields: &'a Fields,
}

#[derive(Deserialize)]
struct RecordsResponse {
    records: Vec<RecordRef>,
}

#[derive(Deserialize)]
struct RecordRef {
    id: String,
}

impl RecordsResponse {
    fn first_id(self) -> Result<String> {
        self.records
            .into_iter()
            .next()
            .map(|r| r.id)
            .ok_or_else(|| ClientError::ParseError("Response contained no records".to_string()))
    }
}

#[async_trait]
impl RecordStore for AirtableClient {
    async fn create(&self, table: &str, fields: Fields) -> Result<String> {
        let url = self.table_url(table)?;
        let body = WriteRecords {
            records: vec![WriteRecord {
                id: None,
                fields: &fields,
            }],
        };

        debug!("Creating record in table {}", table);

        let operation = format!("create record in {}", table);
        let response: RecordsResponse = with_retry(&self.config.retry, &operation, || async {
            let response = self
                .client
                .post(url.clone())
                .bearer_auth(&self.config.token)
                .json(&body)
                .send()
                .await?;
            self.handle_response(response).await
        })
        .await?;

        let record_id = response.first_id()?;
        debug!("Created record {} in table {}", record_id, table);
        Ok(record_id)
    }

    async fn update(&self, table: &str, record_id: &str, fields: Fields) -> Result<()> {
        let url = self.table_url(table)?;
        let body = WriteRecords {
            records: vec![WriteRecord {
                id: Some(record_id),
                fields: &fields,
            }],
        };

        debug!(
            "Updating record {} in table {} (fields: {:?})",
            record_id,
            table,
            fields.keys().collect::<Vec<_>>()
        );

        let operation = format!("update record {} in {}", record_id, table);
        let response: RecordsResponse = with_retry(&self.config.retry, &operation, || async {
            let response = self
                .client
                .patch(url.clone())
                .bearer_auth(&self.config.token)
                .json(&body)
                .send()
                .await?;
            self.handle_response(response).await
        })
        .await?;

        let updated = response.first_id()?;
        if updated != record_id {
            return Err(ClientError::ParseError(format!(
                "Expected record {} in response, got {}",
                record_id, updated
            )));
        }

        Ok(())
    }
}
