use super::types::{CoarseStatus, LifecycleRecord};
use super::Store;
use crate::error::Result;
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;

fn parse_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
    value.and_then(|s| s.parse::<DateTime<Utc>>().ok())
}

impl Store {
    pub async fn get_record(&self, service_id: &str) -> Result<Option<LifecycleRecord>> {
        let service_id = service_id.to_string();
        let record = self
            .conn
            .call(move |conn: &mut rusqlite::Connection| {
                Ok(conn
                    .query_row(
                        "SELECT service_id, container_id, status, started_at, stopped_at FROM containers WHERE service_id = ?1",
                        rusqlite::params![service_id],
                        |row| {
                            let status: String = row.get(2)?;
                            Ok(LifecycleRecord {
                                service_id: row.get(0)?,
                                container_id: row.get(1)?,
                                status: status.parse().unwrap_or(CoarseStatus::Unknown),
                                started_at: parse_timestamp(row.get(3)?),
                                stopped_at: parse_timestamp(row.get(4)?),
                            })
                        },
                    )
                    .optional()?)
            })
            .await?;
        Ok(record)
    }

    /// Record a confirmed start. Returns false if the service no longer exists.
    #[tracing::instrument(skip(self))]
    pub async fn record_started(
        &self,
        service_id: &str,
        container_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let service_id = service_id.to_string();
        let container_id = container_id.to_string();
        let changed = self
            .with_transaction(move |tx| {
                tx.execute(
                    "INSERT INTO containers (service_id, container_id, status, started_at)
                     SELECT ?1, ?2, 'running', ?3 WHERE EXISTS (SELECT 1 FROM services WHERE id = ?1)
                     ON CONFLICT(service_id) DO UPDATE SET
                        container_id = excluded.container_id,
                        status = 'running',
                        started_at = excluded.started_at",
                    rusqlite::params![service_id, container_id, at.to_rfc3339()],
                )
            })
            .await?;
        Ok(changed > 0)
    }

    /// Record a confirmed stop. The last container id is kept.
    #[tracing::instrument(skip(self))]
    pub async fn record_stopped(&self, service_id: &str, at: DateTime<Utc>) -> Result<bool> {
        let service_id = service_id.to_string();
        let changed = self
            .with_transaction(move |tx| {
                tx.execute(
                    "INSERT INTO containers (service_id, container_id, status, stopped_at)
                     SELECT ?1, NULL, 'stopped', ?2 WHERE EXISTS (SELECT 1 FROM services WHERE id = ?1)
                     ON CONFLICT(service_id) DO UPDATE SET
                        status = 'stopped',
                        stopped_at = excluded.stopped_at",
                    rusqlite::params![service_id, at.to_rfc3339()],
                )
            })
            .await?;
        Ok(changed > 0)
    }
}
