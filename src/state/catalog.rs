use super::Store;
use crate::catalog::ServiceDefinition;
use crate::error::{Error, Result};
use chrono::Utc;
use rusqlite::OptionalExtension;
use tracing::debug;

const SERVICE_COLUMNS: &str =
    "id, name, category, image, tag, description, ports, env_vars, volumes, health_check, enabled, icon";

/// A definition flattened into column values, JSON fields already encoded.
pub(super) struct ServiceRow {
    id: String,
    name: String,
    category: String,
    image: String,
    tag: String,
    description: Option<String>,
    ports: String,
    env_vars: String,
    volumes: String,
    health_check: Option<String>,
    enabled: bool,
    icon: String,
}

impl ServiceRow {
    pub(super) fn from_definition(def: &ServiceDefinition) -> Result<Self> {
        Ok(Self {
            id: def.id.clone(),
            name: def.name.clone(),
            category: def.category.clone(),
            image: def.image.clone(),
            tag: def.tag.clone(),
            description: def.description.clone(),
            ports: serde_json::to_string(&def.ports)?,
            env_vars: serde_json::to_string(&def.env)?,
            volumes: serde_json::to_string(&def.volumes)?,
            health_check: def.health_check.clone(),
            enabled: def.enabled,
            icon: def.icon.clone(),
        })
    }

    fn insert_sql(or_ignore: bool) -> String {
        format!(
            "INSERT {}INTO services ({}, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            if or_ignore { "OR IGNORE " } else { "" },
            SERVICE_COLUMNS
        )
    }

    fn execute(&self, conn: &rusqlite::Connection, or_ignore: bool) -> rusqlite::Result<usize> {
        conn.execute(
            &Self::insert_sql(or_ignore),
            rusqlite::params![
                self.id,
                self.name,
                self.category,
                self.image,
                self.tag,
                self.description,
                self.ports,
                self.env_vars,
                self.volumes,
                self.health_check,
                self.enabled,
                self.icon,
                Utc::now().to_rfc3339(),
            ],
        )
    }

    pub(super) fn insert_or_ignore(&self, conn: &rusqlite::Connection) -> rusqlite::Result<usize> {
        self.execute(conn, true)
    }
}

fn json_column<T: serde::de::DeserializeOwned>(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn definition_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ServiceDefinition> {
    Ok(ServiceDefinition {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        image: row.get(3)?,
        tag: row.get(4)?,
        description: row.get(5)?,
        ports: json_column(row, 6)?,
        env: json_column(row, 7)?,
        volumes: json_column(row, 8)?,
        health_check: row.get(9)?,
        enabled: row.get(10)?,
        icon: row.get(11)?,
    })
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl Store {
    /// Every catalog entry, in insertion order.
    pub async fn list_services(&self) -> Result<Vec<ServiceDefinition>> {
        let sql = format!("SELECT {} FROM services ORDER BY rowid", SERVICE_COLUMNS);
        let services = self
            .conn
            .call(move |conn: &mut rusqlite::Connection| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map([], definition_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await?;
        Ok(services)
    }

    pub async fn get_service(&self, service_id: &str) -> Result<Option<ServiceDefinition>> {
        let service_id = service_id.to_string();
        let sql = format!("SELECT {} FROM services WHERE id = ?1", SERVICE_COLUMNS);
        let service = self
            .conn
            .call(move |conn: &mut rusqlite::Connection| {
                Ok(conn
                    .query_row(&sql, rusqlite::params![service_id], definition_from_row)
                    .optional()?)
            })
            .await?;
        Ok(service)
    }

    /// Insert a new entry. An existing id is a `Conflict`.
    pub async fn insert_service(&self, def: &ServiceDefinition) -> Result<()> {
        let row = ServiceRow::from_definition(def)?;
        let inserted = self
            .conn
            .call(move |conn: &mut rusqlite::Connection| match row.execute(conn, false) {
                Ok(_) => Ok(true),
                Err(e) if is_constraint_violation(&e) => Ok(false),
                Err(e) => Err(e.into()),
            })
            .await?;

        if !inserted {
            return Err(Error::Conflict(format!(
                "service '{}' already exists",
                def.id
            )));
        }
        debug!("Inserted service {}", def.id);
        Ok(())
    }

    /// Flip the enabled flag. Returns false when no such service exists.
    pub async fn set_service_enabled(&self, service_id: &str, enabled: bool) -> Result<bool> {
        let service_id = service_id.to_string();
        let changed = self
            .with_transaction(move |tx| {
                tx.execute(
                    "UPDATE services SET enabled = ?1 WHERE id = ?2",
                    rusqlite::params![enabled, service_id],
                )
            })
            .await?;
        Ok(changed > 0)
    }

    /// Remove an entry and, through the foreign key, its lifecycle record.
    pub async fn delete_service(&self, service_id: &str) -> Result<bool> {
        let service_id = service_id.to_string();
        let deleted = self
            .with_transaction(move |tx| {
                tx.execute(
                    "DELETE FROM services WHERE id = ?1",
                    rusqlite::params![service_id],
                )
            })
            .await?;
        Ok(deleted > 0)
    }

    pub async fn count_services(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .call(|conn: &mut rusqlite::Connection| {
                Ok(conn.query_row("SELECT COUNT(*) FROM services", [], |row| row.get(0))?)
            })
            .await?;
        Ok(count.max(0) as usize)
    }
}
