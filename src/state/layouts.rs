use super::types::{Layout, NewLayout};
use super::Store;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};

impl Store {
    pub async fn list_layouts(&self) -> Result<Vec<Layout>> {
        let layouts = self
            .conn
            .call(|conn: &mut rusqlite::Connection| {
                let mut stmt = conn.prepare(
                    "SELECT id, name, layout_data, is_default, created_at FROM layouts ORDER BY created_at, rowid",
                )?;
                let rows = stmt
                    .query_map([], |row| {
                        let data: String = row.get(2)?;
                        let created_at: String = row.get(4)?;
                        Ok(Layout {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            layout_data: serde_json::from_str(&data).map_err(|e| {
                                rusqlite::Error::FromSqlConversionFailure(
                                    2,
                                    rusqlite::types::Type::Text,
                                    Box::new(e),
                                )
                            })?,
                            is_default: row.get(3)?,
                            created_at: created_at
                                .parse::<DateTime<Utc>>()
                                .unwrap_or_else(|_| Utc::now()),
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await?;
        Ok(layouts)
    }

    /// Persist a layout under a fresh UUID. A new default layout clears the previous one.
    pub async fn create_layout(&self, new: NewLayout) -> Result<Layout> {
        if new.name.trim().is_empty() {
            return Err(Error::Validation("layout name must not be empty".to_string()));
        }

        let layout = Layout {
            id: uuid::Uuid::new_v4().to_string(),
            name: new.name,
            layout_data: new.layout_data,
            is_default: new.is_default,
            created_at: Utc::now(),
        };

        let data = serde_json::to_string(&layout.layout_data)?;
        let row = (
            layout.id.clone(),
            layout.name.clone(),
            layout.is_default,
            layout.created_at.to_rfc3339(),
        );

        self.with_transaction(move |tx| {
            let (id, name, is_default, created_at) = row;
            if is_default {
                tx.execute("UPDATE layouts SET is_default = 0 WHERE is_default = 1", [])?;
            }
            tx.execute(
                "INSERT INTO layouts (id, name, layout_data, is_default, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, name, data, is_default, created_at],
            )?;
            Ok(())
        })
        .await?;

        Ok(layout)
    }
}
