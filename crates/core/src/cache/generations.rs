//! Cache generation management.
//!
//! A generation is a named, wholesale-replaceable collection of entries.
//! Deleting one removes every entry stored in it.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

/// Summary of one generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GenerationStats {
    pub name: String,
    pub created_at: String,
    pub entries: u64,
}

impl CacheDb {
    /// Open a generation, creating it if absent.
    pub async fn open_generation(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO generations (name, created_at) VALUES (?1, ?2)",
                    params![name, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Check if a generation exists.
    pub async fn has_generation(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM generations WHERE name = ?1)",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// Names of all existing generations, sorted.
    pub async fn generation_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM generations ORDER BY name")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Per-generation entry counts.
    pub async fn generation_stats(&self) -> Result<Vec<GenerationStats>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<GenerationStats>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT g.name, g.created_at, COUNT(e.key)
                     FROM generations g LEFT JOIN entries e ON e.generation = g.name
                     GROUP BY g.name, g.created_at
                     ORDER BY g.name",
                )?;
                let stats = stmt
                    .query_map([], |row| {
                        Ok(GenerationStats {
                            name: row.get(0)?,
                            created_at: row.get(1)?,
                            entries: row.get::<_, i64>(2)? as u64,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(stats)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a generation and all its entries.
    ///
    /// Returns false if no generation had that name.
    pub async fn delete_generation(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM entries WHERE generation = ?1", params![name])?;
                let deleted = tx.execute("DELETE FROM generations WHERE name = ?1", params![name])?;
                tx.commit()?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_generation_idempotent() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_generation("static-v1").await.unwrap();
        db.open_generation("static-v1").await.unwrap();

        assert!(db.has_generation("static-v1").await.unwrap());
        assert_eq!(db.generation_names().await.unwrap(), vec!["static-v1"]);
    }

    #[tokio::test]
    async fn test_delete_generation() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_generation("static-v1").await.unwrap();
        db.open_generation("dynamic-v1").await.unwrap();

        assert!(db.delete_generation("static-v1").await.unwrap());
        assert!(!db.delete_generation("static-v1").await.unwrap());
        assert_eq!(db.generation_names().await.unwrap(), vec!["dynamic-v1"]);
    }

    #[tokio::test]
    async fn test_generation_stats_empty() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_generation("static-v1").await.unwrap();

        let stats = db.generation_stats().await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].name, "static-v1");
        assert_eq!(stats[0].entries, 0);
    }
}
