//! Cached response CRUD operations.
//!
//! Entries are keyed by `(generation, key)`; writing an existing key
//! replaces the stored response.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A response stored in a cache generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CachedResponse {
    pub generation: String,
    pub key: String,
    pub method: String,
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub stored_at: String,
}

const SELECT_COLUMNS: &str =
    "generation, key, method, url, status, status_text, headers_json, body, stored_at";

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(CachedResponse, String)> {
    let headers_json: String = row.get(6)?;
    Ok((
        CachedResponse {
            generation: row.get(0)?,
            key: row.get(1)?,
            method: row.get(2)?,
            url: row.get(3)?,
            status: row.get(4)?,
            status_text: row.get(5)?,
            headers: Vec::new(),
            body: row.get(7)?,
            stored_at: row.get(8)?,
        },
        headers_json,
    ))
}

fn decode(row: (CachedResponse, String)) -> Result<CachedResponse, Error> {
    let (mut entry, headers_json) = row;
    entry.headers = serde_json::from_str(&headers_json)?;
    Ok(entry)
}

impl CacheDb {
    /// Insert or replace a cached response.
    ///
    /// Creates the target generation if it does not exist yet. Only GET
    /// responses are accepted.
    pub async fn put_entry(&self, entry: &CachedResponse) -> Result<(), Error> {
        if !entry.method.eq_ignore_ascii_case("GET") {
            return Err(Error::InvalidInput(format!("refusing to cache {} {}", entry.method, entry.url)));
        }

        let entry = entry.clone();
        let headers_json = serde_json::to_string(&entry.headers)?;
        let created_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO generations (name, created_at) VALUES (?1, ?2)",
                    params![&entry.generation, created_at],
                )?;
                tx.execute(
                    "INSERT INTO entries (
                        generation, key, method, url, status, status_text, headers_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    ON CONFLICT(generation, key) DO UPDATE SET
                        method = excluded.method,
                        url = excluded.url,
                        status = excluded.status,
                        status_text = excluded.status_text,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        &entry.generation,
                        &entry.key,
                        &entry.method,
                        &entry.url,
                        entry.status,
                        &entry.status_text,
                        headers_json,
                        &entry.body,
                        &entry.stored_at,
                    ],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up an entry in one generation.
    ///
    /// Returns None on a miss.
    pub async fn match_entry(&self, generation: &str, key: &str) -> Result<Option<CachedResponse>, Error> {
        let generation = generation.to_string();
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CachedResponse>, Error> {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {SELECT_COLUMNS} FROM entries WHERE generation = ?1 AND key = ?2"
                ))?;

                match stmt.query_row(params![generation, key], read_row) {
                    Ok(row) => decode(row).map(Some),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Look up an entry in any generation, newest write first.
    pub async fn match_any(&self, key: &str) -> Result<Option<CachedResponse>, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CachedResponse>, Error> {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {SELECT_COLUMNS} FROM entries WHERE key = ?1 ORDER BY stored_at DESC LIMIT 1"
                ))?;

                match stmt.query_row(params![key], read_row) {
                    Ok(row) => decode(row).map(Some),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Keys stored in a generation, sorted.
    pub async fn entry_keys(&self, generation: &str) -> Result<Vec<String>, Error> {
        let generation = generation.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT key FROM entries WHERE generation = ?1 ORDER BY key")?;
                let keys = stmt
                    .query_map(params![generation], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete one entry.
    ///
    /// Returns false if nothing was stored under the key.
    pub async fn delete_entry(&self, generation: &str, key: &str) -> Result<bool, Error> {
        let generation = generation.to_string();
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM entries WHERE generation = ?1 AND key = ?2",
                    params![generation, key],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::hash::request_key;

    fn make_test_entry(generation: &str, url: &str, body: &[u8]) -> CachedResponse {
        CachedResponse {
            generation: generation.to_string(),
            key: request_key("GET", url),
            method: "GET".to_string(),
            url: url.to_string(),
            status: 200,
            status_text: "OK".to_string(),
            headers: vec![("content-type".to_string(), "image/jpeg".to_string())],
            body: body.to_vec(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let entry = make_test_entry("static-v1", "https://example.com/logo.jpeg", b"jpeg");

        db.put_entry(&entry).await.unwrap();

        let found = db.match_entry("static-v1", &entry.key).await.unwrap().unwrap();
        assert_eq!(found, entry);
        assert!(db.has_generation("static-v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_match_missing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let result = db.match_entry("static-v1", "GET https://example.com/").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_same_key() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let url = "https://example.com/api/items";
        db.put_entry(&make_test_entry("dynamic-v1", url, b"old")).await.unwrap();
        db.put_entry(&make_test_entry("dynamic-v1", url, b"new")).await.unwrap();

        let found = db
            .match_entry("dynamic-v1", &request_key("GET", url))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.body, b"new");
        assert_eq!(db.entry_keys("dynamic-v1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_generations_are_isolated() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let url = "https://example.com/index.html";
        db.put_entry(&make_test_entry("static-v1", url, b"static")).await.unwrap();

        let key = request_key("GET", url);
        assert!(db.match_entry("dynamic-v1", &key).await.unwrap().is_none());
        assert_eq!(db.match_any(&key).await.unwrap().unwrap().body, b"static");
    }

    #[tokio::test]
    async fn test_put_rejects_non_get() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let mut entry = make_test_entry("dynamic-v1", "https://example.com/api/items", b"{}");
        entry.method = "POST".to_string();

        let result = db.put_entry(&entry).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(db.generation_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_generation_removes_entries() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let entry = make_test_entry("static-v1", "https://example.com/app.js", b"js");
        db.put_entry(&entry).await.unwrap();

        db.delete_generation("static-v1").await.unwrap();

        assert!(db.match_any(&entry.key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_entry() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let entry = make_test_entry("static-v1", "https://example.com/app.css", b"css");
        db.put_entry(&entry).await.unwrap();

        assert!(db.delete_entry("static-v1", &entry.key).await.unwrap());
        assert!(!db.delete_entry("static-v1", &entry.key).await.unwrap());

        let stats = db.generation_stats().await.unwrap();
        assert_eq!(stats[0].entries, 0);
    }
}
