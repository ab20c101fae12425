//! Key-value storage with browser `localStorage` semantics: whole string
//! values under string keys, a per-store quota, and a `StorageFull` error
//! when a write would not fit.

use crate::db::migrate::run_migrations;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use chrono::Local;
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use std::collections::HashMap;

/// Default quota, the usual per-origin budget of a browser.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

pub trait LocalStorage {
    fn get_item(&self, key: &str) -> AppResult<Option<String>>;

    /// Replace the value stored under `key`. The write is all-or-nothing.
    fn set_item(&mut self, key: &str, value: &str) -> AppResult<()>;

    fn remove_item(&mut self, key: &str) -> AppResult<()>;
}

fn quota_exceeded(key: &str, needed: usize, quota: usize) -> AppError {
    AppError::StorageFull(format!(
        "writing '{}' needs {} bytes, quota is {} bytes",
        key, needed, quota
    ))
}

/// SQLite-backed storage: one row per key in `local_storage`.
pub struct SqliteStorage {
    pool: DbPool,
    quota_bytes: usize,
}

impl SqliteStorage {
    pub fn open(path: &str, quota_bytes: usize) -> AppResult<Self> {
        Self::from_pool(DbPool::new(path)?, quota_bytes)
    }

    pub fn from_pool(pool: DbPool, quota_bytes: usize) -> AppResult<Self> {
        run_migrations(&pool.conn, true)?;
        Ok(Self { pool, quota_bytes })
    }

    pub fn conn(&self) -> &Connection {
        &self.pool.conn
    }

    pub fn quota_bytes(&self) -> usize {
        self.quota_bytes
    }

    /// Bytes used by every key except `except`.
    fn used_bytes_except(&self, except: &str) -> AppResult<usize> {
        let used: i64 = self.pool.conn.query_row(
            "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
             FROM local_storage WHERE key <> ?1",
            [except],
            |row| row.get(0),
        )?;
        Ok(used.max(0) as usize)
    }

    pub fn used_bytes(&self) -> AppResult<usize> {
        self.used_bytes_except("")
    }
}

impl LocalStorage for SqliteStorage {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        let value = self
            .pool
            .conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&mut self, key: &str, value: &str) -> AppResult<()> {
        let needed = self.used_bytes_except(key)? + key.len() + value.len();
        if needed > self.quota_bytes {
            return Err(quota_exceeded(key, needed, self.quota_bytes));
        }

        let now = Local::now().to_rfc3339();
        let res = self.pool.conn.execute(
            "INSERT INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        );

        match res {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, msg)) if e.code == ErrorCode::DiskFull => {
                Err(AppError::StorageFull(
                    msg.unwrap_or_else(|| "database or disk is full".to_string()),
                ))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn remove_item(&mut self, key: &str) -> AppResult<()> {
        self.pool
            .conn
            .execute("DELETE FROM local_storage WHERE key = ?1", [key])?;
        Ok(())
    }
}

/// Volatile storage, handy for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            items: HashMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> AppResult<()> {
        if let Some(quota) = self.quota_bytes {
            let others: usize = self
                .items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(quota_exceeded(key, needed, quota));
            }
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> AppResult<()> {
        self.items.remove(key);
        Ok(())
    }
}
