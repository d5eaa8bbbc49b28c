//! Lead storage
//!
//! Leads are append-only: inserted once, never updated or deleted.
//! `SqliteLeadStore` is the durable backend; `InMemoryLeadStore` keeps
//! leads for the life of the process only.

use async_trait::async_trait;
use parking_lot::RwLock;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, Row};
use std::path::Path;

use realty_agent_core::{Lead, NewLead};

use crate::PersistenceError;

/// Connection pool type
pub type DbPool = Pool<SqliteConnectionManager>;

/// Lead store trait
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Persist a lead and return the stored record
    async fn insert(&self, lead: NewLead) -> Result<Lead, PersistenceError>;

    /// All leads in insertion order
    async fn list(&self) -> Result<Vec<Lead>, PersistenceError>;

    async fn count(&self) -> Result<u64, PersistenceError>;
}

/// SQLite-backed lead store with r2d2 connection pooling
#[derive(Clone)]
pub struct SqliteLeadStore {
    pool: DbPool,
}

impl SqliteLeadStore {
    /// Open (or create) the database file and ensure the schema
    pub fn open(path: impl AsRef<Path>, pool_size: u32) -> Result<Self, PersistenceError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(pool_size.max(1)).build(manager)?;

        let store = Self { pool };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory database for tests
    ///
    /// Each SQLite memory connection is its own database, so the pool
    /// holds exactly one connection.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager)?;

        let store = Self { pool };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), PersistenceError> {
        let conn = self.pool.get()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS leads (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT,
                phone TEXT,
                email TEXT,
                created_at TEXT DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;
        Ok(())
    }

    /// Run a closure on a pooled connection off the async runtime
    async fn with_conn<T, F>(&self, f: F) -> Result<T, PersistenceError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, PersistenceError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            f(&conn)
        })
        .await
        .map_err(|e| PersistenceError::Task(e.to_string()))?
    }
}

fn row_to_lead(row: &Row<'_>) -> rusqlite::Result<Lead> {
    Ok(Lead {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[async_trait]
impl LeadStore for SqliteLeadStore {
    async fn insert(&self, lead: NewLead) -> Result<Lead, PersistenceError> {
        self.with_conn(move |conn| {
            let stored = conn.query_row(
                "INSERT INTO leads (name, phone, email) VALUES (?1, ?2, ?3)
                 RETURNING id, name, phone, email, created_at",
                params![lead.name, lead.phone, lead.email],
                row_to_lead,
            )?;
            Ok(stored)
        })
        .await
    }

    async fn list(&self) -> Result<Vec<Lead>, PersistenceError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, phone, email, created_at FROM leads ORDER BY id")?;
            let leads = stmt
                .query_map([], row_to_lead)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(leads)
        })
        .await
    }

    async fn count(&self) -> Result<u64, PersistenceError> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM leads", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }
}

/// In-process lead list
#[derive(Default)]
pub struct InMemoryLeadStore {
    leads: RwLock<Vec<Lead>>,
}

impl InMemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn insert(&self, lead: NewLead) -> Result<Lead, PersistenceError> {
        let mut leads = self.leads.write();
        let id = leads.len() as i64 + 1;
        let stored = Lead::from_new(id, lead, None);
        leads.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<Lead>, PersistenceError> {
        Ok(self.leads.read().clone())
    }

    async fn count(&self) -> Result<u64, PersistenceError> {
        Ok(self.leads.read().len() as u64)
    }
}
