//! Database access layer with connection pooling and migrations
//!
//! SQLite implementation of the `AnalysisStore` contract, organized by
//! domain:
//! - `transactions` - transaction storage and scoped fetch
//! - `insights` - scoped delete, bulk insert, listing
//!
//! Insight replacement for a scope is delete-then-insert; the insert batch
//! runs inside one transaction so a failed insert never reports success.

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::Result;
use crate::models::{Insight, Transaction};
use crate::store::AnalysisStore;

mod insights;
mod transactions;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Parse a SQLite datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // SQLite stores as "YYYY-MM-DD HH:MM:SS" format
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Create a new database connection pool and run migrations
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self { pool };
        db.run_migrations()?;
        Ok(db)
    }

    /// Create a throwaway database for tests
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!("finsights_test_{}_{}.db", std::process::id(), id));

        let _ = std::fs::remove_file(&path);
        Self::new(&path.to_string_lossy())
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS transactions (
                id TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL,
                file_id TEXT,
                date TEXT,
                description TEXT NOT NULL DEFAULT '',
                merchant TEXT,
                amount TEXT NOT NULL,
                direction TEXT NOT NULL DEFAULT 'debit',
                category TEXT,
                currency TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            CREATE INDEX IF NOT EXISTS idx_transactions_scope
                ON transactions(user_id, file_id);

            CREATE TABLE IF NOT EXISTS insights (
                id TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL,
                file_id TEXT,
                insight_type TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                icon TEXT NOT NULL,
                severity TEXT,
                metadata TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_insights_scope
                ON insights(user_id, file_id);
            "#,
        )?;

        info!("Database migrations complete");
        Ok(())
    }
}

impl AnalysisStore for Database {
    fn fetch_transactions(
        &self,
        user_id: i64,
        file_id: Option<&str>,
        limit: usize,
        newest_first: bool,
    ) -> Result<Vec<Transaction>> {
        Database::fetch_transactions(self, user_id, file_id, limit, newest_first)
    }

    fn delete_insights(&self, user_id: i64, file_id: Option<&str>) -> Result<usize> {
        Database::delete_insights(self, user_id, file_id)
    }

    fn insert_insights(&self, insights: &[Insight]) -> Result<()> {
        Database::insert_insights(self, insights)
    }
}
