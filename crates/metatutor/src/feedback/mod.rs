//! Append-only feedback persistence and aggregate metrics
//!
//! Every query logs an initial row (feedback NULL); explicit user feedback
//! appends another row with 0/1. Rows are never updated or deleted; the
//! timestamp is assigned at write time.

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};

/// One appended feedback row
#[derive(Debug, Clone)]
pub struct FeedbackRecord {
    pub query: String,
    /// None for the initial-query log entry; 0/1 for explicit user feedback
    pub feedback: Option<i64>,
    pub domain: Option<String>,
    pub intent: Option<String>,
    pub engine: Option<String>,
}

/// Aggregate feedback counts
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackMetrics {
    pub count: i64,
    pub helpful: i64,
    pub not_helpful: i64,
    pub by_engine: HashMap<String, FeedbackCounts>,
    pub by_domain: HashMap<String, FeedbackCounts>,
}

/// Helpful/not-helpful counts within a group
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedbackCounts {
    pub helpful: i64,
    pub not_helpful: i64,
}

/// SQLite-backed append-only feedback store
pub struct FeedbackStore {
    conn: Arc<Mutex<Connection>>,
}

impl FeedbackStore {
    /// Create or open the store at the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .map_err(|e| Error::store(format!("Failed to open database: {}", e)))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::store(format!("Failed to open in-memory database: {}", e)))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
        "#,
        )
        .map_err(|e| Error::store(format!("Failed to set pragmas: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS feedback (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                query TEXT NOT NULL,
                feedback INTEGER,
                domain TEXT,
                intent TEXT,
                engine TEXT,
                timestamp TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_feedback_engine ON feedback(engine);
            CREATE INDEX IF NOT EXISTS idx_feedback_domain ON feedback(domain);
        "#,
        )
        .map_err(|e| Error::store(format!("Failed to run migrations: {}", e)))?;

        Ok(())
    }

    /// Append a record. The timestamp is assigned here, at write time,
    /// in ISO-8601 UTC.
    pub fn append(&self, record: FeedbackRecord) -> Result<DateTime<Utc>> {
        let now = Utc::now();
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO feedback (query, feedback, domain, intent, engine, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.query,
                record.feedback,
                record.domain,
                record.intent,
                record.engine,
                now.to_rfc3339_opts(SecondsFormat::Secs, true),
            ],
        )?;
        Ok(now)
    }

    /// Total number of appended rows
    pub fn count(&self) -> Result<i64> {
        let conn = self.conn.lock();
        let count = conn.query_row("SELECT COUNT(*) FROM feedback", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Aggregate helpful/not-helpful counts, grouped by engine and domain.
    /// Initial-query rows (feedback NULL) contribute to `count` only.
    pub fn metrics(&self) -> Result<FeedbackMetrics> {
        let conn = self.conn.lock();

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM feedback", [], |row| row.get(0))?;
        let helpful: i64 = conn.query_row(
            "SELECT COUNT(*) FROM feedback WHERE feedback = 1",
            [],
            |row| row.get(0),
        )?;
        let not_helpful: i64 = conn.query_row(
            "SELECT COUNT(*) FROM feedback WHERE feedback = 0",
            [],
            |row| row.get(0),
        )?;

        let group = |column: &str| -> Result<HashMap<String, FeedbackCounts>> {
            let sql = format!(
                "SELECT {col},
                        SUM(CASE WHEN feedback = 1 THEN 1 ELSE 0 END),
                        SUM(CASE WHEN feedback = 0 THEN 1 ELSE 0 END)
                 FROM feedback
                 WHERE feedback IS NOT NULL AND {col} IS NOT NULL
                 GROUP BY {col}",
                col = column
            );
            let mut statement = conn.prepare(&sql)?;
            let rows = statement.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    FeedbackCounts {
                        helpful: row.get(1)?,
                        not_helpful: row.get(2)?,
                    },
                ))
            })?;
            let mut grouped = HashMap::new();
            for row in rows {
                let (key, counts) = row?;
                grouped.insert(key, counts);
            }
            Ok(grouped)
        };

        Ok(FeedbackMetrics {
            count,
            helpful,
            not_helpful,
            by_engine: group("engine")?,
            by_domain: group("domain")?,
        })
    }

    /// Export every row as a flat CSV dataset for the offline trainers
    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = self.conn.lock();
        let mut statement = conn.prepare(
            "SELECT query, feedback, domain, intent, engine, timestamp FROM feedback ORDER BY id",
        )?;
        let rows = statement.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<i64>>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut out = String::from("query,feedback,domain,intent,engine,timestamp\n");
        let mut exported = 0usize;
        for row in rows {
            let (query, feedback, domain, intent, engine, timestamp) = row?;
            out.push_str(&format!(
                "{},{},{},{},{},{}\n",
                csv_escape(&query),
                feedback.map(|f| f.to_string()).unwrap_or_default(),
                csv_escape(&domain.unwrap_or_default()),
                csv_escape(&intent.unwrap_or_default()),
                csv_escape(&engine.unwrap_or_default()),
                timestamp,
            ));
            exported += 1;
        }

        std::fs::write(path, out)?;
        Ok(exported)
    }
}

/// Quote a CSV field when it contains separators or quotes
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
