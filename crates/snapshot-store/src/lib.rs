//! Append-only SQLite store for ranked snapshots.
//!
//! One row per published entry. Rows are only ever inserted, never updated,
//! so the "previous snapshot" query (latest capture timestamp at or before a
//! point in time) is safe without locking. Timestamps are stored as
//! fixed-width UTC strings so lexicographic SQL comparison matches
//! chronological order.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use pulse_core::{PulseError, PulseResult, SnapshotEntry, SnapshotStore};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::str::FromStr;

#[derive(Clone)]
pub struct SqliteSnapshotStore {
    pool: SqlitePool,
}

impl SqliteSnapshotStore {
    /// Open (creating if missing) and apply the schema.
    pub async fn new(database_url: &str) -> PulseResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(db_err)?
            .create_if_missing(true);

        // Single-writer batch job; one connection also keeps
        // `sqlite::memory:` databases alive across queries.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(db_err)?;

        let store = Self { pool };
        store.init_schema().await?;

        Ok(store)
    }

    async fn init_schema(&self) -> PulseResult<()> {
        let schema = include_str!("../schema.sql");

        for statement in schema.split(';') {
            let stmt = statement.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt).execute(&self.pool).await.map_err(db_err)?;
            }
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn insert_snapshot(&self, entries: &[SnapshotEntry]) -> PulseResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO snapshot_entries
                    (captured_at, rank, ticker, name, mentions, industry,
                     previous_close, fifty_day_average, average_daily_volume_10d,
                     is_new, rank_change)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(fmt_ts(entry.captured_at))
            .bind(entry.rank)
            .bind(&entry.ticker)
            .bind(&entry.name)
            .bind(entry.mentions)
            .bind(&entry.industry)
            .bind(entry.previous_close)
            .bind(entry.fifty_day_average)
            .bind(entry.average_daily_volume_10d)
            .bind(entry.is_new)
            .bind(entry.rank_change)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        tracing::info!("Stored snapshot with {} entries", entries.len());
        Ok(())
    }

    async fn latest_captured_at(
        &self,
        before: DateTime<Utc>,
    ) -> PulseResult<Option<DateTime<Utc>>> {
        let row: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT captured_at FROM snapshot_entries
            WHERE captured_at <= ?
            ORDER BY captured_at DESC
            LIMIT 1
            "#,
        )
        .bind(fmt_ts(before))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(|(ts,)| parse_ts(&ts)).transpose()
    }

    async fn entries_at(&self, captured_at: DateTime<Utc>) -> PulseResult<Vec<SnapshotEntry>> {
        let rows: Vec<SnapshotRow> = sqlx::query_as(
            r#"
            SELECT captured_at, rank, ticker, name, mentions, industry,
                   previous_close, fifty_day_average, average_daily_volume_10d,
                   is_new, rank_change
            FROM snapshot_entries
            WHERE captured_at = ?
            ORDER BY rank ASC
            "#,
        )
        .bind(fmt_ts(captured_at))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(SnapshotRow::into_entry).collect()
    }
}

/// DB row with the string-typed timestamp as stored.
#[derive(Debug, FromRow)]
struct SnapshotRow {
    captured_at: String,
    rank: i64,
    ticker: String,
    name: String,
    mentions: i64,
    industry: String,
    previous_close: f64,
    fifty_day_average: f64,
    average_daily_volume_10d: i64,
    is_new: bool,
    rank_change: i64,
}

impl SnapshotRow {
    fn into_entry(self) -> PulseResult<SnapshotEntry> {
        Ok(SnapshotEntry {
            rank: self.rank,
            ticker: self.ticker,
            name: self.name,
            mentions: self.mentions,
            industry: self.industry,
            previous_close: self.previous_close,
            fifty_day_average: self.fifty_day_average,
            average_daily_volume_10d: self.average_daily_volume_10d,
            captured_at: parse_ts(&self.captured_at)?,
            is_new: self.is_new,
            rank_change: self.rank_change,
        })
    }
}

/// Fixed-width UTC form, e.g. `2021-02-03T04:05:06.123456Z`.
fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(s: &str) -> PulseResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| PulseError::Database(format!("bad stored timestamp {:?}: {}", s, e)))
}

fn db_err(e: impl std::fmt::Display) -> PulseError {
    PulseError::Database(e.to_string())
}
