//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ListingStore trait.

use crate::calendar::{Calendar, CalendarDay, PricingDoc};
use crate::listing::Listing;
use crate::state::ListingState;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ListingStore, StorageError, StorageResult};
use crate::storage::{RunKind, RunRecord, RunStatus};
use crate::HarvestError;
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

const RUN_COLUMNS: &str =
    "id, kind, started_at, finished_at, config_hash, status, items, error_message";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(HarvestError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    // ===== Run Management =====

    /// Creates a new run in the `running` state and returns its id
    pub fn create_run(&mut self, kind: RunKind, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (kind, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![
                kind.to_db_string(),
                now,
                config_hash,
                RunStatus::Running.to_db_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Marks a run as completed with a finish timestamp and item count
    pub fn complete_run(&mut self, run_id: i64, items: u64) -> StorageResult<()> {
        self.finish_run(run_id, RunStatus::Completed, items, None)
    }

    /// Marks a run as failed, recording the error that aborted it
    pub fn fail_run(&mut self, run_id: i64, error_message: &str) -> StorageResult<()> {
        self.finish_run(run_id, RunStatus::Failed, 0, Some(error_message))
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        items: u64,
        error_message: Option<&str>,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, items = ?3, error_message = ?4
             WHERE id = ?5",
            params![status.to_db_string(), now, items as i64, error_message, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::Database(format!("Run not found: {}", run_id)));
        }
        Ok(())
    }

    /// Gets the most recent run
    pub fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                read_run,
            )
            .optional()?;
        Ok(run)
    }

    // ===== Reads =====

    /// Loads a stored listing with its reviews
    pub fn get_listing(&self, listing_id: &str) -> StorageResult<Option<Listing>> {
        let record: Option<String> = self
            .conn
            .query_row(
                "SELECT record FROM listings WHERE id = ?1",
                params![listing_id],
                |row| row.get(0),
            )
            .optional()?;

        match record {
            Some(record) => Ok(Some(serde_json::from_str(&record)?)),
            None => Ok(None),
        }
    }

    /// Gets the lifecycle state of a stored listing
    pub fn get_listing_state(&self, listing_id: &str) -> StorageResult<Option<ListingState>> {
        let state: Option<String> = self
            .conn
            .query_row(
                "SELECT state FROM listings WHERE id = ?1",
                params![listing_id],
                |row| row.get(0),
            )
            .optional()?;

        state
            .map(|s| {
                ListingState::from_db_string(&s)
                    .ok_or_else(|| StorageError::Serialization(format!("Unknown listing state: {}", s)))
            })
            .transpose()
    }

    /// Loads the stored calendar of a listing
    pub fn get_calendar(&self, listing_id: &str) -> StorageResult<Calendar> {
        let mut stmt = self.conn.prepare(
            "SELECT date, available, price, currency, min_nights, max_nights
             FROM calendar_days WHERE listing_id = ?1",
        )?;

        let rows = stmt.query_map(params![listing_id], |row| {
            let date: String = row.get(0)?;
            let day = CalendarDay {
                available: row.get(1)?,
                price: row.get(2)?,
                currency: row.get(3)?,
                min_nights: row.get(4)?,
                max_nights: row.get(5)?,
            };
            Ok((date, day))
        })?;

        let mut calendar = Calendar::new();
        for row in rows {
            let (date, day) = row?;
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|e| StorageError::Serialization(format!("{}: {}", date, e)))?;
            calendar.insert(date, day);
        }

        Ok(calendar)
    }

    /// Loads the stored pricing document of a listing
    pub fn get_pricing(&self, listing_id: &str) -> StorageResult<Option<PricingDoc>> {
        let document: Option<String> = self
            .conn
            .query_row(
                "SELECT document FROM pricing WHERE listing_id = ?1",
                params![listing_id],
                |row| row.get(0),
            )
            .optional()?;

        match document {
            Some(document) => Ok(Some(serde_json::from_str(&document)?)),
            None => Ok(None),
        }
    }

    /// Gets the stored min/max nights of a listing, if pricing was ever stored
    pub fn get_stay_limits(&self, listing_id: &str) -> StorageResult<Option<(u32, u32)>> {
        let limits: Option<(Option<u32>, Option<u32>)> = self
            .conn
            .query_row(
                "SELECT min_nights, max_nights FROM listings WHERE id = ?1",
                params![listing_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        Ok(match limits {
            Some((Some(min), Some(max))) => Some((min, max)),
            _ => None,
        })
    }

    // ===== Statistics =====

    /// Counts listings per lifecycle state
    pub fn count_listings_by_state(&self) -> StorageResult<HashMap<ListingState, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT state, COUNT(*) FROM listings GROUP BY state")?;

        let rows = stmt.query_map([], |row| {
            let state_str: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((state_str, count))
        })?;

        let mut counts = HashMap::new();
        for row in rows {
            let (state_str, count) = row?;
            if let Some(state) = ListingState::from_db_string(&state_str) {
                counts.insert(state, count as u64);
            }
        }

        Ok(counts)
    }

    pub fn count_calendar_days(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM calendar_days")
    }

    pub fn count_booked_days(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM calendar_days WHERE available = 0")
    }

    pub fn count_priced_listings(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM pricing")
    }

    pub fn count_reviews(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM reviews")
    }

    /// Number of distinct search queries that produced listings
    pub fn count_queries(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(DISTINCT query) FROM listings")
    }

    fn count(&self, sql: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn listing_exists(&self, listing_id: &str) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM listings WHERE id = ?1",
                params![listing_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

fn read_run(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        kind: RunKind::from_db_string(&row.get::<_, String>(1)?).unwrap_or(RunKind::Search),
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(RunStatus::Running),
        items: row.get::<_, i64>(6)? as u64,
        error_message: row.get(7)?,
    })
}

impl ListingStore for SqliteStorage {
    fn save(&mut self, query: &str, listings: &[Listing]) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        for listing in listings {
            let record = serde_json::to_string(listing)?;
            tx.execute(
                "INSERT INTO listings (id, query, url, name, state, record, scraped_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(id) DO UPDATE SET
                    query = excluded.query,
                    url = excluded.url,
                    name = excluded.name,
                    state = excluded.state,
                    record = excluded.record,
                    scraped_at = excluded.scraped_at,
                    updated_at = excluded.updated_at,
                    deleted_at = NULL",
                params![
                    listing.id,
                    query,
                    listing.url,
                    listing.name,
                    ListingState::Active.to_db_string(),
                    record,
                    listing.scraped_at.to_rfc3339(),
                    now
                ],
            )?;

            tx.execute(
                "DELETE FROM reviews WHERE listing_id = ?1",
                params![listing.id],
            )?;
            for (index, review) in listing.reviews.iter().enumerate() {
                // Reviews without a marketplace id are keyed by position
                let review_id = if review.id.is_empty() {
                    format!("{}-{}", listing.id, index)
                } else {
                    review.id.clone()
                };
                tx.execute(
                    "INSERT OR REPLACE INTO reviews
                     (id, listing_id, author, comments, rating, language, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        review_id,
                        listing.id,
                        review.author,
                        review.comments,
                        review.rating,
                        review.language,
                        review.created_at
                    ],
                )?;
            }
        }

        tx.commit()?;
        tracing::debug!("Saved {} listings for query {:?}", listings.len(), query);
        Ok(())
    }

    fn update_calendar(&mut self, listing_id: &str, calendar: &Calendar) -> StorageResult<()> {
        if !self.listing_exists(listing_id)? {
            return Err(StorageError::ListingNotFound(listing_id.to_string()));
        }

        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM calendar_days WHERE listing_id = ?1",
            params![listing_id],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO calendar_days
                 (listing_id, date, available, price, currency, min_nights, max_nights)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for (date, day) in calendar {
                stmt.execute(params![
                    listing_id,
                    date.to_string(),
                    day.available,
                    day.price,
                    day.currency,
                    day.min_nights,
                    day.max_nights
                ])?;
            }
        }

        tx.execute(
            "UPDATE listings SET updated_at = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), listing_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn update_pricing(
        &mut self,
        listing_id: &str,
        pricing: &PricingDoc,
        min_nights: u32,
        max_nights: u32,
    ) -> StorageResult<()> {
        if !self.listing_exists(listing_id)? {
            return Err(StorageError::ListingNotFound(listing_id.to_string()));
        }

        let document = serde_json::to_string(pricing)?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO pricing
             (listing_id, currency, nightly_min, nightly_max, nightly_avg, document, fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                listing_id,
                pricing.currency,
                pricing.nightly_min,
                pricing.nightly_max,
                pricing.nightly_avg,
                document,
                pricing.fetched_at.to_rfc3339()
            ],
        )?;
        tx.execute(
            "UPDATE listings SET min_nights = ?1, max_nights = ?2, updated_at = ?3 WHERE id = ?4",
            params![min_nights, max_nights, Utc::now().to_rfc3339(), listing_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn mark_deleted(&mut self, listing_id: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE listings SET state = ?1, deleted_at = ?2, updated_at = ?2 WHERE id = ?3",
            params![ListingState::Deleted.to_db_string(), now, listing_id],
        )?;

        if updated == 0 {
            return Err(StorageError::ListingNotFound(listing_id.to_string()));
        }
        Ok(())
    }

    fn get_all_index_ids(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM listings WHERE state = ?1 ORDER BY id")?;

        let ids = stmt
            .query_map(params![ListingState::Active.to_db_string()], |row| {
                row.get(0)
            })?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(ids)
    }
}
