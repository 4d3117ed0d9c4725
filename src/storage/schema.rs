//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Rental-Harvest database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track harvest runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    kind TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    items INTEGER NOT NULL DEFAULT 0,
    error_message TEXT
);

-- Harvested listings
CREATE TABLE IF NOT EXISTS listings (
    id TEXT PRIMARY KEY,
    query TEXT NOT NULL,
    url TEXT NOT NULL,
    name TEXT,
    state TEXT NOT NULL,
    record TEXT NOT NULL,
    scraped_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT,
    min_nights INTEGER,
    max_nights INTEGER
);

CREATE INDEX IF NOT EXISTS idx_listings_state ON listings(state);

-- Guest reviews
CREATE TABLE IF NOT EXISTS reviews (
    id TEXT NOT NULL,
    listing_id TEXT NOT NULL REFERENCES listings(id),
    author TEXT,
    comments TEXT NOT NULL,
    rating INTEGER,
    language TEXT,
    created_at TEXT,
    PRIMARY KEY (listing_id, id)
);

-- Normalized booking calendars
CREATE TABLE IF NOT EXISTS calendar_days (
    listing_id TEXT NOT NULL REFERENCES listings(id),
    date TEXT NOT NULL,
    available INTEGER NOT NULL,
    price REAL,
    currency TEXT,
    min_nights INTEGER,
    max_nights INTEGER,
    PRIMARY KEY (listing_id, date)
);

-- Latest pricing document per listing
CREATE TABLE IF NOT EXISTS pricing (
    listing_id TEXT PRIMARY KEY REFERENCES listings(id),
    currency TEXT NOT NULL,
    nightly_min REAL NOT NULL,
    nightly_max REAL NOT NULL,
    nightly_avg REAL NOT NULL,
    document TEXT NOT NULL,
    fetched_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
