use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Open (or create) the song library at `path` and make sure the schema
/// exists. Foreign keys are switched on so child rows follow their song.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(path).context("failed to open SQLite database")?;
    ensure_schema(&conn)?;
    log::debug!("Opened song library at {}", path.display());
    Ok(conn)
}

/// A throwaway library, used by tests and dry runs.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    ensure_schema(&conn)?;
    Ok(conn)
}

fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign keys")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            artist TEXT,
            primary_language TEXT NOT NULL,
            difficulty TEXT NOT NULL DEFAULT 'mixed',
            is_tamil_with_tanglish INTEGER NOT NULL DEFAULT 0,
            is_kannada_with_english INTEGER NOT NULL DEFAULT 0,
            youtube_url TEXT,
            ppt_english TEXT,
            ppt_tamil TEXT,
            ppt_kannada TEXT,
            views INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create songs table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS lyric_variants (
            song_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            language TEXT NOT NULL,
            script TEXT NOT NULL DEFAULT 'original',
            body TEXT NOT NULL,
            PRIMARY KEY (song_id, position),
            FOREIGN KEY(song_id) REFERENCES songs(id) ON DELETE CASCADE
        )",
        [],
    )
    .context("failed to create lyric_variants table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS chord_sets (
            song_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            difficulty TEXT NOT NULL,
            key TEXT NOT NULL,
            body TEXT NOT NULL,
            language TEXT,
            PRIMARY KEY (song_id, position),
            FOREIGN KEY(song_id) REFERENCES songs(id) ON DELETE CASCADE
        )",
        [],
    )
    .context("failed to create chord_sets table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS song_categories (
            song_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            category TEXT NOT NULL,
            PRIMARY KEY (song_id, position),
            FOREIGN KEY(song_id) REFERENCES songs(id) ON DELETE CASCADE
        )",
        [],
    )
    .context("failed to create song_categories table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS song_tags (
            song_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            tag TEXT NOT NULL,
            PRIMARY KEY (song_id, position),
            FOREIGN KEY(song_id) REFERENCES songs(id) ON DELETE CASCADE
        )",
        [],
    )
    .context("failed to create song_tags table")?;

    Ok(())
}
