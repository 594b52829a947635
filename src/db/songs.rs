use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};

use crate::models::{
    ChordSet, Language, LyricVariant, PptUrls, Song, SongDifficulty, SongSummary,
};

/// Narrowing applied to the library list. Every `None` field matches all songs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongFilter {
    /// Case-insensitive substring of the title.
    pub query: Option<String>,
    pub language: Option<Language>,
    /// Exact category name the song must carry.
    pub category: Option<String>,
    pub difficulty: Option<SongDifficulty>,
}

const SUMMARY_COLUMNS: &str =
    "s.id, s.title, s.artist, s.primary_language, s.difficulty, s.views, s.created_at";

const SONG_COLUMNS: &str = "id, title, artist, primary_language, difficulty,
    is_tamil_with_tanglish, is_kannada_with_english, youtube_url,
    ppt_english, ppt_tamil, ppt_kannada, views, created_at, updated_at";

/// Read a text column into one of the model enums.
fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<SongSummary> {
    Ok(SongSummary {
        id: row.get(0)?,
        title: row.get(1)?,
        artist: row.get(2)?,
        primary_language: parse_column(row, 3)?,
        difficulty: parse_column(row, 4)?,
        views: row.get(5)?,
        created_at: row.get(6)?,
        categories: Vec::new(),
    })
}

fn collect_summaries(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<SongSummary>> {
    let mut stmt = conn.prepare(sql).context("failed to prepare song list query")?;
    let mut summaries = stmt
        .query_map(params, summary_from_row)
        .context("failed to iterate songs")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect songs")?;

    for summary in &mut summaries {
        summary.categories = fetch_song_strings(conn, "song_categories", "category", summary.id)?;
    }
    Ok(summaries)
}

/// List songs matching `filter`, ordered by title without regard to case.
pub fn fetch_songs(conn: &Connection, filter: &SongFilter) -> Result<Vec<SongSummary>> {
    let query = filter
        .query
        .as_deref()
        .map(str::trim)
        .filter(|query| !query.is_empty());
    let category = filter
        .category
        .as_deref()
        .map(str::trim)
        .filter(|category| !category.is_empty());

    let sql = format!(
        "SELECT {SUMMARY_COLUMNS}
         FROM songs s
         WHERE (?1 IS NULL OR s.primary_language = ?1)
           AND (?2 IS NULL OR s.difficulty = ?2)
           AND (?3 IS NULL OR EXISTS (
                SELECT 1 FROM song_categories c WHERE c.song_id = s.id AND c.category = ?3
           ))
           AND (?4 IS NULL OR instr(lower(s.title), lower(?4)) > 0)
         ORDER BY s.title COLLATE NOCASE, s.id"
    );

    collect_summaries(
        conn,
        &sql,
        params![
            filter.language.map(Language::as_str),
            filter.difficulty.map(SongDifficulty::as_str),
            category,
            query,
        ],
    )
}

/// Most recently added songs first.
pub fn fetch_latest(conn: &Connection, limit: usize) -> Result<Vec<SongSummary>> {
    let sql = format!(
        "SELECT {SUMMARY_COLUMNS} FROM songs s ORDER BY s.created_at DESC, s.id DESC LIMIT ?1"
    );
    collect_summaries(conn, &sql, params![limit as i64])
}

/// Most viewed songs first.
pub fn fetch_popular(conn: &Connection, limit: usize) -> Result<Vec<SongSummary>> {
    let sql = format!(
        "SELECT {SUMMARY_COLUMNS} FROM songs s
         ORDER BY s.views DESC, s.title COLLATE NOCASE, s.id LIMIT ?1"
    );
    collect_summaries(conn, &sql, params![limit as i64])
}

/// Distinct category names across the library for the filter cycle.
pub fn fetch_categories(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(
            "SELECT DISTINCT category FROM song_categories
             WHERE category <> ''
             ORDER BY LOWER(category), category",
        )
        .context("failed to prepare category query")?;

    let mut rows = stmt.query([]).context("failed to execute category query")?;

    let mut categories = Vec::new();
    while let Some(row) = rows.next().context("failed to fetch category row")? {
        let category: String = row.get(0).context("failed to read category value")?;
        categories.push(category);
    }

    Ok(categories)
}

fn fetch_song_strings(conn: &Connection, table: &str, column: &str, id: i64) -> Result<Vec<String>> {
    let sql = format!("SELECT {column} FROM {table} WHERE song_id = ?1 ORDER BY position");
    let mut stmt = conn
        .prepare(&sql)
        .with_context(|| format!("failed to prepare {table} query"))?;
    let values = stmt
        .query_map([id], |row| row.get(0))
        .with_context(|| format!("failed to iterate {table}"))?
        .collect::<Result<Vec<String>, _>>()
        .with_context(|| format!("failed to collect {table}"))?;
    Ok(values)
}

/// Load one complete record, or `None` when the id is unknown.
pub fn fetch_song(conn: &Connection, id: i64) -> Result<Option<Song>> {
    let sql = format!("SELECT {SONG_COLUMNS} FROM songs WHERE id = ?1");
    let song = conn
        .query_row(&sql, [id], |row| {
            Ok(Song {
                id: row.get(0)?,
                title: row.get(1)?,
                artist: row.get(2)?,
                primary_language: parse_column(row, 3)?,
                difficulty: parse_column(row, 4)?,
                is_tamil_with_tanglish: row.get(5)?,
                is_kannada_with_english: row.get(6)?,
                youtube_url: row.get(7)?,
                ppt_urls: PptUrls {
                    english: row.get(8)?,
                    tamil: row.get(9)?,
                    kannada: row.get(10)?,
                },
                views: row.get(11)?,
                created_at: row.get(12)?,
                updated_at: row.get(13)?,
                ..Song::default()
            })
        })
        .optional()
        .context("failed to load song")?;

    let Some(mut song) = song else {
        return Ok(None);
    };

    let mut stmt = conn
        .prepare(
            "SELECT language, script, body FROM lyric_variants
             WHERE song_id = ?1 ORDER BY position",
        )
        .context("failed to prepare lyric variant query")?;
    song.lyric_variants = stmt
        .query_map([id], |row| {
            Ok(LyricVariant {
                language: row.get(0)?,
                script: parse_column(row, 1)?,
                body: row.get(2)?,
            })
        })
        .context("failed to iterate lyric variants")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect lyric variants")?;

    let mut stmt = conn
        .prepare(
            "SELECT difficulty, key, body, language FROM chord_sets
             WHERE song_id = ?1 ORDER BY position",
        )
        .context("failed to prepare chord set query")?;
    song.chord_sets = stmt
        .query_map([id], |row| {
            Ok(ChordSet {
                difficulty: parse_column(row, 0)?,
                key: row.get(1)?,
                body: row.get(2)?,
                language: row.get(3)?,
            })
        })
        .context("failed to iterate chord sets")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect chord sets")?;

    song.categories = fetch_song_strings(conn, "song_categories", "category", id)?;
    song.tags = fetch_song_strings(conn, "song_tags", "tag", id)?;

    Ok(Some(song))
}

/// Count a view and return the refreshed record.
pub fn record_view(conn: &Connection, id: i64) -> Result<Song> {
    let updated = conn
        .execute("UPDATE songs SET views = views + 1 WHERE id = ?1", [id])
        .context("failed to record song view")?;

    if updated == 0 {
        return Err(anyhow!("Song not found"));
    }
    fetch_song(conn, id)?.ok_or_else(|| anyhow!("Song not found"))
}

fn validate(song: &Song) -> Result<()> {
    if song.title.trim().is_empty() {
        bail!("Song title is required");
    }
    Ok(())
}

/// Replace every child row of `id` with the contents of `song`.
fn write_children(conn: &Connection, id: i64, song: &Song) -> Result<()> {
    for table in ["lyric_variants", "chord_sets", "song_categories", "song_tags"] {
        conn.execute(&format!("DELETE FROM {table} WHERE song_id = ?1"), [id])
            .with_context(|| format!("failed to clear {table}"))?;
    }

    for (position, variant) in song.lyric_variants.iter().enumerate() {
        conn.execute(
            "INSERT INTO lyric_variants (song_id, position, language, script, body)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                position as i64,
                variant.language,
                variant.script.as_str(),
                variant.body
            ],
        )
        .context("failed to insert lyric variant")?;
    }

    for (position, set) in song.chord_sets.iter().enumerate() {
        conn.execute(
            "INSERT INTO chord_sets (song_id, position, difficulty, key, body, language)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                position as i64,
                set.difficulty.as_str(),
                set.key,
                set.body,
                set.language
            ],
        )
        .context("failed to insert chord set")?;
    }

    for (position, category) in song.categories.iter().enumerate() {
        conn.execute(
            "INSERT INTO song_categories (song_id, position, category) VALUES (?1, ?2, ?3)",
            params![id, position as i64, category],
        )
        .context("failed to insert category")?;
    }

    for (position, tag) in song.tags.iter().enumerate() {
        conn.execute(
            "INSERT INTO song_tags (song_id, position, tag) VALUES (?1, ?2, ?3)",
            params![id, position as i64, tag],
        )
        .context("failed to insert tag")?;
    }

    Ok(())
}

/// Insert `song` without a transaction of its own. Callers wrap it.
pub(super) fn insert_song(conn: &Connection, song: &Song) -> Result<i64> {
    validate(song)?;
    conn.execute(
        "INSERT INTO songs (
            title, artist, primary_language, difficulty,
            is_tamil_with_tanglish, is_kannada_with_english, youtube_url,
            ppt_english, ppt_tamil, ppt_kannada, views, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
            strftime('%Y-%m-%dT%H:%M:%fZ', 'now'), strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
        params![
            song.title.trim(),
            song.artist,
            song.primary_language.as_str(),
            song.difficulty.as_str(),
            song.is_tamil_with_tanglish,
            song.is_kannada_with_english,
            song.youtube_url,
            song.ppt_urls.english,
            song.ppt_urls.tamil,
            song.ppt_urls.kannada,
            song.views,
        ],
    )
    .context("failed to insert song")?;

    let id = conn.last_insert_rowid();
    write_children(conn, id, song)?;
    Ok(id)
}

/// Insert a new record with all nested rows and echo it back as stored.
pub fn create_song(conn: &Connection, song: &Song) -> Result<Song> {
    let tx = conn
        .unchecked_transaction()
        .context("failed to begin transaction")?;
    let id = insert_song(&tx, song)?;
    tx.commit().context("failed to commit new song")?;

    log::info!("Created song {} ({})", id, song.title.trim());
    fetch_song(conn, id)?.ok_or_else(|| anyhow!("Song not found"))
}

/// Overwrite every editable field of song `id`, replacing its nested rows.
/// The view counter and creation time are kept.
pub fn update_song(conn: &Connection, id: i64, song: &Song) -> Result<Song> {
    validate(song)?;
    let tx = conn
        .unchecked_transaction()
        .context("failed to begin transaction")?;

    let updated = tx
        .execute(
            "UPDATE songs SET
                title = ?1, artist = ?2, primary_language = ?3, difficulty = ?4,
                is_tamil_with_tanglish = ?5, is_kannada_with_english = ?6, youtube_url = ?7,
                ppt_english = ?8, ppt_tamil = ?9, ppt_kannada = ?10,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
             WHERE id = ?11",
            params![
                song.title.trim(),
                song.artist,
                song.primary_language.as_str(),
                song.difficulty.as_str(),
                song.is_tamil_with_tanglish,
                song.is_kannada_with_english,
                song.youtube_url,
                song.ppt_urls.english,
                song.ppt_urls.tamil,
                song.ppt_urls.kannada,
                id,
            ],
        )
        .context("failed to update song")?;

    if updated == 0 {
        return Err(anyhow!("Song not found"));
    }

    write_children(&tx, id, song)?;
    tx.commit().context("failed to commit song update")?;

    log::info!("Updated song {id}");
    fetch_song(conn, id)?.ok_or_else(|| anyhow!("Song not found"))
}

/// Permanently delete a song. Variants, chord sets, categories and tags
/// cascade with it.
pub fn delete_song(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM songs WHERE id = ?1", params![id])
        .context("failed to delete song")?;

    if deleted == 0 {
        Err(anyhow!("Song not found"))
    } else {
        log::info!("Deleted song {id}");
        Ok(())
    }
}

pub fn count_songs(conn: &Connection) -> Result<usize> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM songs", [], |row| row.get(0))
        .context("failed to count songs")?;
    Ok(count as usize)
}
