use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use rusqlite::Connection;

use super::songs::{fetch_song, insert_song};
use crate::models::Song;

/// Import a JSON array of songs. Incoming ids, view counts and timestamps
/// are ignored; every entry becomes a new record. Either all songs land or
/// none do.
pub fn import_songs(conn: &Connection, path: &Path) -> Result<usize> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let songs: Vec<Song> = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse songs from {}", path.display()))?;

    let tx = conn
        .unchecked_transaction()
        .context("failed to begin import transaction")?;
    for (index, song) in songs.iter().enumerate() {
        let fresh = Song {
            id: 0,
            views: 0,
            created_at: None,
            updated_at: None,
            ..song.clone()
        };
        insert_song(&tx, &fresh).with_context(|| format!("failed to import song #{}", index + 1))?;
    }
    tx.commit().context("failed to commit import")?;

    log::info!("Imported {} songs from {}", songs.len(), path.display());
    Ok(songs.len())
}

/// Write every song, fully hydrated, as a pretty-printed JSON array.
pub fn export_songs(conn: &Connection, path: &Path) -> Result<usize> {
    let mut stmt = conn
        .prepare("SELECT id FROM songs ORDER BY id")
        .context("failed to prepare export query")?;
    let ids = stmt
        .query_map([], |row| row.get::<_, i64>(0))
        .context("failed to iterate song ids")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect song ids")?;

    let mut songs = Vec::with_capacity(ids.len());
    for id in ids {
        songs.push(fetch_song(conn, id)?.ok_or_else(|| anyhow!("Song not found"))?);
    }

    let json = serde_json::to_string_pretty(&songs).context("failed to serialize songs")?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("failed to create export directory")?;
    }
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;

    log::info!("Exported {} songs to {}", songs.len(), path.display());
    Ok(songs.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{count_songs, open_in_memory, seed_sample_songs};

    #[test]
    fn export_then_import_copies_the_library() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("songs.json");

        let source = open_in_memory().unwrap();
        seed_sample_songs(&source).unwrap();
        assert_eq!(export_songs(&source, &path).unwrap(), 3);

        let target = open_in_memory().unwrap();
        assert_eq!(import_songs(&target, &path).unwrap(), 3);
        let original = fetch_song(&source, 2).unwrap().unwrap();
        let copied = fetch_song(&target, 2).unwrap().unwrap();
        assert_eq!(copied.title, original.title);
        assert_eq!(copied.lyric_variants, original.lyric_variants);
        assert_eq!(copied.chord_sets, original.chord_sets);
    }

    #[test]
    fn failed_import_leaves_the_library_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(
            &path,
            r#"[{"title": "Good", "primaryLanguage": "english"},
                {"title": " ", "primaryLanguage": "english"}]"#,
        )
        .unwrap();

        let conn = open_in_memory().unwrap();
        assert!(import_songs(&conn, &path).is_err());
        assert_eq!(count_songs(&conn).unwrap(), 0);
    }

    #[test]
    fn import_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let conn = open_in_memory().unwrap();
        assert!(import_songs(&conn, &path).is_err());
    }
}
