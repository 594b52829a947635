use anyhow::{Context, Result};
use rusqlite::Connection;

use super::songs::{count_songs, insert_song};
use crate::models::Song;

const SAMPLE_SONGS: &str = include_str!("../../data/sample_songs.json");

/// Songs bundled with the binary for a first run.
pub fn sample_songs() -> Result<Vec<Song>> {
    serde_json::from_str(SAMPLE_SONGS).context("bundled sample songs are malformed")
}

/// Fill an empty library with the bundled samples. A library that already
/// holds songs is left alone. Returns how many songs were inserted.
pub fn seed_sample_songs(conn: &Connection) -> Result<usize> {
    if count_songs(conn)? > 0 {
        return Ok(0);
    }

    let songs = sample_songs()?;
    let tx = conn
        .unchecked_transaction()
        .context("failed to begin seed transaction")?;
    for song in &songs {
        insert_song(&tx, song)?;
    }
    tx.commit().context("failed to commit sample songs")?;

    log::info!("Seeded {} sample songs", songs.len());
    Ok(songs.len())
}
