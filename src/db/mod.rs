//! Persistence module split across logical submodules.

mod connection;
mod seed;
mod songs;
mod transfer;

pub use connection::{open_database, open_in_memory};
pub use seed::{sample_songs, seed_sample_songs};
pub use songs::{
    count_songs, create_song, delete_song, fetch_categories, fetch_latest, fetch_popular,
    fetch_song, fetch_songs, record_view, update_song, SongFilter,
};
pub use transfer::{export_songs, import_songs};
