//! Core library surface for the Arise Worship song library.
//!
//! The chord engine (`chords`), the lyric/chart selector and the view
//! pipeline are pure and reusable on their own; `db`, `auth` and `ui` wire
//! them to SQLite, the admin session and the terminal front-end.
pub mod auth;
pub mod chords;
pub mod config;
pub mod db;
pub mod models;
pub mod selector;
pub mod ui;
pub mod view;

/// Name used for the binary, the config directory and the log file.
pub const APP_NAME: &str = "arise-worship";

/// Chord engine entry points used by the renderer and the CLI.
pub use chords::{highlight_line, transpose_chord, transpose_line, TransposeOffset};

/// Settings and domain types other layers manipulate.
pub use config::AppConfig;
pub use models::{Language, Song, SongSummary};
pub use selector::ScriptMode;
pub use view::{render_plain, render_song, DisplayDensity, ViewSettings};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
