//! Binary entry point: resolves configuration, brings up logging and the
//! SQLite store, then either runs a one-shot command or the terminal UI.
use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use arise_worship::auth::hash_password;
use arise_worship::db::{export_songs, import_songs, open_database, record_view, seed_sample_songs};
use arise_worship::{
    render_plain, run_app, App, AppConfig, DisplayDensity, ScriptMode, TransposeOffset,
    ViewSettings,
};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "arise-worship", version, about = "Multilingual worship song library")]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the SQLite database
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import songs from a JSON array
    Import {
        /// JSON file to read
        file: PathBuf,
    },

    /// Export every song to a JSON array
    Export {
        /// JSON file to write
        file: PathBuf,
    },

    /// Print a rendered song (chords, then lyrics)
    Show {
        /// Song id
        id: i64,

        /// Semitones to shift the chart by
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        transpose: i32,

        /// Show the transliterated script when the song has one
        #[arg(long)]
        secondary: bool,

        /// Blank-line spacing: compact, normal or spacious
        #[arg(long)]
        density: Option<DisplayDensity>,
    },

    /// Hash an admin password for the config file
    HashPassword {
        password: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref());

    init_logging(cli.verbose, &config, cli.command.is_none())?;

    if let Some(Commands::HashPassword { password }) = &cli.command {
        let hash = hash_password(password).context("Failed to hash password")?;
        println!("admin_password_hash = \"{hash}\"");
        return Ok(());
    }

    // Resolve database path: CLI > config > platform default
    let db_path = cli.db.clone().unwrap_or_else(|| config.resolve_db_path());
    log::info!("Database: {}", db_path.display());
    let conn = open_database(&db_path).context("Failed to open database")?;

    if config.seed_samples {
        let seeded = seed_sample_songs(&conn).context("Failed to seed sample songs")?;
        if seeded > 0 {
            log::info!("Seeded {seeded} sample songs");
        }
    }

    match cli.command {
        None => {
            let mut app = App::new(conn, config)?;
            run_app(&mut app)?;
        }

        Some(Commands::Import { file }) => {
            let count = import_songs(&conn, &file).context("Import failed")?;
            println!("Imported {count} songs from {}", file.display());
        }

        Some(Commands::Export { file }) => {
            let count = export_songs(&conn, &file).context("Export failed")?;
            println!("Exported {count} songs to {}", file.display());
        }

        Some(Commands::Show {
            id,
            transpose,
            secondary,
            density,
        }) => {
            let song = record_view(&conn, id)?;
            if secondary && song.secondary_script().is_none() {
                log::warn!("Song {id} has a single script; showing the original");
            }
            let settings = ViewSettings {
                mode: if secondary {
                    ScriptMode::Secondary
                } else {
                    ScriptMode::Original
                },
                transpose: TransposeOffset::new(transpose),
                density: density.unwrap_or(config.default_density),
            };
            print!("{}", render_plain(&song, &settings));
        }

        Some(Commands::HashPassword { .. }) => {}
    }

    Ok(())
}

/// One-shot commands log to stderr; the TUI owns the terminal, so it logs to
/// the configured file instead. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8, config: &AppConfig, to_file: bool) -> Result<()> {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level));

    if to_file {
        let path = config.resolve_log_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    } else {
        builder.format_timestamp(None);
    }

    builder.init();
    Ok(())
}
