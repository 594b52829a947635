use anyhow::Result;
use rusqlite::Connection;

use crate::chords::TransposeOffset;
use crate::db::{fetch_categories, fetch_latest, fetch_popular, fetch_songs, SongFilter};
use crate::models::{Language, Song, SongDifficulty, SongSummary};
use crate::selector::ScriptMode;
use crate::view::{DisplayDensity, ViewSettings};

/// Which list the library screen is showing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ListKind {
    All,
    Latest,
    Popular,
}

impl ListKind {
    pub(crate) fn next(self) -> Self {
        match self {
            ListKind::All => ListKind::Latest,
            ListKind::Latest => ListKind::Popular,
            ListKind::Popular => ListKind::All,
        }
    }

    pub(crate) fn title(self) -> &'static str {
        match self {
            ListKind::All => "All Songs",
            ListKind::Latest => "Latest",
            ListKind::Popular => "Popular",
        }
    }
}

/// Step an optional filter through `all`, passing through "no filter" once
/// per lap.
fn cycle_filter<T: Clone + PartialEq>(current: Option<&T>, all: &[T]) -> Option<T> {
    match current {
        None => all.first().cloned(),
        Some(value) => {
            let index = all.iter().position(|item| item == value)?;
            all.get(index + 1).cloned()
        }
    }
}

/// Browsable song list with the filters from the header.
pub(crate) struct LibraryScreen {
    pub(crate) kind: ListKind,
    pub(crate) filter: SongFilter,
    pub(crate) songs: Vec<SongSummary>,
    pub(crate) categories: Vec<String>,
    pub(crate) selected: usize,
    pub(crate) limit: usize,
}

impl LibraryScreen {
    pub(crate) fn load(conn: &Connection, limit: usize) -> Result<Self> {
        let mut screen = Self {
            kind: ListKind::All,
            filter: SongFilter::default(),
            songs: Vec::new(),
            categories: Vec::new(),
            selected: 0,
            limit,
        };
        screen.reload(conn)?;
        Ok(screen)
    }

    /// Re-query the active list, keeping the selection on `focus_id` when it
    /// is still present.
    pub(crate) fn reload_focus(&mut self, conn: &Connection, focus_id: Option<i64>) -> Result<()> {
        self.categories = fetch_categories(conn)?;
        if self
            .filter
            .category
            .as_ref()
            .is_some_and(|category| !self.categories.contains(category))
        {
            self.filter.category = None;
        }

        self.songs = match self.kind {
            ListKind::All => fetch_songs(conn, &self.filter)?,
            ListKind::Latest => fetch_latest(conn, self.limit)?,
            ListKind::Popular => fetch_popular(conn, self.limit)?,
        };

        if let Some(id) = focus_id {
            if let Some(index) = self.songs.iter().position(|song| song.id == id) {
                self.selected = index;
            }
        }
        self.ensure_in_bounds();
        Ok(())
    }

    pub(crate) fn reload(&mut self, conn: &Connection) -> Result<()> {
        let focus = self.current_song().map(|song| song.id);
        self.reload_focus(conn, focus)
    }

    pub(crate) fn cycle_kind(&mut self, conn: &Connection) -> Result<()> {
        self.kind = self.kind.next();
        self.selected = 0;
        self.reload_focus(conn, None)
    }

    pub(crate) fn cycle_language(&mut self, conn: &Connection) -> Result<()> {
        self.filter.language = cycle_filter(self.filter.language.as_ref(), Language::ALL);
        self.show_filtered(conn)
    }

    pub(crate) fn cycle_difficulty(&mut self, conn: &Connection) -> Result<()> {
        self.filter.difficulty =
            cycle_filter(self.filter.difficulty.as_ref(), SongDifficulty::ALL);
        self.show_filtered(conn)
    }

    pub(crate) fn cycle_category(&mut self, conn: &Connection) -> Result<()> {
        self.filter.category = cycle_filter(self.filter.category.as_ref(), &self.categories);
        self.show_filtered(conn)
    }

    pub(crate) fn set_query(&mut self, conn: &Connection, query: Option<String>) -> Result<()> {
        self.filter.query = query.filter(|query| !query.trim().is_empty());
        self.show_filtered(conn)
    }

    /// Filters apply to the full list, so switch to it.
    fn show_filtered(&mut self, conn: &Connection) -> Result<()> {
        self.kind = ListKind::All;
        self.selected = 0;
        self.reload_focus(conn, None)
    }

    /// Human-readable summary of the active filters, if any.
    pub(crate) fn filter_summary(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(query) = &self.filter.query {
            parts.push(format!("title ~ \"{query}\""));
        }
        if let Some(language) = self.filter.language {
            parts.push(language.label().to_string());
        }
        if let Some(category) = &self.filter.category {
            parts.push(format!("#{category}"));
        }
        if let Some(difficulty) = self.filter.difficulty {
            parts.push(difficulty.as_str().to_string());
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("  "))
        }
    }

    pub(crate) fn current_song(&self) -> Option<&SongSummary> {
        self.songs.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.songs.is_empty() {
            return;
        }
        let len = self.songs.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.songs.len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        if self.songs.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.songs.len() {
            self.selected = self.songs.len() - 1;
        }
    }
}

/// A single open song with the viewer's transpose, script and density.
pub(crate) struct SongViewScreen {
    pub(crate) song: Song,
    pub(crate) settings: ViewSettings,
    pub(crate) scroll: u16,
}

impl SongViewScreen {
    pub(crate) fn new(song: Song, density: DisplayDensity) -> Self {
        Self {
            song,
            settings: ViewSettings {
                density,
                ..ViewSettings::default()
            },
            scroll: 0,
        }
    }

    /// Swap in a refreshed record, keeping the viewer settings.
    pub(crate) fn replace_song(&mut self, song: Song) {
        self.song = song;
        if self.song.secondary_script().is_none() {
            self.settings.mode = ScriptMode::Original;
        }
    }

    pub(crate) fn transpose_up(&mut self) {
        self.settings.transpose = self.settings.transpose.up();
    }

    pub(crate) fn transpose_down(&mut self) {
        self.settings.transpose = self.settings.transpose.down();
    }

    pub(crate) fn reset_transpose(&mut self) {
        self.settings.transpose = TransposeOffset::default();
    }

    /// Flip between native and romanized script. Returns false for songs
    /// with a single script.
    pub(crate) fn toggle_script(&mut self) -> bool {
        if self.song.secondary_script().is_none() {
            return false;
        }
        self.settings.mode = self.settings.mode.toggled();
        self.scroll = 0;
        true
    }

    pub(crate) fn cycle_density(&mut self) {
        self.settings.density = self.settings.density.next();
    }

    pub(crate) fn scroll_by(&mut self, offset: i32) {
        let next = (self.scroll as i32 + offset).max(0);
        self.scroll = next.min(u16::MAX as i32) as u16;
    }

    /// Slide deck matching the script on screen, falling back to English.
    pub(crate) fn ppt_url(&self) -> Option<&str> {
        let urls = &self.song.ppt_urls;
        let secondary = self.settings.mode == ScriptMode::Secondary
            && self.song.secondary_script().is_some();
        let preferred = match self.song.primary_language {
            Language::Tamil if !secondary => urls.tamil.as_deref(),
            Language::Kannada if !secondary => urls.kannada.as_deref(),
            _ => urls.english.as_deref(),
        };
        preferred.or(urls.english.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_song, open_in_memory};
    use crate::models::PptUrls;

    fn library() -> (Connection, LibraryScreen) {
        let conn = open_in_memory().unwrap();
        for (title, language, categories) in [
            ("Arise and Sing", Language::English, vec!["praise"]),
            ("Uyirtharum Yesu", Language::Tamil, vec!["slow"]),
            ("Namma Devara", Language::Kannada, vec!["praise"]),
        ] {
            create_song(
                &conn,
                &Song {
                    title: title.to_string(),
                    primary_language: language,
                    categories: categories.into_iter().map(str::to_string).collect(),
                    ..Song::default()
                },
            )
            .unwrap();
        }
        let screen = LibraryScreen::load(&conn, 2).unwrap();
        (conn, screen)
    }

    #[test]
    fn filter_cycle_passes_through_none() {
        let all = [1, 2];
        assert_eq!(cycle_filter(None, &all), Some(1));
        assert_eq!(cycle_filter(Some(&1), &all), Some(2));
        assert_eq!(cycle_filter(Some(&2), &all), None);
        assert_eq!(cycle_filter::<i32>(None, &[]), None);
    }

    #[test]
    fn language_filter_narrows_the_list() {
        let (conn, mut screen) = library();
        assert_eq!(screen.songs.len(), 3);
        screen.cycle_language(&conn).unwrap();
        assert_eq!(screen.filter.language, Some(Language::English));
        assert_eq!(screen.songs.len(), 1);
        assert_eq!(screen.filter_summary().as_deref(), Some("English"));
    }

    #[test]
    fn category_filter_uses_library_categories() {
        let (conn, mut screen) = library();
        assert_eq!(screen.categories, vec!["praise", "slow"]);
        screen.cycle_category(&conn).unwrap();
        assert_eq!(screen.songs.len(), 2);
        screen.cycle_category(&conn).unwrap();
        assert_eq!(screen.songs[0].title, "Uyirtharum Yesu");
    }

    #[test]
    fn latest_list_respects_limit() {
        let (conn, mut screen) = library();
        screen.cycle_kind(&conn).unwrap();
        assert_eq!(screen.kind, ListKind::Latest);
        assert_eq!(screen.songs.len(), 2);
    }

    #[test]
    fn selection_stays_in_bounds() {
        let (conn, mut screen) = library();
        screen.move_selection(10);
        assert_eq!(screen.selected, 2);
        screen.set_query(&conn, Some("namma".to_string())).unwrap();
        assert_eq!(screen.selected, 0);
        assert_eq!(screen.songs.len(), 1);
        screen.move_selection(-3);
        assert_eq!(screen.selected, 0);
    }

    #[test]
    fn song_view_tracks_viewer_settings() {
        let song = Song {
            primary_language: Language::Tamil,
            is_tamil_with_tanglish: true,
            ppt_urls: PptUrls {
                english: Some("en".to_string()),
                tamil: Some("ta".to_string()),
                kannada: None,
            },
            ..Song::default()
        };
        let mut view = SongViewScreen::new(song, DisplayDensity::Compact);
        assert_eq!(view.ppt_url(), Some("ta"));
        assert!(view.toggle_script());
        assert_eq!(view.ppt_url(), Some("en"));

        view.transpose_down();
        assert_eq!(view.settings.transpose.to_string(), "-1");
        view.reset_transpose();
        assert!(view.settings.transpose.is_zero());

        view.scroll_by(-5);
        assert_eq!(view.scroll, 0);

        view.replace_song(Song::default());
        assert_eq!(view.settings.mode, ScriptMode::Original);
        assert!(!view.toggle_script());
    }
}
