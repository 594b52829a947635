use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap,
};
use ratatui::Frame;
use rusqlite::Connection;

use crate::auth::AdminSession;
use crate::config::AppConfig;
use crate::db::{create_song, delete_song, fetch_song, record_view, update_song};
use crate::models::Song;
use crate::view::{render_song, NO_CHORDS_PLACEHOLDER, NO_LYRICS_PLACEHOLDER};

use super::forms::{ConfirmSongDelete, LoginForm, SongField, SongForm};
use super::helpers::{centered_rect, key_hints, segments_to_line, surface_error};
use super::screens::{LibraryScreen, ListKind, SongViewScreen};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows moved by PageUp/PageDown.
const PAGE: isize = 10;
/// Width of the label column in the song form, including `": "`.
const FORM_LABEL_WIDTH: u16 = 19;
/// Charts and lyrics sit side by side from this width up.
const SIDE_BY_SIDE_WIDTH: u16 = 100;

/// High-level navigation states.
enum Screen {
    Library,
    Song(SongViewScreen),
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    Searching(SearchState),
    LoggingIn(LoginForm),
    CreatingSong(SongForm),
    EditingSong { base: Box<Song>, form: SongForm },
    ConfirmSongDelete(ConfirmSongDelete),
}

/// State for an active inline title search.
struct SearchState {
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    conn: Connection,
    config: AppConfig,
    library: LibraryScreen,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
    session: Option<AdminSession>,
}

impl App {
    pub fn new(conn: Connection, config: AppConfig) -> Result<Self> {
        let library = LibraryScreen::load(&conn, config.highlight_limit)?;
        Ok(Self {
            conn,
            config,
            library,
            screen: Screen::Library,
            mode: Mode::Normal,
            status: None,
            session: None,
        })
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Searching(state) => self.handle_search(code, state)?,
            Mode::LoggingIn(form) => self.handle_login(code, form),
            Mode::CreatingSong(form) => self.handle_song_form(code, None, form)?,
            Mode::EditingSong { base, form } => self.handle_song_form(code, Some(base), form)?,
            Mode::ConfirmSongDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
        };

        Ok(exit)
    }

    /// Ctrl+S saves the open song form from any field.
    pub(crate) fn handle_ctrl_s(&mut self) -> Result<()> {
        let mode = mem::replace(&mut self.mode, Mode::Normal);
        self.mode = match mode {
            Mode::CreatingSong(form) => self.save_form(None, form)?,
            Mode::EditingSong { base, form } => self.save_form(Some(base), form)?,
            other => other,
        };
        Ok(())
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Library => self.handle_library_key(code, exit),
            Screen::Song(_) => self.handle_song_key(code, exit),
        }
    }

    fn handle_library_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Up => self.library.move_selection(-1),
            KeyCode::Down => self.library.move_selection(1),
            KeyCode::PageUp => self.library.move_selection(-PAGE),
            KeyCode::PageDown => self.library.move_selection(PAGE),
            KeyCode::Home => self.library.select_first(),
            KeyCode::End => self.library.select_last(),
            KeyCode::Tab => {
                self.clear_status();
                self.library.cycle_kind(&self.conn)?;
            }
            KeyCode::Char('f') => {
                self.clear_status();
                return Ok(Mode::Searching(SearchState {
                    query: self.library.filter.query.clone().unwrap_or_default(),
                }));
            }
            KeyCode::Char('l') => self.library.cycle_language(&self.conn)?,
            KeyCode::Char('d') => self.library.cycle_difficulty(&self.conn)?,
            KeyCode::Char('c') => self.library.cycle_category(&self.conn)?,
            KeyCode::Enter => match self.library.current_song().map(|song| song.id) {
                Some(id) => self.open_song(id)?,
                None => self.set_status("No song selected.", StatusKind::Error),
            },
            KeyCode::Char('a') => return Ok(self.begin_login()),
            KeyCode::Char('x') => self.logout(),
            KeyCode::Char('+') => {
                if self.require_admin() {
                    self.clear_status();
                    return Ok(Mode::CreatingSong(SongForm::default()));
                }
            }
            KeyCode::Char('e') => {
                if self.require_admin() {
                    match self.library.current_song().map(|song| song.id) {
                        Some(id) => return self.begin_edit(id),
                        None => self.set_status("No song selected to edit.", StatusKind::Error),
                    }
                }
            }
            KeyCode::Char('-') => {
                if self.require_admin() {
                    match self.library.current_song().cloned() {
                        Some(song) => {
                            self.clear_status();
                            return Ok(Mode::ConfirmSongDelete(ConfirmSongDelete { song }));
                        }
                        None => {
                            self.set_status("No song selected to delete.", StatusKind::Error)
                        }
                    }
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_song_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        let Screen::Song(view) = &mut self.screen else {
            return Ok(Mode::Normal);
        };

        let mut status_to_set: Option<(String, StatusKind)> = None;
        let mut back_to_library = false;
        let mut edit_id = None;

        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => back_to_library = true,
            KeyCode::Char('+') | KeyCode::Char(']') => view.transpose_up(),
            KeyCode::Char('-') | KeyCode::Char('[') => view.transpose_down(),
            KeyCode::Char('0') => view.reset_transpose(),
            KeyCode::Char('t') => {
                if !view.toggle_script() {
                    status_to_set = Some((
                        "This song has a single script.".to_string(),
                        StatusKind::Error,
                    ));
                }
            }
            KeyCode::Char('z') => {
                view.cycle_density();
                status_to_set = Some((
                    format!("Density: {}.", view.settings.density),
                    StatusKind::Info,
                ));
            }
            KeyCode::Up => view.scroll_by(-1),
            KeyCode::Down => view.scroll_by(1),
            KeyCode::PageUp => view.scroll_by(-(PAGE as i32)),
            KeyCode::PageDown => view.scroll_by(PAGE as i32),
            KeyCode::Home => view.scroll = 0,
            KeyCode::Char('y') => {
                let link = view.song.youtube_url.clone();
                status_to_set = Some(open_external(link.as_deref(), "YouTube link"));
            }
            KeyCode::Char('o') => {
                let link = view.ppt_url().map(str::to_string);
                status_to_set = Some(open_external(link.as_deref(), "slide deck"));
            }
            KeyCode::Char('e') => edit_id = Some(view.song.id),
            KeyCode::Char('a') => return Ok(self.begin_login()),
            KeyCode::Char('x') => self.logout(),
            _ => {}
        }

        if let Some((text, kind)) = status_to_set {
            self.set_status(text, kind);
        }

        if back_to_library {
            self.clear_status();
            self.screen = Screen::Library;
            self.library.reload(&self.conn)?;
        } else if let Some(id) = edit_id {
            if self.require_admin() {
                return self.begin_edit(id);
            }
        }

        Ok(Mode::Normal)
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.library.set_query(&self.conn, None)?;
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => {
                if let Some(id) = self.library.current_song().map(|song| song.id) {
                    self.open_song(id)?;
                }
                return Ok(Mode::Normal);
            }
            KeyCode::Up => {
                self.library.move_selection(-1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Down => {
                self.library.move_selection(1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => state.query.push(ch),
            _ => return Ok(Mode::Searching(state)),
        }

        self.library
            .set_query(&self.conn, Some(state.query.clone()))?;
        Ok(Mode::Searching(state))
    }

    fn handle_login(&mut self, code: KeyCode, mut form: LoginForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Login cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter => match AdminSession::login(&self.config, &form.password) {
                Ok(session) => {
                    self.session = Some(session);
                    self.set_status("Logged in as admin.", StatusKind::Info);
                    Mode::Normal
                }
                Err(err) => {
                    form.password.clear();
                    form.error = Some(err.to_string());
                    Mode::LoggingIn(form)
                }
            },
            KeyCode::Backspace => {
                form.backspace();
                Mode::LoggingIn(form)
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
                Mode::LoggingIn(form)
            }
            _ => Mode::LoggingIn(form),
        }
    }

    fn handle_song_form(
        &mut self,
        code: KeyCode,
        base: Option<Box<Song>>,
        mut form: SongForm,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                let message = if base.is_some() {
                    "Edit cancelled."
                } else {
                    "Creation cancelled."
                };
                self.set_status(message, StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab => form.next_field(),
            KeyCode::BackTab => form.previous_field(),
            KeyCode::Down if !form.active.is_multiline() => form.next_field(),
            KeyCode::Up if !form.active.is_multiline() => form.previous_field(),
            KeyCode::Left => form.cycle_choice(-1),
            KeyCode::Right => form.cycle_choice(1),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                if !form.push_newline() {
                    return self.save_form(base, form);
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(form_mode(base, form))
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmSongDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match delete_song(&self.conn, confirm.song.id) {
                    Ok(()) => {
                        if matches!(&self.screen, Screen::Song(view) if view.song.id == confirm.song.id)
                        {
                            self.screen = Screen::Library;
                        }
                        self.library.reload(&self.conn)?;
                        self.set_status("Song deleted.", StatusKind::Info);
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        self.set_status(surface_error(&err), StatusKind::Error);
                        Ok(Mode::ConfirmSongDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmSongDelete(confirm)),
        }
    }

    fn save_form(&mut self, base: Option<Box<Song>>, mut form: SongForm) -> Result<Mode> {
        let outcome = form
            .into_song(base.as_deref())
            .and_then(|song| match &base {
                Some(base) => update_song(&self.conn, base.id, &song),
                None => create_song(&self.conn, &song),
            });

        match outcome {
            Ok(saved) => {
                let message = if base.is_some() {
                    "Song updated."
                } else {
                    "Song created."
                };
                self.library.reload_focus(&self.conn, Some(saved.id))?;
                if let Screen::Song(view) = &mut self.screen {
                    if view.song.id == saved.id {
                        view.replace_song(saved);
                    }
                }
                self.set_status(message, StatusKind::Info);
                Ok(Mode::Normal)
            }
            Err(err) => {
                let message = surface_error(&err);
                form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
                Ok(form_mode(base, form))
            }
        }
    }

    fn open_song(&mut self, id: i64) -> Result<()> {
        match record_view(&self.conn, id) {
            Ok(song) => {
                self.clear_status();
                self.screen = Screen::Song(SongViewScreen::new(song, self.config.default_density));
            }
            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
        }
        Ok(())
    }

    fn begin_edit(&mut self, id: i64) -> Result<Mode> {
        match fetch_song(&self.conn, id)? {
            Some(song) => {
                self.clear_status();
                let form = SongForm::from_song(&song);
                Ok(Mode::EditingSong {
                    base: Box::new(song),
                    form,
                })
            }
            None => {
                self.set_status("Song not found", StatusKind::Error);
                Ok(Mode::Normal)
            }
        }
    }

    fn begin_login(&mut self) -> Mode {
        if self.session.is_some() {
            self.set_status("Already logged in.", StatusKind::Info);
            Mode::Normal
        } else {
            self.clear_status();
            Mode::LoggingIn(LoginForm::default())
        }
    }

    fn logout(&mut self) {
        if self.session.take().is_some() {
            log::info!("Admin session ended");
            self.set_status("Logged out.", StatusKind::Info);
        }
    }

    fn require_admin(&mut self) -> bool {
        if self.session.is_some() {
            true
        } else {
            self.set_status("Admin login required. Press 'a' to log in.", StatusKind::Error);
            false
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Library => self.draw_library(frame, content_area),
            Screen::Song(view) => self.draw_song(frame, content_area, view),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::LoggingIn(form) => self.draw_login(frame, area, form),
            Mode::CreatingSong(form) => self.draw_song_form(frame, area, "New Song", form),
            Mode::EditingSong { form, .. } => self.draw_song_form(frame, area, "Edit Song", form),
            Mode::ConfirmSongDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_library(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(1)])
            .split(area);

        let kinds = [ListKind::All, ListKind::Latest, ListKind::Popular];
        let selected_tab = kinds
            .iter()
            .position(|kind| *kind == self.library.kind)
            .unwrap_or_default();
        let header_block = Block::default()
            .borders(Borders::ALL)
            .title(if self.session.is_some() {
                "Arise Worship (admin)"
            } else {
                "Arise Worship"
            });
        let header_inner = header_block.inner(chunks[0]);
        frame.render_widget(header_block, chunks[0]);

        let header_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(header_inner);
        let tabs = Tabs::new(kinds.iter().map(|kind| kind.title()).collect::<Vec<_>>())
            .select(selected_tab)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, header_rows[0]);

        let filter_line = match self.library.filter_summary() {
            Some(summary) => Line::from(vec![
                Span::styled("Filters: ", Style::default().fg(Color::Gray)),
                Span::raw(summary),
            ]),
            None => Line::from(Span::styled(
                format!("{} songs", self.library.songs.len()),
                Style::default().fg(Color::Gray),
            )),
        };
        frame.render_widget(Paragraph::new(filter_line), header_rows[1]);

        if self.library.songs.is_empty() {
            let message = Paragraph::new("No songs match. Clear the filters or press '+' to add one.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, chunks[1]);
            return;
        }

        let items: Vec<ListItem> = self
            .library
            .songs
            .iter()
            .map(|song| {
                let mut meta = vec![song.primary_language.label().to_string()];
                if !song.categories.is_empty() {
                    meta.push(song.categories.join(", "));
                }
                meta.push(song.difficulty.as_str().to_string());
                meta.push(format!("{} views", song.views));

                ListItem::new(vec![
                    Line::from(Span::styled(
                        song.display_title(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        format!("  {}", meta.join(" · ")),
                        Style::default().fg(Color::Gray),
                    )),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(self.library.kind.title()),
            )
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");
        let mut state = ListState::default().with_selected(Some(self.library.selected));
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    fn draw_song(&self, frame: &mut Frame, area: Rect, view: &SongViewScreen) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(1)])
            .split(area);

        let song = &view.song;
        let rendered = render_song(song, &view.settings);

        let mut meta = vec![song.primary_language.label().to_string()];
        if !song.categories.is_empty() {
            meta.push(song.categories.join(", "));
        }
        if let Some(key) = &rendered.key {
            meta.push(format!("Key {key}"));
        }

        let mut controls = vec![
            Span::styled("Transpose ", Style::default().fg(Color::Gray)),
            Span::styled(
                view.settings.transpose.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled("   Density ", Style::default().fg(Color::Gray)),
            Span::raw(view.settings.density.to_string()),
        ];
        if let Some(secondary) = song.secondary_script() {
            controls.push(Span::styled("   Script ", Style::default().fg(Color::Gray)));
            controls.push(Span::styled(
                secondary.mode_label(view.settings.mode),
                Style::default().fg(Color::Cyan),
            ));
        }

        let header = Paragraph::new(vec![
            Line::from(vec![
                Span::styled(
                    song.display_title(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("  {}", meta.join(" · "))),
            ]),
            Line::from(controls),
        ])
        .block(Block::default().borders(Borders::ALL).title("Song"));
        frame.render_widget(header, chunks[0]);

        let direction = if chunks[1].width >= SIDE_BY_SIDE_WIDTH {
            Direction::Horizontal
        } else {
            Direction::Vertical
        };
        let panes = Layout::default()
            .direction(direction)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1]);

        let placeholder_style = Style::default().fg(Color::DarkGray);
        let chord_lines: Vec<Line> = match &rendered.chord_lines {
            Some(rows) => rows.iter().map(|row| segments_to_line(row)).collect(),
            None => vec![Line::from(Span::styled(NO_CHORDS_PLACEHOLDER, placeholder_style))],
        };
        let lyric_lines: Vec<Line> = match &rendered.lyric_lines {
            Some(rows) => rows.iter().map(|row| Line::from(row.clone())).collect(),
            None => vec![Line::from(Span::styled(NO_LYRICS_PLACEHOLDER, placeholder_style))],
        };

        // Charts must not wrap or the chord columns drift off their lyrics.
        let chords = Paragraph::new(chord_lines)
            .block(Block::default().borders(Borders::ALL).title("Chords"))
            .scroll((view.scroll, 0));
        frame.render_widget(chords, panes[0]);

        let lyrics = Paragraph::new(lyric_lines)
            .block(Block::default().borders(Borders::ALL).title("Lyrics"))
            .wrap(Wrap { trim: false })
            .scroll((view.scroll, 0));
        frame.render_widget(lyrics, panes[1]);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let admin = self.session.is_some();
        match (&self.screen, &self.mode) {
            (_, Mode::Searching(_)) => key_hints(&[
                ("↑↓", "Navigate"),
                ("Enter", "Open"),
                ("Esc", "Clear search"),
            ]),
            (_, Mode::LoggingIn(_)) => key_hints(&[("Enter", "Log in"), ("Esc", "Cancel")]),
            (_, Mode::CreatingSong(_)) | (_, Mode::EditingSong { .. }) => key_hints(&[
                ("Tab", "Next field"),
                ("←→", "Change choice"),
                ("Ctrl+S", "Save"),
                ("Esc", "Cancel"),
            ]),
            (_, Mode::ConfirmSongDelete(_)) => key_hints(&[("Y", "Delete"), ("N", "Keep")]),
            (Screen::Library, Mode::Normal) => {
                let mut hints = vec![
                    ("Enter", "Open"),
                    ("Tab", "List"),
                    ("f", "Search"),
                    ("l/d/c", "Language/Difficulty/Category"),
                ];
                if admin {
                    hints.extend([("+", "New"), ("e", "Edit"), ("-", "Delete"), ("x", "Log out")]);
                } else {
                    hints.push(("a", "Admin"));
                }
                hints.push(("q", "Quit"));
                key_hints(&hints)
            }
            (Screen::Song(_), Mode::Normal) => {
                let mut hints = vec![
                    ("+/-", "Transpose"),
                    ("0", "Reset"),
                    ("t", "Script"),
                    ("z", "Density"),
                    ("y", "YouTube"),
                    ("o", "PPT"),
                ];
                if admin {
                    hints.push(("e", "Edit"));
                }
                hints.push(("Esc", "Back"));
                key_hints(&hints)
            }
        }
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search titles");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_login(&self, frame: &mut Frame, area: Rect, form: &LoginForm) {
        let popup_area = centered_rect(50, 25, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Admin Login").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            Line::from(vec![Span::raw("Password: "), Span::raw(form.masked())]),
            Line::from(""),
        ];
        match &form.error {
            Some(error) => lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            ))),
            None => lines.push(Line::from(Span::styled(
                "Enter to log in · Esc to cancel",
                Style::default().fg(Color::Gray),
            ))),
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let cursor_x = inner.x + "Password: ".len() as u16 + form.password.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_song_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &SongForm) {
        let popup_area = centered_rect(90, 90, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let field_rows = SongField::ALL.len() as u16 + 2;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(field_rows), Constraint::Min(3)])
            .split(inner);

        let mut lines: Vec<Line> = SongField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));
        match &form.error {
            Some(error) => lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            ))),
            None => lines.push(Line::from(Span::styled(
                "Ctrl+S to save · Enter saves from single-line fields · Esc to cancel",
                Style::default().fg(Color::Gray),
            ))),
        }
        frame.render_widget(Paragraph::new(lines), chunks[0]);

        let active = form.active;
        if active.is_multiline() {
            let editor = Block::default()
                .borders(Borders::ALL)
                .title(format!("{} (Enter for newline)", active.label()));
            let editor_inner = editor.inner(chunks[1]);
            let text = form.text(active);
            let rows: Vec<&str> = text.split('\n').collect();
            let last_row = rows.len().saturating_sub(1) as u16;
            let scroll = last_row.saturating_sub(editor_inner.height.saturating_sub(1));

            let body = Paragraph::new(text.clone())
                .block(editor)
                .scroll((scroll, 0));
            frame.render_widget(body, chunks[1]);

            let last_len = rows.last().map(|row| row.chars().count()).unwrap_or(0) as u16;
            frame.set_cursor_position((
                editor_inner.x + last_len,
                editor_inner.y + last_row - scroll,
            ));
        } else {
            let preview = Paragraph::new(Span::styled(
                if active.is_choice() {
                    "Use ←/→ or Space to change this value."
                } else {
                    "Type to edit. Tab moves to the next field."
                },
                Style::default().fg(Color::Gray),
            ))
            .block(Block::default().borders(Borders::ALL));
            frame.render_widget(preview, chunks[1]);

            if !active.is_choice() {
                let row = SongField::ALL
                    .iter()
                    .position(|field| *field == active)
                    .unwrap_or_default() as u16;
                let len = form.text(active).chars().count() as u16;
                frame.set_cursor_position((
                    chunks[0].x + FORM_LABEL_WIDTH + len,
                    chunks[0].y + row,
                ));
            }
        }
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmSongDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Delete Song").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Delete '{}' permanently?",
                confirm.song.display_title()
            )),
            Line::from("All lyrics and chord charts for it are removed."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }
}

fn form_mode(base: Option<Box<Song>>, form: SongForm) -> Mode {
    match base {
        Some(base) => Mode::EditingSong { base, form },
        None => Mode::CreatingSong(form),
    }
}

/// Open `link` in the system handler and describe the outcome.
fn open_external(link: Option<&str>, what: &str) -> (String, StatusKind) {
    match link.map(str::trim).filter(|link| !link.is_empty()) {
        None => (format!("This song does not have a {what}."), StatusKind::Error),
        Some(link) => match open_link(link) {
            Ok(()) => (format!("Opened {what}."), StatusKind::Info),
            Err(err) => (format!("Failed to open link: {err}"), StatusKind::Error),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::db::{fetch_songs, open_in_memory, seed_sample_songs, SongFilter};
    use crate::view::DisplayDensity;

    fn app_with_password(password: Option<&str>) -> App {
        let conn = open_in_memory().unwrap();
        seed_sample_songs(&conn).unwrap();
        let config = AppConfig {
            admin_password_hash: password.map(|p| hash_password(p).unwrap()),
            default_density: DisplayDensity::Compact,
            ..AppConfig::default()
        };
        App::new(conn, config).unwrap()
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    fn status(app: &App) -> &str {
        app.status.as_ref().map(|s| s.text.as_str()).unwrap_or("")
    }

    #[test]
    fn opening_a_song_records_a_view() {
        let mut app = app_with_password(None);
        app.handle_key(KeyCode::Enter).unwrap();
        let Screen::Song(view) = &app.screen else {
            panic!("expected song screen");
        };
        assert_eq!(view.song.views, 1);
        assert_eq!(view.settings.density, DisplayDensity::Compact);

        app.handle_key(KeyCode::Esc).unwrap();
        assert!(matches!(app.screen, Screen::Library));
        assert_eq!(app.library.songs[0].views, 1);
    }

    #[test]
    fn song_keys_adjust_transpose_and_script() {
        let mut app = app_with_password(None);
        type_text(&mut app, "f");
        type_text(&mut app, "uyir");
        app.handle_key(KeyCode::Enter).unwrap();

        for key in ['+', ']', '-'] {
            app.handle_key(KeyCode::Char(key)).unwrap();
        }
        app.handle_key(KeyCode::Char('t')).unwrap();
        let Screen::Song(view) = &app.screen else {
            panic!("expected song screen");
        };
        assert_eq!(view.settings.transpose.steps(), 1);
        assert_eq!(view.settings.mode, crate::selector::ScriptMode::Secondary);
    }

    #[test]
    fn mutations_require_admin_login() {
        let mut app = app_with_password(Some("psalm"));
        app.handle_key(KeyCode::Char('+')).unwrap();
        assert!(matches!(app.mode, Mode::Normal));
        assert!(status(&app).starts_with("Admin login required"));

        app.handle_key(KeyCode::Char('a')).unwrap();
        type_text(&mut app, "wrong");
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(matches!(app.mode, Mode::LoggingIn(_)));

        type_text(&mut app, "psalm");
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(app.session.is_some());

        app.handle_key(KeyCode::Char('x')).unwrap();
        assert!(app.session.is_none());
    }

    #[test]
    fn admin_creates_and_deletes_a_song() {
        let mut app = app_with_password(Some("psalm"));
        app.handle_key(KeyCode::Char('a')).unwrap();
        type_text(&mut app, "psalm");
        app.handle_key(KeyCode::Enter).unwrap();

        app.handle_key(KeyCode::Char('+')).unwrap();
        type_text(&mut app, "Blessed Be");
        app.handle_ctrl_s().unwrap();
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(status(&app), "Song created.");
        assert_eq!(app.library.current_song().unwrap().title, "Blessed Be");

        app.handle_key(KeyCode::Char('-')).unwrap();
        app.handle_key(KeyCode::Char('y')).unwrap();
        let titles: Vec<String> = fetch_songs(&app.conn, &SongFilter::default())
            .unwrap()
            .into_iter()
            .map(|song| song.title)
            .collect();
        assert!(!titles.contains(&"Blessed Be".to_string()));
    }

    #[test]
    fn cancelling_a_form_names_what_was_cancelled() {
        let mut app = app_with_password(Some("psalm"));
        app.session = Some(AdminSession::login(&app.config, "psalm").unwrap());

        app.handle_key(KeyCode::Char('+')).unwrap();
        app.handle_key(KeyCode::Esc).unwrap();
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(status(&app), "Creation cancelled.");

        app.handle_key(KeyCode::Char('e')).unwrap();
        assert!(matches!(app.mode, Mode::EditingSong { .. }));
        app.handle_key(KeyCode::Esc).unwrap();
        assert_eq!(status(&app), "Edit cancelled.");
    }

    #[test]
    fn empty_title_keeps_the_form_open() {
        let mut app = app_with_password(Some("psalm"));
        app.session = Some(AdminSession::login(&app.config, "psalm").unwrap());
        app.handle_key(KeyCode::Char('+')).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();
        match &app.mode {
            Mode::CreatingSong(form) => {
                assert_eq!(form.error.as_deref(), Some("Song title is required."))
            }
            _ => panic!("form should stay open"),
        }
    }
}
