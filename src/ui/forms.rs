use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{
    ChordDifficulty, ChordSet, Language, LyricVariant, PptUrls, Script, Song, SongDifficulty,
    SongSummary,
};

/// Fields of the song form in focus order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum SongField {
    #[default]
    Title,
    Artist,
    Language,
    Categories,
    Difficulty,
    SecondaryScript,
    ChordKey,
    YoutubeUrl,
    PptEnglish,
    PptTamil,
    PptKannada,
    Lyrics,
    SecondaryLyrics,
    Chords,
    SecondaryChords,
}

impl SongField {
    pub(crate) const ALL: [SongField; 15] = [
        SongField::Title,
        SongField::Artist,
        SongField::Language,
        SongField::Categories,
        SongField::Difficulty,
        SongField::SecondaryScript,
        SongField::ChordKey,
        SongField::YoutubeUrl,
        SongField::PptEnglish,
        SongField::PptTamil,
        SongField::PptKannada,
        SongField::Lyrics,
        SongField::SecondaryLyrics,
        SongField::Chords,
        SongField::SecondaryChords,
    ];

    fn position(self) -> usize {
        Self::ALL
            .iter()
            .position(|field| *field == self)
            .unwrap_or_default()
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            SongField::Title => "Title",
            SongField::Artist => "Artist",
            SongField::Language => "Language",
            SongField::Categories => "Categories",
            SongField::Difficulty => "Difficulty",
            SongField::SecondaryScript => "Second script",
            SongField::ChordKey => "Key",
            SongField::YoutubeUrl => "YouTube",
            SongField::PptEnglish => "PPT (English)",
            SongField::PptTamil => "PPT (Tamil)",
            SongField::PptKannada => "PPT (Kannada)",
            SongField::Lyrics => "Lyrics",
            SongField::SecondaryLyrics => "Romanized lyrics",
            SongField::Chords => "Chords",
            SongField::SecondaryChords => "Romanized chords",
        }
    }

    /// Body fields take Enter as a newline.
    pub(crate) fn is_multiline(self) -> bool {
        matches!(
            self,
            SongField::Lyrics
                | SongField::SecondaryLyrics
                | SongField::Chords
                | SongField::SecondaryChords
        )
    }

    /// Fields changed with Left/Right/Space instead of typing.
    pub(crate) fn is_choice(self) -> bool {
        matches!(
            self,
            SongField::Language | SongField::Difficulty | SongField::SecondaryScript
        )
    }
}

/// Chord-set tag used for the romanized chart of a two-script song.
fn secondary_chord_tag(language: Language) -> &'static str {
    match language {
        Language::Tamil => "tanglish",
        _ => "english",
    }
}

fn supports_secondary(language: Language) -> bool {
    matches!(language, Language::Tamil | Language::Kannada)
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, offset: isize) -> T {
    let len = all.len() as isize;
    let index = all.iter().position(|item| *item == current).unwrap_or(0) as isize;
    all[(index + offset).rem_euclid(len) as usize]
}

/// Update the entry at `slot` from a form body, clear it when the body was
/// emptied, or append a new entry when nothing was loaded.
fn write_back<T>(
    items: &mut Vec<Option<T>>,
    slot: Option<usize>,
    body: &str,
    update: impl FnOnce(&mut T),
    create: impl FnOnce() -> T,
) {
    let blank = body.trim().is_empty();
    if let Some(entry) = slot.and_then(|slot| items.get_mut(slot)) {
        if blank {
            *entry = None;
            return;
        }
        if let Some(item) = entry {
            update(item);
            return;
        }
    }
    if !blank {
        items.push(Some(create()));
    }
}

/// Positions in the edited record that the form loaded into its body
/// fields. Saving writes back into these and leaves every other lyric
/// variant and chord set alone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct LoadedSlots {
    lyrics: Option<usize>,
    secondary_lyrics: Option<usize>,
    chords: Option<usize>,
    secondary_chords: Option<usize>,
    chord_key: String,
}

/// Form state for creating or editing a song record.
#[derive(Clone, Debug)]
pub(crate) struct SongForm {
    pub(crate) title: String,
    pub(crate) artist: String,
    pub(crate) language: Language,
    pub(crate) categories: String,
    pub(crate) difficulty: SongDifficulty,
    pub(crate) secondary_script: bool,
    pub(crate) chord_key: String,
    pub(crate) youtube_url: String,
    pub(crate) ppt_english: String,
    pub(crate) ppt_tamil: String,
    pub(crate) ppt_kannada: String,
    pub(crate) lyrics: String,
    pub(crate) secondary_lyrics: String,
    pub(crate) chords: String,
    pub(crate) secondary_chords: String,
    pub(crate) active: SongField,
    pub(crate) error: Option<String>,
    loaded: LoadedSlots,
}

impl Default for SongForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            artist: String::new(),
            language: Language::English,
            categories: "worship".to_string(),
            difficulty: SongDifficulty::Mixed,
            secondary_script: false,
            chord_key: "C".to_string(),
            youtube_url: String::new(),
            ppt_english: String::new(),
            ppt_tamil: String::new(),
            ppt_kannada: String::new(),
            lyrics: String::new(),
            secondary_lyrics: String::new(),
            chords: String::new(),
            secondary_chords: String::new(),
            active: SongField::Title,
            error: None,
            loaded: LoadedSlots::default(),
        }
    }
}

impl SongForm {
    /// Populate the form from an existing record. Untagged charts from older
    /// records fill the chord fields by position.
    pub(crate) fn from_song(song: &Song) -> Self {
        let language = song.primary_language;
        let primary = language.as_str();
        let secondary_script = song.secondary_script().is_some();

        let lyrics_slot = song
            .lyric_variants
            .iter()
            .position(|variant| variant.language == primary && variant.script == Script::Original)
            .or_else(|| {
                song.lyric_variants
                    .iter()
                    .position(|variant| variant.language == primary)
            });
        let secondary_lyrics_slot = song
            .lyric_variants
            .iter()
            .position(|variant| {
                variant.language == primary && variant.script == Script::Transliteration
            })
            .filter(|slot| secondary_script && Some(*slot) != lyrics_slot);

        let untagged: Vec<usize> = song
            .chord_sets
            .iter()
            .enumerate()
            .filter(|(_, set)| set.language.is_none() && set.difficulty == ChordDifficulty::Easy)
            .map(|(slot, _)| slot)
            .collect();
        let chords_slot = song
            .chord_sets
            .iter()
            .position(|set| set.language.as_deref() == Some(primary))
            .or_else(|| untagged.first().copied());
        let secondary_chords_slot = song
            .chord_sets
            .iter()
            .position(|set| set.language.as_deref() == Some(secondary_chord_tag(language)))
            .or_else(|| untagged.get(1).copied())
            .filter(|slot| secondary_script && Some(*slot) != chords_slot);

        let lyric_body = |slot: Option<usize>| {
            slot.map(|slot| song.lyric_variants[slot].body.clone())
                .unwrap_or_default()
        };
        let chord_body = |slot: Option<usize>| {
            slot.map(|slot| song.chord_sets[slot].body.clone())
                .unwrap_or_default()
        };
        let chord_key = chords_slot
            .or(secondary_chords_slot)
            .map(|slot| song.chord_sets[slot].key.clone())
            .or_else(|| song.key().map(str::to_string))
            .unwrap_or_else(|| "C".to_string());

        Self {
            title: song.title.clone(),
            artist: song.artist.clone().unwrap_or_default(),
            language,
            categories: song.categories.join(", "),
            difficulty: song.difficulty,
            secondary_script,
            chord_key: chord_key.clone(),
            youtube_url: song.youtube_url.clone().unwrap_or_default(),
            ppt_english: song.ppt_urls.english.clone().unwrap_or_default(),
            ppt_tamil: song.ppt_urls.tamil.clone().unwrap_or_default(),
            ppt_kannada: song.ppt_urls.kannada.clone().unwrap_or_default(),
            lyrics: lyric_body(lyrics_slot),
            secondary_lyrics: lyric_body(secondary_lyrics_slot),
            chords: chord_body(chords_slot),
            secondary_chords: chord_body(secondary_chords_slot),
            active: SongField::Title,
            error: None,
            loaded: LoadedSlots {
                lyrics: lyrics_slot,
                secondary_lyrics: secondary_lyrics_slot,
                chords: chords_slot,
                secondary_chords: secondary_chords_slot,
                chord_key,
            },
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = SongField::ALL[(self.active.position() + 1) % SongField::ALL.len()];
    }

    pub(crate) fn previous_field(&mut self) {
        let len = SongField::ALL.len();
        self.active = SongField::ALL[(self.active.position() + len - 1) % len];
    }

    fn text_mut(&mut self, field: SongField) -> Option<&mut String> {
        match field {
            SongField::Title => Some(&mut self.title),
            SongField::Artist => Some(&mut self.artist),
            SongField::Categories => Some(&mut self.categories),
            SongField::ChordKey => Some(&mut self.chord_key),
            SongField::YoutubeUrl => Some(&mut self.youtube_url),
            SongField::PptEnglish => Some(&mut self.ppt_english),
            SongField::PptTamil => Some(&mut self.ppt_tamil),
            SongField::PptKannada => Some(&mut self.ppt_kannada),
            SongField::Lyrics => Some(&mut self.lyrics),
            SongField::SecondaryLyrics => Some(&mut self.secondary_lyrics),
            SongField::Chords => Some(&mut self.chords),
            SongField::SecondaryChords => Some(&mut self.secondary_chords),
            SongField::Language | SongField::Difficulty | SongField::SecondaryScript => None,
        }
    }

    pub(crate) fn text(&self, field: SongField) -> String {
        match field {
            SongField::Title => self.title.clone(),
            SongField::Artist => self.artist.clone(),
            SongField::Language => self.language.label().to_string(),
            SongField::Categories => self.categories.clone(),
            SongField::Difficulty => self.difficulty.as_str().to_string(),
            SongField::SecondaryScript => {
                if !supports_secondary(self.language) {
                    "n/a".to_string()
                } else if self.secondary_script {
                    "yes".to_string()
                } else {
                    "no".to_string()
                }
            }
            SongField::ChordKey => self.chord_key.clone(),
            SongField::YoutubeUrl => self.youtube_url.clone(),
            SongField::PptEnglish => self.ppt_english.clone(),
            SongField::PptTamil => self.ppt_tamil.clone(),
            SongField::PptKannada => self.ppt_kannada.clone(),
            SongField::Lyrics => self.lyrics.clone(),
            SongField::SecondaryLyrics => self.secondary_lyrics.clone(),
            SongField::Chords => self.chords.clone(),
            SongField::SecondaryChords => self.secondary_chords.clone(),
        }
    }

    /// Insert a character into the active field. Space flips choice fields.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        if self.active.is_choice() {
            if ch == ' ' {
                self.cycle_choice(1);
                return true;
            }
            return false;
        }
        match self.text_mut(self.active) {
            Some(value) => {
                value.push(ch);
                true
            }
            None => false,
        }
    }

    /// Enter inside a body field.
    pub(crate) fn push_newline(&mut self) -> bool {
        if !self.active.is_multiline() {
            return false;
        }
        match self.text_mut(self.active) {
            Some(value) => {
                value.push('\n');
                true
            }
            None => false,
        }
    }

    pub(crate) fn backspace(&mut self) {
        if let Some(value) = self.text_mut(self.active) {
            value.pop();
        }
    }

    /// Step a choice field forward or back.
    pub(crate) fn cycle_choice(&mut self, offset: isize) {
        match self.active {
            SongField::Language => {
                self.language = cycle(Language::ALL, self.language, offset);
            }
            SongField::Difficulty => {
                self.difficulty = cycle(SongDifficulty::ALL, self.difficulty, offset);
            }
            SongField::SecondaryScript => {
                if supports_secondary(self.language) {
                    self.secondary_script = !self.secondary_script;
                }
            }
            _ => {}
        }
    }

    /// Build the record to store. `base` is the record being edited: its
    /// id, tags and view count are carried over, the loaded bodies are
    /// updated in place and everything else in it is kept as is.
    pub(crate) fn into_song(&self, base: Option<&Song>) -> Result<Song> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(anyhow!("Song title is required."));
        }

        let language = self.language;
        let primary = language.as_str();
        let flagged = self.secondary_script && supports_secondary(language);
        let key = optional(&self.chord_key).unwrap_or_else(|| "C".to_string());

        let (mut lyric_variants, mut chord_sets, slots): (
            Vec<Option<LyricVariant>>,
            Vec<Option<ChordSet>>,
            LoadedSlots,
        ) = match base {
            Some(base) => (
                base.lyric_variants.iter().cloned().map(Some).collect(),
                base.chord_sets.iter().cloned().map(Some).collect(),
                self.loaded.clone(),
            ),
            None => (Vec::new(), Vec::new(), LoadedSlots::default()),
        };

        write_back(
            &mut lyric_variants,
            slots.lyrics,
            &self.lyrics,
            |variant| {
                variant.language = primary.to_string();
                variant.body = self.lyrics.clone();
            },
            || LyricVariant {
                language: primary.to_string(),
                script: Script::Original,
                body: self.lyrics.clone(),
            },
        );
        if flagged {
            write_back(
                &mut lyric_variants,
                slots.secondary_lyrics,
                &self.secondary_lyrics,
                |variant| {
                    variant.language = primary.to_string();
                    variant.body = self.secondary_lyrics.clone();
                },
                || LyricVariant {
                    language: primary.to_string(),
                    script: Script::Transliteration,
                    body: self.secondary_lyrics.clone(),
                },
            );
        }

        write_back(
            &mut chord_sets,
            slots.chords,
            &self.chords,
            |set| {
                set.key = key.clone();
                set.body = self.chords.clone();
                if set.language.is_some() {
                    set.language = Some(primary.to_string());
                }
            },
            || ChordSet {
                difficulty: ChordDifficulty::Easy,
                key: key.clone(),
                body: self.chords.clone(),
                language: Some(primary.to_string()),
            },
        );
        if flagged {
            let tag = secondary_chord_tag(language);
            let key_changed = self.chord_key.trim() != slots.chord_key;
            write_back(
                &mut chord_sets,
                slots.secondary_chords,
                &self.secondary_chords,
                |set| {
                    if key_changed {
                        set.key = key.clone();
                    }
                    set.body = self.secondary_chords.clone();
                    if set.language.is_some() {
                        set.language = Some(tag.to_string());
                    }
                },
                || ChordSet {
                    difficulty: ChordDifficulty::Easy,
                    key: key.clone(),
                    body: self.secondary_chords.clone(),
                    language: Some(tag.to_string()),
                },
            );
        }

        let lyric_variants: Vec<LyricVariant> = lyric_variants.into_iter().flatten().collect();
        let chord_sets: Vec<ChordSet> = chord_sets.into_iter().flatten().collect();

        let categories = self
            .categories
            .split(',')
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Song {
            id: base.map(|song| song.id).unwrap_or_default(),
            title: title.to_string(),
            artist: optional(&self.artist),
            primary_language: language,
            categories,
            difficulty: self.difficulty,
            tags: base.map(|song| song.tags.clone()).unwrap_or_default(),
            lyric_variants,
            chord_sets,
            is_tamil_with_tanglish: flagged && language == Language::Tamil,
            is_kannada_with_english: flagged && language == Language::Kannada,
            youtube_url: optional(&self.youtube_url),
            ppt_urls: PptUrls {
                english: optional(&self.ppt_english),
                tamil: optional(&self.ppt_tamil),
                kannada: optional(&self.ppt_kannada),
            },
            views: base.map(|song| song.views).unwrap_or_default(),
            created_at: base.and_then(|song| song.created_at.clone()),
            updated_at: None,
        })
    }

    /// Render one summary row of the form. Body fields show their line count.
    pub(crate) fn build_line(&self, field: SongField) -> Line<'static> {
        let is_active = self.active == field;
        let value = self.text(field);

        let display = if field.is_multiline() {
            match value.lines().count() {
                0 => "<empty>".to_string(),
                1 => "1 line".to_string(),
                n => format!("{n} lines"),
            }
        } else if field.is_choice() {
            format!("< {value} >")
        } else if value.is_empty() {
            if field == SongField::Title {
                "<required>".to_string()
            } else {
                "<optional>".to_string()
            }
        } else {
            value
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if display.starts_with('<') && !field.is_choice() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{:>17}: ", field.label())),
            Span::styled(display, style),
        ])
    }
}

/// Masked password prompt for the admin session.
#[derive(Default, Clone)]
pub(crate) struct LoginForm {
    pub(crate) password: String,
    pub(crate) error: Option<String>,
}

impl LoginForm {
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.password.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.password.pop();
    }

    pub(crate) fn masked(&self) -> String {
        "*".repeat(self.password.chars().count())
    }
}

/// State for confirming permanent song deletion.
pub(crate) struct ConfirmSongDelete {
    pub(crate) song: SongSummary,
}
