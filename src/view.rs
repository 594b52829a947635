//! One render pass over a song: pick the bodies, transpose the chart, split
//! it into highlighted lines, and apply the viewer's density setting.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::chords::{highlight_line, transpose_body, Segment, TransposeOffset};
use crate::models::{ParseEnumError, Song};
use crate::selector::{select, ScriptMode};

/// Vertical spacing applied to rendered bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayDensity {
    Compact,
    #[default]
    Normal,
    Spacious,
}

impl DisplayDensity {
    pub fn next(self) -> Self {
        match self {
            DisplayDensity::Compact => DisplayDensity::Normal,
            DisplayDensity::Normal => DisplayDensity::Spacious,
            DisplayDensity::Spacious => DisplayDensity::Compact,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DisplayDensity::Compact => "compact",
            DisplayDensity::Normal => "normal",
            DisplayDensity::Spacious => "spacious",
        }
    }

    /// Apply the spacing rule to a list of lines. Only blank lines are ever
    /// added or removed, so chord rows stay paired with their lyric rows.
    pub fn apply<T, F>(self, lines: Vec<T>, is_blank: F) -> Vec<T>
    where
        T: Clone,
        F: Fn(&T) -> bool,
    {
        match self {
            DisplayDensity::Normal => lines,
            DisplayDensity::Compact => {
                let mut out: Vec<T> = Vec::with_capacity(lines.len());
                let mut previous_blank = true;
                for line in lines {
                    let blank = is_blank(&line);
                    if blank && previous_blank {
                        continue;
                    }
                    previous_blank = blank;
                    out.push(line);
                }
                while out.last().is_some_and(&is_blank) {
                    out.pop();
                }
                out
            }
            DisplayDensity::Spacious => {
                let mut out = Vec::with_capacity(lines.len() * 2);
                for line in lines {
                    if is_blank(&line) {
                        out.push(line.clone());
                    }
                    out.push(line);
                }
                out
            }
        }
    }
}

impl fmt::Display for DisplayDensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayDensity {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(DisplayDensity::Compact),
            "normal" => Ok(DisplayDensity::Normal),
            "spacious" => Ok(DisplayDensity::Spacious),
            _ => Err(ParseEnumError::new("density", s)),
        }
    }
}

/// Viewer-owned settings passed into every render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewSettings {
    pub mode: ScriptMode,
    pub transpose: TransposeOffset,
    pub density: DisplayDensity,
}

/// Display-ready song content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSong {
    /// Highlighted chart rows, or `None` when the song has no chord chart.
    pub chord_lines: Option<Vec<Vec<Segment>>>,
    /// Lyric rows, or `None` when the song has no lyrics.
    pub lyric_lines: Option<Vec<String>>,
    /// Key of the chart in use, as recorded (not transposed).
    pub key: Option<String>,
}

pub const NO_CHORDS_PLACEHOLDER: &str = "No chords available yet.";
pub const NO_LYRICS_PLACEHOLDER: &str = "Lyrics coming soon.";

fn is_blank_row(segments: &[Segment]) -> bool {
    segments.iter().all(|segment| segment.text.trim().is_empty())
}

/// Run the full pipeline for `song` with the viewer's settings.
pub fn render_song(song: &Song, settings: &ViewSettings) -> RenderedSong {
    let selection = select(song, settings.mode);
    log::trace!(
        "rendering song {} mode={:?} transpose={}",
        song.id,
        settings.mode,
        settings.transpose
    );

    let chord_lines = selection
        .chords
        .filter(|set| !set.body.is_empty())
        .map(|set| {
            let body = transpose_body(&set.body, settings.transpose.steps());
            let rows = body
                .lines()
                .map(highlight_line)
                .collect::<Vec<_>>();
            settings.density.apply(rows, |row| is_blank_row(row))
        });

    let lyric_lines = selection
        .lyrics
        .filter(|variant| !variant.body.is_empty())
        .map(|variant| {
            let rows = variant.body.lines().map(str::to_string).collect::<Vec<_>>();
            settings.density.apply(rows, |line: &String| line.trim().is_empty())
        });

    RenderedSong {
        chord_lines,
        lyric_lines,
        key: selection.chords.map(|set| set.key.clone()),
    }
}

/// Plain-text rendering used by the command line: chords, a rule, lyrics.
pub fn render_plain(song: &Song, settings: &ViewSettings) -> String {
    let rendered = render_song(song, settings);
    let mut out = String::new();

    out.push_str(&song.display_title());
    out.push('\n');
    let mut meta = vec![song.primary_language.label().to_string()];
    if let Some(key) = &rendered.key {
        meta.push(format!("Key {key}"));
    }
    meta.push(format!("Transpose {}", settings.transpose));
    if let Some(secondary) = song.secondary_script() {
        meta.push(secondary.mode_label(settings.mode).to_string());
    }
    out.push_str(&meta.join(" · "));
    out.push_str("\n\n");

    match &rendered.chord_lines {
        Some(lines) => {
            for segments in lines {
                for segment in segments {
                    out.push_str(&segment.text);
                }
                out.push('\n');
            }
        }
        None => {
            out.push_str(NO_CHORDS_PLACEHOLDER);
            out.push('\n');
        }
    }

    out.push_str("\n----\n\n");
    match &rendered.lyric_lines {
        Some(lines) => {
            for line in lines {
                out.push_str(line);
                out.push('\n');
            }
        }
        None => {
            out.push_str(NO_LYRICS_PLACEHOLDER);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chords::SegmentKind;
    use crate::models::{ChordDifficulty, ChordSet, Language, LyricVariant, Script};

    fn song() -> Song {
        Song {
            id: 7,
            title: "Arise and Sing".to_string(),
            primary_language: Language::English,
            lyric_variants: vec![LyricVariant {
                language: "english".to_string(),
                script: Script::Original,
                body: "Verse 1\nArise and sing\n\n\nChorus\nHallelujah\n".to_string(),
            }],
            chord_sets: vec![ChordSet {
                difficulty: ChordDifficulty::Easy,
                key: "C".to_string(),
                body: "C    F    G\nArise and sing\n\nF    G    C\nHallelujah".to_string(),
                language: None,
            }],
            ..Song::default()
        }
    }

    fn text(row: &[Segment]) -> String {
        row.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn renders_transposed_highlighted_rows() {
        let settings = ViewSettings {
            transpose: TransposeOffset::new(2),
            ..ViewSettings::default()
        };
        let rendered = render_song(&song(), &settings);
        let rows = rendered.chord_lines.unwrap();
        assert_eq!(text(&rows[0]), "D    G    A");
        assert_eq!(rows[0][0].kind, SegmentKind::Chord);
        assert_eq!(text(&rows[1]), "Arise and sing");
        assert_eq!(rendered.key.as_deref(), Some("C"));
    }

    #[test]
    fn missing_bodies_render_as_none() {
        let rendered = render_song(&Song::default(), &ViewSettings::default());
        assert!(rendered.chord_lines.is_none());
        assert!(rendered.lyric_lines.is_none());
        assert!(rendered.key.is_none());
    }

    #[test]
    fn compact_collapses_blank_runs() {
        let lines = vec!["", "a", "", "", "b", "", ""];
        let out = DisplayDensity::Compact.apply(lines, |l: &&str| l.trim().is_empty());
        assert_eq!(out, vec!["a", "", "b"]);
    }

    #[test]
    fn compact_chart_drops_repeated_blank_rows() {
        let mut song = song();
        song.chord_sets[0].body = "\nC    G\n\n   \n\nAm   F\n\n".to_string();
        let settings = ViewSettings {
            density: DisplayDensity::Compact,
            ..ViewSettings::default()
        };
        let rows = render_song(&song, &settings).chord_lines.unwrap();
        let rows: Vec<String> = rows.iter().map(|row| text(row)).collect();
        assert_eq!(rows, vec!["C    G", "", "Am   F"]);
    }

    #[test]
    fn spacious_doubles_blank_lines_only() {
        let lines = vec!["C  G", "words", "", "F  C"];
        let out = DisplayDensity::Spacious.apply(lines, |l: &&str| l.is_empty());
        assert_eq!(out, vec!["C  G", "words", "", "", "F  C"]);
    }

    #[test]
    fn normal_density_is_identity() {
        let lines = vec!["", "a", "", ""];
        assert_eq!(DisplayDensity::Normal.apply(lines.clone(), |l: &&str| l.is_empty()), lines);
    }

    #[test]
    fn density_parses_and_cycles() {
        assert_eq!("Spacious".parse::<DisplayDensity>(), Ok(DisplayDensity::Spacious));
        assert!("huge".parse::<DisplayDensity>().is_err());
        assert_eq!(DisplayDensity::Spacious.next(), DisplayDensity::Compact);
    }

    #[test]
    fn plain_rendering_uses_placeholders() {
        let empty = Song {
            title: "Untitled".to_string(),
            ..Song::default()
        };
        let out = render_plain(&empty, &ViewSettings::default());
        assert!(out.contains(NO_CHORDS_PLACEHOLDER));
        assert!(out.contains(NO_LYRICS_PLACEHOLDER));
        assert!(out.starts_with("Untitled\nEnglish · Transpose 0"));
    }
}
