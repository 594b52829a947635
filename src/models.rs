//! Domain models shared by the store, the renderer and the TUI. Field names
//! serialize in camelCase so exported JSON matches the song record layout the
//! admin tooling has always produced.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when stored or user-supplied text does not name a known variant.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} \"{value}\"")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Implements `as_str`, `Display`, `FromStr` and an `ALL` list for a plain
/// enum whose variants map one-to-one onto lowercase names.
macro_rules! named_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($name => Ok($ty::$variant),)+
                    _ => Err(ParseEnumError::new($kind, s)),
                }
            }
        }
    };
}

/// Language a song is primarily sung in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Tamil,
    Kannada,
    Hindi,
    Telugu,
    Malayalam,
    Other,
}

named_enum!(Language, "language", {
    English => "english",
    Tamil => "tamil",
    Kannada => "kannada",
    Hindi => "hindi",
    Telugu => "telugu",
    Malayalam => "malayalam",
    Other => "other",
});

impl Language {
    /// Capitalized label for headers and filter chips.
    pub fn label(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Tamil => "Tamil",
            Language::Kannada => "Kannada",
            Language::Hindi => "Hindi",
            Language::Telugu => "Telugu",
            Language::Malayalam => "Malayalam",
            Language::Other => "Other",
        }
    }
}

/// Written form of a lyric variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    #[default]
    Original,
    Transliteration,
}

named_enum!(Script, "script", {
    Original => "original",
    Transliteration => "transliteration",
});

/// Difficulty of a single chord chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChordDifficulty {
    #[default]
    Easy,
    Advanced,
}

named_enum!(ChordDifficulty, "chord difficulty", {
    Easy => "easy",
    Advanced => "advanced",
});

/// Overall difficulty tag of a song, used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SongDifficulty {
    Easy,
    Advanced,
    #[default]
    Mixed,
}

named_enum!(SongDifficulty, "difficulty", {
    Easy => "easy",
    Advanced => "advanced",
    Mixed => "mixed",
});

/// One body of lyrics in a given language and script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricVariant {
    pub language: String,
    #[serde(default)]
    pub script: Script,
    pub body: String,
}

/// One complete chord chart. Older records carry no `language` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordSet {
    pub difficulty: ChordDifficulty,
    pub key: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Download links for slide decks, one per language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PptUrls {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tamil: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kannada: Option<String>,
}

impl PptUrls {
    pub fn is_empty(&self) -> bool {
        self.english.is_none() && self.tamil.is_none() && self.kannada.is_none()
    }
}

/// A full song record with every lyric variant and chord chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    /// Store primary key. Zero until the record has been saved.
    #[serde(default)]
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    pub primary_language: Language,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub difficulty: SongDifficulty,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub lyric_variants: Vec<LyricVariant>,
    #[serde(default)]
    pub chord_sets: Vec<ChordSet>,
    #[serde(default)]
    pub is_tamil_with_tanglish: bool,
    #[serde(default)]
    pub is_kannada_with_english: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_url: Option<String>,
    #[serde(default, skip_serializing_if = "PptUrls::is_empty")]
    pub ppt_urls: PptUrls,
    #[serde(default)]
    pub views: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Song {
    /// `Title - Artist`, or just the title when no artist is recorded.
    pub fn display_title(&self) -> String {
        match self.artist.as_deref().map(str::trim) {
            Some(artist) if !artist.is_empty() => format!("{} - {}", self.title, artist),
            _ => self.title.clone(),
        }
    }

    /// Key of the first chord chart, if any.
    pub fn key(&self) -> Option<&str> {
        self.chord_sets.first().map(|set| set.key.as_str())
    }
}

/// Lightweight row used by list screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongSummary {
    pub id: i64,
    pub title: String,
    pub artist: Option<String>,
    pub primary_language: Language,
    pub categories: Vec<String>,
    pub difficulty: SongDifficulty,
    pub views: i64,
    pub created_at: Option<String>,
}

impl SongSummary {
    pub fn display_title(&self) -> String {
        match self.artist.as_deref().map(str::trim) {
            Some(artist) if !artist.is_empty() => format!("{} - {}", self.title, artist),
            _ => self.title.clone(),
        }
    }
}

impl From<&Song> for SongSummary {
    fn from(song: &Song) -> Self {
        Self {
            id: song.id,
            title: song.title.clone(),
            artist: song.artist.clone(),
            primary_language: song.primary_language,
            categories: song.categories.clone(),
            difficulty: song.difficulty,
            views: song.views,
            created_at: song.created_at.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_record_json() {
        let json = r#"{
            "title": "Nandri",
            "primaryLanguage": "tamil",
            "isTamilWithTanglish": true,
            "lyricVariants": [
                { "language": "tamil", "body": "..." },
                { "language": "tamil", "script": "transliteration", "body": "Nandri" }
            ],
            "chordSets": [
                { "difficulty": "easy", "key": "G", "body": "G  C  D" },
                { "difficulty": "easy", "key": "G", "body": "G  C  D", "language": "tanglish" }
            ]
        }"#;
        let song: Song = serde_json::from_str(json).unwrap();
        assert_eq!(song.id, 0);
        assert_eq!(song.primary_language, Language::Tamil);
        assert_eq!(song.difficulty, SongDifficulty::Mixed);
        assert_eq!(song.lyric_variants[0].script, Script::Original);
        assert_eq!(song.lyric_variants[1].script, Script::Transliteration);
        assert_eq!(song.chord_sets[0].language, None);
        assert_eq!(song.chord_sets[1].language.as_deref(), Some("tanglish"));
        assert!(song.is_tamil_with_tanglish);
    }

    #[test]
    fn serializes_camel_case_without_empty_optionals() {
        let song = Song {
            title: "Arise".to_string(),
            chord_sets: vec![ChordSet {
                difficulty: ChordDifficulty::Advanced,
                key: "C".to_string(),
                body: "Cmaj7".to_string(),
                language: None,
            }],
            ..Song::default()
        };
        let value = serde_json::to_value(&song).unwrap();
        assert_eq!(value["primaryLanguage"], "english");
        assert_eq!(value["chordSets"][0]["difficulty"], "advanced");
        assert!(value["chordSets"][0].get("language").is_none());
        assert!(value.get("pptUrls").is_none());
        assert!(value.get("artist").is_none());
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("Kannada".parse::<Language>(), Ok(Language::Kannada));
        assert_eq!(" mixed ".parse::<SongDifficulty>(), Ok(SongDifficulty::Mixed));
        assert_eq!("transliteration".parse::<Script>(), Ok(Script::Transliteration));
        let err = "klingon".parse::<Language>().unwrap_err();
        assert_eq!(err.to_string(), "unknown language \"klingon\"");
    }

    #[test]
    fn display_title_skips_blank_artist() {
        let mut song = Song {
            title: "Arise and Sing".to_string(),
            ..Song::default()
        };
        assert_eq!(song.display_title(), "Arise and Sing");
        song.artist = Some("  ".to_string());
        assert_eq!(song.display_title(), "Arise and Sing");
        song.artist = Some("Arise Worship Collective".to_string());
        assert_eq!(song.display_title(), "Arise and Sing - Arise Worship Collective");
    }
}
