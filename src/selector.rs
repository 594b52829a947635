//! Chooses which lyric variant and chord chart a viewer sees.
//!
//! Songs in Tamil or Kannada can carry a second, romanized script. The viewer
//! flips between the two with a [`ScriptMode`]; everything here is a pure
//! lookup over the song record so repeated calls always agree.

use crate::models::{ChordSet, Language, LyricVariant, Script, Song};

/// Which written form the viewer asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScriptMode {
    #[default]
    Original,
    Secondary,
}

impl ScriptMode {
    pub fn toggled(self) -> Self {
        match self {
            ScriptMode::Original => ScriptMode::Secondary,
            ScriptMode::Secondary => ScriptMode::Original,
        }
    }
}

/// A second script offered alongside a song's native one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryScript {
    /// Tamil lyrics with a Tanglish (romanized Tamil) alternative.
    Tanglish,
    /// Kannada lyrics with a romanized English alternative.
    KannadaEnglish,
}

impl SecondaryScript {
    /// Chord-set language tag for the requested mode.
    pub fn chord_tag(self, mode: ScriptMode) -> &'static str {
        match (self, mode) {
            (SecondaryScript::Tanglish, ScriptMode::Original) => "tamil",
            (SecondaryScript::Tanglish, ScriptMode::Secondary) => "tanglish",
            (SecondaryScript::KannadaEnglish, ScriptMode::Original) => "kannada",
            (SecondaryScript::KannadaEnglish, ScriptMode::Secondary) => "english",
        }
    }

    /// Toggle label for the requested mode.
    pub fn mode_label(self, mode: ScriptMode) -> &'static str {
        match (self, mode) {
            (SecondaryScript::Tanglish, ScriptMode::Original) => "Tamil",
            (SecondaryScript::Tanglish, ScriptMode::Secondary) => "Tanglish",
            (SecondaryScript::KannadaEnglish, ScriptMode::Original) => "Kannada",
            (SecondaryScript::KannadaEnglish, ScriptMode::Secondary) => "English",
        }
    }
}

impl Song {
    /// The secondary script this song offers. A flag only counts when the
    /// primary language is the language it names.
    pub fn secondary_script(&self) -> Option<SecondaryScript> {
        match self.primary_language {
            Language::Tamil if self.is_tamil_with_tanglish => Some(SecondaryScript::Tanglish),
            Language::Kannada if self.is_kannada_with_english => {
                Some(SecondaryScript::KannadaEnglish)
            }
            _ => None,
        }
    }
}

/// Lyric variant to show, or `None` when the song has no lyrics at all.
pub fn select_lyrics(song: &Song, mode: ScriptMode) -> Option<&LyricVariant> {
    let language = song.primary_language.as_str();
    let script = match (song.secondary_script(), mode) {
        (Some(_), ScriptMode::Secondary) => Script::Transliteration,
        _ => Script::Original,
    };

    song.lyric_variants
        .iter()
        .find(|variant| variant.language == language && variant.script == script)
        .or_else(|| {
            song.lyric_variants
                .iter()
                .find(|variant| variant.language == language)
        })
        .or_else(|| song.lyric_variants.first())
}

/// Chord chart to show, or `None` when the song has no charts.
///
/// Tagged charts are matched by language first. Older records have no tags;
/// for those, two or more untagged charts are read positionally (first for the
/// native script, second for the romanized one) and a lone untagged chart
/// serves both modes.
pub fn select_chord_set(song: &Song, mode: ScriptMode) -> Option<&ChordSet> {
    if let Some(secondary) = song.secondary_script() {
        let target = secondary.chord_tag(mode);
        if let Some(tagged) = song
            .chord_sets
            .iter()
            .find(|set| set.language.as_deref() == Some(target))
        {
            return Some(tagged);
        }

        let untagged: Vec<&ChordSet> = song
            .chord_sets
            .iter()
            .filter(|set| set.language.is_none())
            .collect();
        match untagged.len() {
            0 => {}
            1 => return Some(untagged[0]),
            _ => {
                let index = match mode {
                    ScriptMode::Original => 0,
                    ScriptMode::Secondary => 1,
                };
                return Some(untagged[index]);
            }
        }
    }

    song.chord_sets.first()
}

/// Lyric and chord bodies picked for one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'a> {
    pub lyrics: Option<&'a LyricVariant>,
    pub chords: Option<&'a ChordSet>,
}

pub fn select(song: &Song, mode: ScriptMode) -> Selection<'_> {
    Selection {
        lyrics: select_lyrics(song, mode),
        chords: select_chord_set(song, mode),
    }
}
