//! Pitch classes and the chord token model. A chord token is split into a
//! root note, a verbatim suffix, and an optional bass note for slash chords.
//! Only the root letters are ever interpreted; everything else in the token is
//! carried through untouched so charts never lose notation we don't understand.

use std::fmt;

/// One of the twelve equal-tempered semitone positions, named with sharps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

/// Canonical cyclic ordering used for semitone arithmetic.
const CHROMATIC: [PitchClass; 12] = [
    PitchClass::C,
    PitchClass::CSharp,
    PitchClass::D,
    PitchClass::DSharp,
    PitchClass::E,
    PitchClass::F,
    PitchClass::FSharp,
    PitchClass::G,
    PitchClass::GSharp,
    PitchClass::A,
    PitchClass::ASharp,
    PitchClass::B,
];

impl PitchClass {
    /// Resolve a note spelling (`"C"`, `"F#"`, `"Bb"`, ...) into a pitch class.
    /// Flats are folded onto their sharp equivalent. Spellings outside the
    /// twelve sharp names and five common flats (`Cb`, `E#`, ...) are rejected.
    pub fn from_name(name: &str) -> Option<Self> {
        let pitch = match name {
            "C" => PitchClass::C,
            "C#" | "Db" => PitchClass::CSharp,
            "D" => PitchClass::D,
            "D#" | "Eb" => PitchClass::DSharp,
            "E" => PitchClass::E,
            "F" => PitchClass::F,
            "F#" | "Gb" => PitchClass::FSharp,
            "G" => PitchClass::G,
            "G#" | "Ab" => PitchClass::GSharp,
            "A" => PitchClass::A,
            "A#" | "Bb" => PitchClass::ASharp,
            "B" => PitchClass::B,
            _ => return None,
        };
        Some(pitch)
    }

    /// Position within the chromatic scale, `0` for C through `11` for B.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Self {
        CHROMATIC[index % CHROMATIC.len()]
    }

    /// Move by `steps` semitones, wrapping in either direction.
    pub fn shift(self, steps: i32) -> Self {
        let len = CHROMATIC.len() as i32;
        let target = (self.index() as i32 + steps.rem_euclid(len)).rem_euclid(len);
        Self::from_index(target as usize)
    }

    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A chord token broken into its parts. `root == None` marks literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedChord {
    pub root: Option<PitchClass>,
    pub suffix: String,
    pub bass: Option<Box<ParsedChord>>,
}

impl ParsedChord {
    fn literal(token: &str) -> Self {
        Self {
            root: None,
            suffix: token.to_string(),
            bass: None,
        }
    }

    pub fn is_chord(&self) -> bool {
        self.root.is_some()
    }
}

/// Split the leading `A-G` letter plus optional `#`/`b` from the rest.
fn split_root(token: &str) -> Option<(&str, &str)> {
    let mut chars = token.char_indices();
    let (_, letter) = chars.next()?;
    if !matches!(letter, 'A'..='G') {
        return None;
    }
    let root_end = match chars.next() {
        Some((idx, '#' | 'b')) => idx + 1,
        Some((idx, _)) => idx,
        None => token.len(),
    };
    Some(token.split_at(root_end))
}

/// Parse a single root+suffix piece without looking for a slash.
fn parse_simple(token: &str) -> ParsedChord {
    let trimmed = token.trim();
    match split_root(trimmed) {
        Some((root, suffix)) => match PitchClass::from_name(root) {
            Some(pitch) => ParsedChord {
                root: Some(pitch),
                suffix: suffix.to_string(),
                bass: None,
            },
            None => ParsedChord::literal(token),
        },
        None => ParsedChord::literal(token),
    }
}

/// Parse a chord token such as `Dbmaj7`, `C#m` or `G/B`.
///
/// Only the first `/` separates the bass note; anything after a second slash
/// stays in the bass suffix. The bass is parsed independently, so `C/x`
/// yields a chord whose bass has no root.
pub fn parse_chord(token: &str) -> ParsedChord {
    let (main, bass) = match token.split_once('/') {
        Some((main, bass)) => (main, Some(bass)),
        None => (token, None),
    };

    let mut parsed = parse_simple(main);
    if !parsed.is_chord() {
        return ParsedChord::literal(token);
    }
    if let Some(bass) = bass {
        parsed.bass = Some(Box::new(parse_simple(bass.trim())));
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flats_fold_onto_sharps() {
        assert_eq!(PitchClass::from_name("Db"), Some(PitchClass::CSharp));
        assert_eq!(PitchClass::from_name("Eb"), Some(PitchClass::DSharp));
        assert_eq!(PitchClass::from_name("Gb"), Some(PitchClass::FSharp));
        assert_eq!(PitchClass::from_name("Ab"), Some(PitchClass::GSharp));
        assert_eq!(PitchClass::from_name("Bb"), Some(PitchClass::ASharp));
    }

    #[test]
    fn unusual_spellings_are_not_pitch_classes() {
        for name in ["Cb", "Fb", "E#", "B#", "H", ""] {
            assert_eq!(PitchClass::from_name(name), None, "{name}");
        }
    }

    #[test]
    fn shift_wraps_both_directions() {
        assert_eq!(PitchClass::B.shift(1), PitchClass::C);
        assert_eq!(PitchClass::C.shift(-1), PitchClass::B);
        assert_eq!(PitchClass::G.shift(-13), PitchClass::FSharp);
        assert_eq!(PitchClass::A.shift(24), PitchClass::A);
        assert_eq!(PitchClass::E.shift(i32::MIN), PitchClass::E.shift(i32::MIN % 12));
    }

    #[test]
    fn parses_root_and_suffix() {
        let chord = parse_chord("Dbmaj7");
        assert_eq!(chord.root, Some(PitchClass::CSharp));
        assert_eq!(chord.suffix, "maj7");
        assert!(chord.bass.is_none());

        let chord = parse_chord("F#m");
        assert_eq!(chord.root, Some(PitchClass::FSharp));
        assert_eq!(chord.suffix, "m");
    }

    #[test]
    fn parses_slash_chord_bass() {
        let chord = parse_chord("G/B");
        assert_eq!(chord.root, Some(PitchClass::G));
        let bass = chord.bass.expect("bass note");
        assert_eq!(bass.root, Some(PitchClass::B));
        assert_eq!(bass.suffix, "");
    }

    #[test]
    fn second_slash_stays_in_bass_suffix() {
        let chord = parse_chord("C/E/G");
        let bass = chord.bass.expect("bass note");
        assert_eq!(bass.root, Some(PitchClass::E));
        assert_eq!(bass.suffix, "/G");
    }

    #[test]
    fn unrecognized_tokens_are_literal() {
        let chord = parse_chord("Hello");
        assert_eq!(chord.root, None);
        assert_eq!(chord.suffix, "Hello");

        let chord = parse_chord("Cb");
        assert_eq!(chord.root, None);
        assert_eq!(chord.suffix, "Cb");
    }

    #[test]
    fn unrecognized_bass_has_no_root() {
        let chord = parse_chord("C/x");
        assert_eq!(chord.root, Some(PitchClass::C));
        let bass = chord.bass.expect("bass part");
        assert_eq!(bass.root, None);
        assert_eq!(bass.suffix, "x");
    }
}
