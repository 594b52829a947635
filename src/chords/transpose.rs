use std::fmt;

use super::pitch::parse_chord;
use super::tokenizer::tokenize_line;

/// Transpose a single chord token by `steps` semitones.
///
/// Tokens that do not start with a recognizable root come back unchanged, as
/// do empty or blank strings. Output roots are always spelled with sharps and
/// the quality suffix is copied verbatim.
pub fn transpose_chord(chord: &str, steps: i32) -> String {
    if chord.trim().is_empty() {
        return chord.to_string();
    }

    let parsed = parse_chord(chord);
    let Some(root) = parsed.root else {
        return chord.to_string();
    };

    let mut out = format!("{}{}", root.shift(steps), parsed.suffix);
    if let Some(bass) = parsed.bass {
        out.push('/');
        match bass.root {
            Some(bass_root) => {
                out.push_str(bass_root.shift(steps).name());
                out.push_str(&bass.suffix);
            }
            None => out.push_str(&bass.suffix),
        }
    }
    out
}

/// Transpose every chord token found in `line`.
///
/// Replacements run from the rightmost token to the leftmost so earlier byte
/// offsets stay valid. A replacement narrower than the token it replaces is
/// padded with spaces to keep the following chords in their columns; a wider
/// one is inserted whole and pushes the rest of the line to the right.
pub fn transpose_line(line: &str, steps: i32) -> String {
    if steps == 0 || line.trim().is_empty() {
        return line.to_string();
    }

    let mut result = line.to_string();
    for token in tokenize_line(line).iter().rev() {
        let mut replacement = transpose_chord(&token.text, steps);
        let original_width = token.text.chars().count();
        let width = replacement.chars().count();
        if width < original_width {
            replacement.push_str(&" ".repeat(original_width - width));
        }
        result.replace_range(token.offset..token.end(), &replacement);
    }
    result
}

/// Transpose a multi-line chart body, keeping its line breaks as they were.
pub fn transpose_body(body: &str, steps: i32) -> String {
    if steps == 0 {
        return body.to_string();
    }
    body.split('\n')
        .map(|line| match line.strip_suffix('\r') {
            Some(stripped) => format!("{}\r", transpose_line(stripped, steps)),
            None => transpose_line(line, steps),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Transpose amount as shown to the viewer, kept within `-11..=11`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransposeOffset(i32);

impl TransposeOffset {
    /// Fold any step count into `-11..=11`, keeping the direction the user
    /// moved in. Twelve steps up is the same chart, so it reads as `0`.
    pub fn new(steps: i32) -> Self {
        Self(steps % 12)
    }

    pub fn steps(self) -> i32 {
        self.0
    }

    pub fn up(self) -> Self {
        Self::new(self.0 + 1)
    }

    pub fn down(self) -> Self {
        Self::new(self.0 - 1)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TransposeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 > 0 {
            write!(f, "+{}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transposes_simple_roots() {
        assert_eq!(transpose_chord("C", 2), "D");
        assert_eq!(transpose_chord("G", -1), "F#");
        assert_eq!(transpose_chord("Bb", 1), "B");
        assert_eq!(transpose_chord("B", 1), "C");
    }

    #[test]
    fn keeps_suffix_verbatim() {
        assert_eq!(transpose_chord("Dbmaj7", 2), "D#maj7");
        assert_eq!(transpose_chord("Am7", 3), "Cm7");
        assert_eq!(transpose_chord("Gsus4", 5), "Csus4");
    }

    #[test]
    fn transposes_slash_chords() {
        assert_eq!(transpose_chord("G/B", 2), "A/C#");
        assert_eq!(transpose_chord("D/F#", -2), "C/E");
    }

    #[test]
    fn punctuation_after_a_bass_note_stays_literal() {
        assert_eq!(transpose_line("G/B|C", 2), "A/C#|C");
        assert_eq!(transpose_line("D/F#-G", 2), "E/G#-G");
    }

    #[test]
    fn keeps_unrecognized_bass_text() {
        assert_eq!(transpose_chord("C/x", 2), "D/x");
    }

    #[test]
    fn non_chords_pass_through() {
        for steps in [-13, -1, 0, 1, 7, 25] {
            assert_eq!(transpose_chord("Hello", steps), "Hello");
        }
        assert_eq!(transpose_chord("", 3), "");
        assert_eq!(transpose_chord("   ", 3), "   ");
        assert_eq!(transpose_chord("Cb", 3), "Cb");
    }

    #[test]
    fn negative_steps_use_floored_modulo() {
        assert_eq!(transpose_chord("C", -1), "B");
        assert_eq!(transpose_chord("C", -13), "B");
        assert_eq!(transpose_chord("E", -26), "D");
    }

    #[test]
    fn round_trip_restores_sharp_spelled_chords() {
        let chords = ["C", "C#m7", "D/F#", "Ebmaj7", "G#dim", "A#sus2/C", "Bm"];
        for chord in chords {
            let normalized = transpose_chord(chord, 0);
            for steps in -14..=14 {
                let there = transpose_chord(&normalized, steps);
                assert_eq!(transpose_chord(&there, -steps), normalized, "{chord} by {steps}");
            }
        }
    }

    #[test]
    fn zero_steps_leave_the_line_identical() {
        for line in ["C    F    G", "Bb  Eb/G  F", "  Amazing grace  ", ""] {
            assert_eq!(transpose_line(line, 0), line);
        }
    }

    #[test]
    fn keeps_columns_when_chords_do_not_grow() {
        let line = "C    F    G";
        let shifted = transpose_line(line, 2);
        assert_eq!(shifted, "D    G    A");
        let before: Vec<usize> = tokenize_line(line).iter().map(|m| m.offset).collect();
        let after: Vec<usize> = tokenize_line(&shifted).iter().map(|m| m.offset).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn pads_shorter_replacements() {
        assert_eq!(transpose_line("Bb   Eb", 1), "B    E ");
        assert_eq!(transpose_line("C#m  G", 1), "Dm   G#");
    }

    #[test]
    fn wider_replacements_push_the_line_right() {
        let shifted = transpose_line("C    F    G", 1);
        assert_eq!(shifted, "C#    F#    G#");
        assert_eq!(shifted.len(), "C    F    G".len() + 3);
    }

    #[test]
    fn transposes_every_line_of_a_body() {
        let body = "Verse 1\nC    G\nAmazing grace\r\nF    C\r\n";
        assert_eq!(
            transpose_body(body, 2),
            "Verse 1\nD    A\nAmazing grace\r\nG    D\r\n"
        );
    }

    #[test]
    fn offset_normalizes_and_labels() {
        assert_eq!(TransposeOffset::new(13).steps(), 1);
        assert_eq!(TransposeOffset::new(-14).steps(), -2);
        assert_eq!(TransposeOffset::new(12).steps(), 0);
        assert_eq!(TransposeOffset::new(1).to_string(), "+1");
        assert_eq!(TransposeOffset::new(-2).to_string(), "-2");
        assert_eq!(TransposeOffset::new(0).to_string(), "0");
        assert_eq!(TransposeOffset::new(11).up(), TransposeOffset::new(0));
        assert_eq!(TransposeOffset::new(-11).down().steps(), 0);
    }
}
