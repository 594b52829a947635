//! Scanner that finds chord-shaped tokens in a line of chart text.
//!
//! A candidate is a root letter `A-G`, an optional `#`/`b`, an optional
//! quality marker, and then either a run of digits or a `/bass` part that
//! runs to the next whitespace. The token must start at a word boundary and
//! must not run into a following word character. When several readings exist
//! the scanner tries them in a fixed order (accidental before none, qualities
//! in [`QUALITIES`] order, digits before slash forms before nothing) and keeps
//! the first one that ends cleanly.
//!
//! The grammar is deliberately loose: lyric words such as `A` or `Am` are
//! reported as chords too. Charts keep chords on their own lines, so the
//! false positives only matter when someone transposes a lyric line.

/// Quality markers recognized directly after the root, in matching order.
const QUALITIES: [&str; 6] = ["m", "maj", "dim", "aug", "sus", "add"];

/// Location of a chord token within one line. Offsets are byte positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordMatch {
    pub offset: usize,
    pub length: usize,
    pub text: String,
}

impl ChordMatch {
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

fn is_root_letter(byte: u8) -> bool {
    matches!(byte, b'A'..=b'G')
}

/// A token may end at `end` if the next byte cannot extend a word or an
/// accidental.
fn ends_cleanly(bytes: &[u8], end: usize) -> bool {
    match bytes.get(end) {
        None => true,
        Some(&next) => !is_word_byte(next) && next != b'#',
    }
}

/// Candidate end positions for the tail (digits or `/bass`) starting at `pos`,
/// most preferred first. The empty tail is always the last candidate.
fn tail_candidates(bytes: &[u8], pos: usize) -> Vec<usize> {
    let mut ends = Vec::new();

    let digits = bytes[pos..]
        .iter()
        .take_while(|byte| byte.is_ascii_digit())
        .count();
    for len in (1..=digits).rev() {
        ends.push(pos + len);
    }

    if bytes.get(pos) == Some(&b'/') && bytes.get(pos + 1).copied().is_some_and(is_root_letter) {
        // The bass part swallows the rest of the non-whitespace run, so it
        // always ends cleanly and needs no shorter alternatives.
        let run = bytes[pos..]
            .iter()
            .take_while(|byte| !byte.is_ascii_whitespace())
            .count();
        ends.push(pos + run);
    }

    ends.push(pos);
    ends
}

/// Try to read a chord token starting exactly at `start`. Returns its end.
fn match_at(bytes: &[u8], start: usize) -> Option<usize> {
    if !bytes.get(start).copied().is_some_and(is_root_letter) {
        return None;
    }
    let after_letter = start + 1;

    let mut accidental_ends = Vec::with_capacity(2);
    if matches!(bytes.get(after_letter), Some(b'#') | Some(b'b')) {
        accidental_ends.push(after_letter + 1);
    }
    accidental_ends.push(after_letter);

    for root_end in accidental_ends {
        let rest = &bytes[root_end..];
        let quality_ends = QUALITIES
            .iter()
            .filter(|quality| rest.starts_with(quality.as_bytes()))
            .map(|quality| root_end + quality.len())
            .chain(std::iter::once(root_end));

        for quality_end in quality_ends {
            for end in tail_candidates(bytes, quality_end) {
                if ends_cleanly(bytes, end) {
                    return Some(end);
                }
            }
        }
    }
    None
}

/// Scan `line` left to right and collect every chord token.
///
/// Matches come back in increasing offset order and never overlap. Non-ASCII
/// text counts as a word separator, the same as punctuation.
pub fn tokenize_line(line: &str) -> Vec<ChordMatch> {
    let bytes = line.as_bytes();
    let mut matches = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let at_boundary = pos == 0 || !is_word_byte(bytes[pos - 1]);
        if at_boundary {
            if let Some(end) = match_at(bytes, pos) {
                matches.push(ChordMatch {
                    offset: pos,
                    length: end - pos,
                    text: line[pos..end].to_string(),
                });
                pos = end;
                continue;
            }
        }
        pos += 1;
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &str) -> Vec<String> {
        tokenize_line(line).into_iter().map(|m| m.text).collect()
    }

    #[test]
    fn finds_spaced_chords_with_offsets() {
        let matches = tokenize_line("C    F    G");
        let offsets: Vec<usize> = matches.iter().map(|m| m.offset).collect();
        assert_eq!(offsets, vec![0, 5, 10]);
        assert!(matches.iter().all(|m| m.length == 1));
    }

    #[test]
    fn captures_quality_and_extension() {
        assert_eq!(
            texts("Cmaj7  Am7  Gsus4  Cadd9  Bdim  Eaug"),
            vec!["Cmaj7", "Am7", "Gsus4", "Cadd9", "Bdim", "Eaug"]
        );
    }

    #[test]
    fn captures_accidentals() {
        assert_eq!(texts("C#m  Bb  F#  Ebmaj7"), vec!["C#m", "Bb", "F#", "Ebmaj7"]);
    }

    #[test]
    fn captures_slash_chords() {
        assert_eq!(texts("G/B  D/F#  C"), vec!["G/B", "D/F#", "C"]);
    }

    #[test]
    fn slash_bass_runs_to_the_next_whitespace() {
        assert_eq!(texts("G/B|C  D/F#-G  Em"), vec!["G/B|C", "D/F#-G", "Em"]);
    }

    #[test]
    fn quality_with_slash_splits_into_two_tokens() {
        let matches = tokenize_line("Gmaj7/B");
        assert_eq!(
            matches,
            vec![
                ChordMatch {
                    offset: 0,
                    length: 5,
                    text: "Gmaj7".to_string(),
                },
                ChordMatch {
                    offset: 6,
                    length: 1,
                    text: "B".to_string(),
                },
            ]
        );
    }

    #[test]
    fn ignores_words_that_continue_past_the_grammar() {
        assert!(texts("Hello world, Bless the Lord").is_empty());
        assert!(texts("Dm7b5").is_empty());
    }

    #[test]
    fn requires_word_boundary_before_root() {
        assert!(texts("xC yAm").is_empty());
        assert_eq!(texts("(Am) -G-"), vec!["Am", "G"]);
    }

    #[test]
    fn stray_double_sharp_is_not_a_chord() {
        assert!(texts("C##").is_empty());
    }

    #[test]
    fn lyric_words_can_look_like_chords() {
        assert_eq!(texts("A new day"), vec!["A"]);
    }

    #[test]
    fn non_ascii_text_separates_tokens() {
        let line = "Aஅ G";
        let matches = tokenize_line(line);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].text, "A");
        assert_eq!(&line[matches[1].offset..matches[1].end()], "G");
    }

    #[test]
    fn empty_line_has_no_matches() {
        assert!(tokenize_line("").is_empty());
        assert!(tokenize_line("     ").is_empty());
    }
}
