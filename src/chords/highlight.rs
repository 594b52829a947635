use super::tokenizer::tokenize_line;

/// Whether a run of text is a chord or the text around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Plain,
    Chord,
}

/// A slice of a chart line tagged for display emphasis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub kind: SegmentKind,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            kind: SegmentKind::Plain,
        }
    }

    fn chord(text: &str) -> Self {
        Self {
            text: text.to_string(),
            kind: SegmentKind::Chord,
        }
    }

    pub fn is_chord(&self) -> bool {
        self.kind == SegmentKind::Chord
    }
}

/// Split `line` into plain and chord segments. Joining the segment texts gives
/// back the original line byte for byte, whitespace included.
pub fn highlight_line(line: &str) -> Vec<Segment> {
    let matches = tokenize_line(line);
    if matches.is_empty() {
        return vec![Segment::plain(line)];
    }

    let mut segments = Vec::with_capacity(matches.len() * 2 + 1);
    let mut last = 0;
    for token in &matches {
        if token.offset > last {
            segments.push(Segment::plain(&line[last..token.offset]));
        }
        segments.push(Segment::chord(&token.text));
        last = token.end();
    }
    if last < line.len() {
        segments.push(Segment::plain(&line[last..]));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(segments: &[Segment]) -> String {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn splits_chords_and_gaps() {
        assert_eq!(
            highlight_line("Am7 F"),
            vec![Segment::chord("Am7"), Segment::plain(" "), Segment::chord("F")]
        );
    }

    #[test]
    fn keeps_leading_and_trailing_text() {
        let segments = highlight_line("  G/B  (x2)");
        assert_eq!(
            segments,
            vec![
                Segment::plain("  "),
                Segment::chord("G/B"),
                Segment::plain("  (x2)"),
            ]
        );
    }

    #[test]
    fn lines_without_chords_stay_whole() {
        assert_eq!(highlight_line("Amazing grace"), vec![Segment::plain("Amazing grace")]);
        assert_eq!(highlight_line(""), vec![Segment::plain("")]);
        assert_eq!(highlight_line("   "), vec![Segment::plain("   ")]);
    }

    #[test]
    fn segments_reassemble_the_line() {
        let lines = [
            "C              F              G",
            "Cmaj7         Fmaj7          Gsus4         G",
            "In His presence we rejoice",
            "D/F#  Em  A7sus4 - Bbadd9",
            "நீர் A  தேவன் G",
        ];
        for line in lines {
            assert_eq!(joined(&highlight_line(line)), line);
        }
    }

    #[test]
    fn tags_alternate() {
        let segments = highlight_line("C  G  Am  F");
        for pair in segments.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind);
        }
        assert_eq!(segments.iter().filter(|s| s.is_chord()).count(), 4);
    }
}
