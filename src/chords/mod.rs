//! Chord chart text handling: token parsing, transposition and highlighting.
//! Everything here is a pure function of its inputs.

mod highlight;
mod pitch;
mod tokenizer;
mod transpose;

pub use highlight::{highlight_line, Segment, SegmentKind};
pub use pitch::{parse_chord, ParsedChord, PitchClass};
pub use tokenizer::{tokenize_line, ChordMatch};
pub use transpose::{transpose_body, transpose_chord, transpose_line, TransposeOffset};
