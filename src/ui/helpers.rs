use anyhow::Error;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::chords::Segment;

/// Style for chord names inside a chart.
pub(crate) fn chord_style() -> Style {
    Style::default()
        .fg(Color::LightYellow)
        .add_modifier(Modifier::BOLD)
}

/// Convert a highlighted chart row into a styled line.
pub(crate) fn segments_to_line(segments: &[Segment]) -> Line<'static> {
    let spans: Vec<Span<'static>> = segments
        .iter()
        .map(|segment| {
            if segment.is_chord() {
                Span::styled(segment.text.clone(), chord_style())
            } else {
                Span::raw(segment.text.clone())
            }
        })
        .collect();
    Line::from(spans)
}

/// Footer key hints: `[key] Label` pairs separated by spaces.
pub(crate) fn key_hints(hints: &[(&str, &str)]) -> Line<'static> {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (idx, (key, label)) in hints.iter().enumerate() {
        spans.push(Span::styled(format!("[{key}]"), key_style));
        let separator = if idx + 1 == hints.len() { "" } else { "   " };
        spans.push(Span::raw(format!(" {label}{separator}")));
    }
    Line::from(spans)
}

/// Popup area of `percent_x` by `percent_y` of `area`, centered in it.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(row);
    popup
}

/// The innermost cause of a chained error, which is what the user can act on.
pub(crate) fn surface_error(err: &Error) -> String {
    err.root_cause().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chords::highlight_line;
    use anyhow::{anyhow, Context};

    #[test]
    fn chord_segments_are_styled() {
        let line = segments_to_line(&highlight_line("Am7 F"));
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[0].style, chord_style());
        assert_eq!(line.spans[1].style, Style::default());
        assert_eq!(line.spans[1].content, " ");
    }

    #[test]
    fn surfaces_innermost_cause() {
        let err = Err::<(), _>(anyhow!("Song not found"))
            .context("failed to load song")
            .unwrap_err();
        assert_eq!(surface_error(&err), "Song not found");
    }

    #[test]
    fn popup_is_centered() {
        let popup = centered_rect(50, 50, Rect::new(0, 0, 100, 40));
        assert_eq!(popup, Rect::new(25, 10, 50, 20));
    }

    #[test]
    fn hints_alternate_keys_and_labels() {
        let line = key_hints(&[("Enter", "Open"), ("q", "Quit")]);
        let text: String = line.spans.iter().map(|span| span.content.as_ref()).collect();
        assert_eq!(text, "[Enter] Open   [q] Quit");
    }
}
