//! The note buttons of the shown instrument, labelled with their keys.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use sori::{
    instrument::DrumHead,
    router::key_binding,
    Instrument, NoteId,
};

use super::Snapshot;

/// Keys of each page, left to right.
fn page_keys(instrument: Instrument) -> &'static str {
    match instrument {
        Instrument::Piri => "asdfghjk",
        Instrument::Haegeum => "zxcvbnm,",
        Instrument::Janggu => "qweiop",
    }
}

pub fn render_keys(frame: &mut Frame, area: Rect, state: &Snapshot) {
    let title = match (state.loading, state.loaded_samples) {
        (true, _) => format!(" {} (loading samples...) ", state.page),
        (false, 0) => format!(" {} (samples load on first key) ", state.page),
        (false, n) => format!(" {} ({n} samples, {} voices) ", state.page, state.voices),
    };
    let outer = Block::default().title(title).borders(Borders::ALL);
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let buttons: Vec<(char, NoteId)> = page_keys(state.page)
        .chars()
        .filter_map(|key| key_binding(key).map(|(_, note)| (key, note)))
        .collect();
    if buttons.is_empty() {
        return;
    }

    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, buttons.len() as u32); buttons.len()])
        .split(inner);

    for ((key, note), cell) in buttons.into_iter().zip(cells.iter()) {
        let lit = state.lit.contains(&note);
        let base = match note {
            NoteId::Percussion(sound) if sound.head() == DrumHead::Left => Color::Blue,
            NoteId::Percussion(_) => Color::Magenta,
            NoteId::Pitch(_) => Color::White,
        };
        let style = if lit {
            Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(base)
        };

        let button = Paragraph::new(vec![
            Line::from(note.to_string()),
            Line::from(format!("[{key}]")),
        ])
        .centered()
        .style(style)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(button, *cell);
    }
}
