//! Status bar: page tabs, metronome, recorder and output level.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use sori::Instrument;

use super::Snapshot;

pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

pub fn render_transport(frame: &mut Frame, area: Rect, state: &Snapshot, stats: &AudioStats) {
    let block = Block::default().title(" sori ").borders(Borders::ALL);

    let mut spans = Vec::new();
    for (i, instrument) in Instrument::ALL.into_iter().enumerate() {
        let style = if instrument == state.page {
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} {} ", i + 1, instrument), style));
        spans.push(Span::raw(" "));
    }

    let (tick, tick_style) = if state.metronome_running {
        ("♩ on ", Style::default().fg(Color::Green))
    } else {
        ("♩ off", Style::default().fg(Color::DarkGray))
    };
    spans.push(Span::styled(format!(" {tick} {:>3} BPM  ", state.tempo.bpm()), tick_style));

    let rec = match (state.recording, state.last_take) {
        (true, _) => Span::styled("● REC  ", Style::default().fg(Color::Red)),
        (false, Some(secs)) => Span::styled(
            format!("take {secs:.1}s  "),
            Style::default().fg(Color::Yellow),
        ),
        (false, None) => Span::styled("no take  ", Style::default().fg(Color::DarkGray)),
    };
    spans.push(rec);

    spans.push(Span::styled(
        format!("{:.1}kHz  ", state.sample_rate / 1000.0),
        Style::default().fg(Color::DarkGray),
    ));
    spans.push(Span::styled(
        format!("Peak: {:.2}  RMS: {:.2}", stats.peak, stats.rms),
        Style::default().fg(Color::Magenta),
    ));

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}
