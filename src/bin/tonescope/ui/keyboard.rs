//! On-screen keyboard strip: one key per note, clickable.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Widget},
};

use tonescope::{
    notes::NOTES,
    synth::VoiceState,
    visual::palette::bin_color,
    Visualizer,
};

/// Note key under the terminal cell `(column, row)`, if any.
pub fn key_at(area: Rect, column: u16, row: u16) -> Option<char> {
    if area.width == 0 || !area.contains((column, row).into()) {
        return None;
    }
    let index = (column - area.x) as usize * NOTES.len() / area.width as usize;
    NOTES.get(index).map(|note| note.key)
}

fn key_rect(area: Rect, index: usize) -> Rect {
    let count = NOTES.len();
    let width = area.width as usize;
    // Same partition key_at inverts
    let start = (index * width).div_ceil(count);
    let end = ((index + 1) * width).div_ceil(count);
    Rect::new(
        area.x + start as u16,
        area.y,
        (end - start) as u16,
        area.height,
    )
}

pub struct KeyboardView<'a> {
    vis: &'a Visualizer,
}

impl<'a> KeyboardView<'a> {
    pub fn new(vis: &'a Visualizer) -> Self {
        Self { vis }
    }
}

impl Widget for KeyboardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (index, note) in NOTES.iter().enumerate() {
            let rect = key_rect(area, index);
            if rect.width == 0 {
                continue;
            }
            let accent = bin_color(index, NOTES.len());
            let accent = Color::Rgb(accent.r, accent.g, accent.b);

            let style = match self.vis.engine().voice(note.key).map(|v| v.state()) {
                Some(VoiceState::Attacking | VoiceState::Sustaining) => {
                    Style::default().fg(Color::Black).bg(accent).add_modifier(Modifier::BOLD)
                }
                Some(VoiceState::Releasing) => Style::default().fg(accent),
                _ => Style::default().fg(Color::Gray),
            };

            let block = Block::default().borders(Borders::ALL).border_style(Style::default().fg(accent));
            Paragraph::new(vec![Line::from(note.key.to_string()), Line::from(note.name)])
                .alignment(Alignment::Center)
                .style(style)
                .block(block)
                .render(rect, buf);
        }
    }
}
