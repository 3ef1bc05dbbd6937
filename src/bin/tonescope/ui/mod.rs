//! Terminal layout: visual surface on top, on-screen keyboard, help line.

pub mod keyboard;
pub mod surface;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use tonescope::{AudioStatus, FrameStatus, Visualizer};

use keyboard::KeyboardView;
use surface::SurfaceView;

/// Screen regions, recomputed from the terminal size every frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct Areas {
    pub visual_block: Rect,
    /// Inside the visual block's border; this is what the surface fills.
    pub visual: Rect,
    pub keyboard: Rect,
    pub help: Rect,
}

pub fn layout(area: Rect) -> Areas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(4),    // Visual
            Constraint::Length(4), // Keyboard
            Constraint::Length(1), // Help bar
        ])
        .split(area);

    let visual_block = chunks[0];
    Areas {
        visual_block,
        visual: Block::default().borders(Borders::ALL).inner(visual_block),
        keyboard: chunks[1],
        help: chunks[2],
    }
}

pub fn render(frame: &mut Frame, areas: &Areas, vis: &Visualizer, status: FrameStatus) {
    let title = format!(
        " tonescope · {} · audio {} · {} voice(s) ",
        vis.mode(),
        audio_label(vis.engine().status()),
        vis.engine().active_voices(),
    );
    frame.render_widget(
        Block::default().title(title).borders(Borders::ALL),
        areas.visual_block,
    );

    match (status, vis.surface()) {
        (FrameStatus::Drawn(_), Some(canvas)) => {
            frame.render_widget(SurfaceView::new(canvas), areas.visual);
        }
        _ => {
            let note = Paragraph::new(" (terminal too small) ")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(note, areas.visual);
        }
    }

    frame.render_widget(KeyboardView::new(vis), areas.keyboard);

    let help = Paragraph::new(
        " [a-l] Play  [1-4/Tab] Mode  [Space] All off  [Q] Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, areas.help);
}

fn audio_label(status: AudioStatus) -> &'static str {
    match status {
        AudioStatus::Uninitialized => "idle (press a key)",
        AudioStatus::Suspended => "suspended",
        AudioStatus::Running => "running",
        AudioStatus::Unavailable => "off",
        AudioStatus::Closed => "closed",
    }
}
