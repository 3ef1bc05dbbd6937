//! Event loop: one visualizer tick per frame, terminal events in between.

use color_eyre::eyre::Result as EyreResult;
use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        MouseButton, MouseEvent, MouseEventKind, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::supports_keyboard_enhancement,
};
use ratatui::{layout::Rect, DefaultTerminal};
use std::io;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use tonescope::{input::InputEvent, notes, Config, VisualMode, Visualizer};

use crate::ui::{self, keyboard, surface};

pub struct App {
    vis: Visualizer,
    frame_period: Duration,
    hold_fallback: f64,
    areas: ui::Areas,
    should_quit: bool,
}

impl App {
    pub fn new(vis: Visualizer, config: &Config) -> Self {
        Self {
            vis,
            frame_period: Duration::from_secs_f64(1.0 / config.visual.fps.max(1) as f64),
            hold_fallback: config.input.fallback_hold_secs(),
            areas: ui::Areas::default(),
            should_quit: false,
        }
    }

    /// Run until the user quits. Restores terminal input modes on exit.
    pub fn run(mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        let enhanced = enable_input_modes()?;
        if enhanced {
            info!("terminal reports key releases");
        } else {
            info!(hold = self.hold_fallback, "no key release events, using hold fallback");
            self.vis.set_hold_fallback(Some(self.hold_fallback));
        }

        let result = self.event_loop(terminal);
        self.vis.shutdown();
        disable_input_modes(enhanced);
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        let mut last = Instant::now();
        while !self.should_quit {
            let size = terminal.size()?;
            self.areas = ui::layout(Rect::new(0, 0, size.width, size.height));
            self.sync_surface();

            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f64();
            last = now;
            let status = self.vis.tick(dt);

            terminal.draw(|frame| ui::render(frame, &self.areas, &self.vis, status))?;

            // Handle input until the next frame is due
            let deadline = now + self.frame_period;
            while let Some(timeout) = deadline.checked_duration_since(Instant::now()) {
                if !event::poll(timeout)? {
                    break;
                }
                self.handle_event(event::read()?);
                if self.should_quit {
                    break;
                }
            }
        }
        Ok(())
    }

    fn sync_surface(&mut self) {
        let (width, height) = surface::pixel_size(self.areas.visual);
        match self.vis.surface() {
            Some(canvas) if canvas.width() == width && canvas.height() == height => {}
            Some(_) => self.vis.resize(width, height),
            None => self.vis.attach_surface(width, height),
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            // Releases may never arrive once focus is gone
            Event::FocusLost => self.vis.all_notes_off(),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match (key.kind, key.code) {
            (KeyEventKind::Release, KeyCode::Char(c)) => {
                self.vis.input(InputEvent::KeyUp { key: c });
            }
            (KeyEventKind::Release, _) => {}
            (kind, KeyCode::Char(c)) if notes::lookup(c).is_some() => {
                self.vis.input(InputEvent::KeyDown {
                    key: c,
                    repeat: kind == KeyEventKind::Repeat,
                });
            }
            (KeyEventKind::Press, code) => self.handle_command(code),
            _ => {}
        }
    }

    fn handle_command(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(digit @ '1'..='4') => {
                let index = digit as usize - '1' as usize;
                self.vis.set_mode(VisualMode::ALL[index]);
            }
            KeyCode::Tab => {
                let next = self.vis.mode().next();
                self.vis.set_mode(next);
            }
            KeyCode::Char(' ') => self.vis.all_notes_off(),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let key = keyboard::key_at(self.areas.keyboard, mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(key) = key {
                    self.vis.input(InputEvent::PointerDown { key });
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let current = self.vis.router().pointer_key();
                if key != current {
                    if current.is_some() {
                        self.vis.input(InputEvent::PointerLeave);
                    }
                    if let Some(key) = key {
                        self.vis.input(InputEvent::PointerDown { key });
                    }
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.vis.input(InputEvent::PointerUp);
            }
            _ => {}
        }
    }
}

/// Mouse capture, focus reporting and, where the terminal supports it, key
/// release reporting. Returns whether releases will be reported.
fn enable_input_modes() -> EyreResult<bool> {
    let mut stdout = io::stdout();
    execute!(stdout, EnableMouseCapture, EnableFocusChange)?;

    let enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    Ok(enhanced)
}

fn disable_input_modes(enhanced: bool) {
    let mut stdout = io::stdout();
    if enhanced {
        if let Err(err) = execute!(stdout, PopKeyboardEnhancementFlags) {
            warn!("failed to restore keyboard mode: {err}");
        }
    }
    if let Err(err) = execute!(stdout, DisableMouseCapture, DisableFocusChange) {
        warn!("failed to disable mouse capture: {err}");
    }
}
