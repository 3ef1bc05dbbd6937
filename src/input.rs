//! Raw input to note messages.
//!
//! Physical keys and the on-screen keyboard both end up as the same
//! `NoteOn` / `NoteOff` messages. The router owns the "is this key held"
//! bookkeeping so that auto-repeat never retriggers a note and a release
//! from one source does not cut a note still held by the other.

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::{notes, synth::SynthMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown { key: char, repeat: bool },
    KeyUp { key: char },
    /// Press on the on-screen key for `key`. Ignored while the pointer is
    /// already down on a key.
    PointerDown { key: char },
    PointerUp,
    /// The pointer left the on-screen keyboard while pressed.
    PointerLeave,
}

#[derive(Debug, Default)]
pub struct InputRouter {
    held: BTreeSet<char>,
    pointer: Option<char>,
    /// Seconds a key stays down without a release report, when enabled.
    hold_fallback: Option<f64>,
    deadlines: BTreeMap<char, f64>,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Router for hosts that never report key releases: every press (or
    /// repeat) keeps the note alive for `hold` seconds, after which
    /// [`expire`](Self::expire) releases it.
    pub fn with_hold_fallback(hold: f64) -> Self {
        Self {
            hold_fallback: Some(hold.max(0.0)),
            ..Self::default()
        }
    }

    pub fn set_hold_fallback(&mut self, hold: Option<f64>) {
        self.hold_fallback = hold.map(|h| h.max(0.0));
        if self.hold_fallback.is_none() {
            self.deadlines.clear();
        }
    }

    /// Translate one event observed at time `now` (seconds).
    pub fn route(&mut self, event: InputEvent, now: f64) -> Option<SynthMessage> {
        match event {
            InputEvent::KeyDown { key, repeat } => {
                let key = notes::normalize(key)?;
                if let Some(hold) = self.hold_fallback {
                    self.deadlines.insert(key, now + hold);
                }
                if repeat || !self.held.insert(key) {
                    trace!(%key, "repeat suppressed");
                    return None;
                }
                self.press(key)
            }
            InputEvent::KeyUp { key } => {
                let key = notes::normalize(key)?;
                self.deadlines.remove(&key);
                if !self.held.remove(&key) {
                    return None;
                }
                self.release(key)
            }
            InputEvent::PointerDown { key } => {
                let key = notes::normalize(key)?;
                // One pointer, one key: moving to another key needs a leave first
                if self.pointer.is_some() {
                    return None;
                }
                self.pointer = Some(key);
                self.press(key)
            }
            InputEvent::PointerUp | InputEvent::PointerLeave => {
                let key = self.pointer.take()?;
                self.release(key)
            }
        }
    }

    /// Release notes whose fallback hold has run out by `now`.
    pub fn expire(&mut self, now: f64) -> Vec<SynthMessage> {
        let due: Vec<char> = self
            .deadlines
            .iter()
            .filter(|(_, &deadline)| deadline <= now)
            .map(|(&key, _)| key)
            .collect();

        let mut messages = Vec::with_capacity(due.len());
        for key in due {
            self.deadlines.remove(&key);
            if self.held.remove(&key) {
                messages.extend(self.release(key));
            }
        }
        messages
    }

    /// Forget every held key (focus loss, all-notes-off).
    pub fn clear(&mut self) {
        self.held.clear();
        self.deadlines.clear();
        self.pointer = None;
    }

    pub fn is_held(&self, key: char) -> bool {
        notes::normalize(key)
            .is_some_and(|key| self.held.contains(&key) || self.pointer == Some(key))
    }

    pub fn pointer_key(&self) -> Option<char> {
        self.pointer
    }

    fn press(&self, key: char) -> Option<SynthMessage> {
        Some(SynthMessage::NoteOn { key })
    }

    fn release(&self, key: char) -> Option<SynthMessage> {
        if self.held.contains(&key) || self.pointer == Some(key) {
            return None;
        }
        Some(SynthMessage::NoteOff { key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(key: char) -> InputEvent {
        InputEvent::KeyDown { key, repeat: false }
    }

    #[test]
    fn repeats_do_not_retrigger() {
        let mut router = InputRouter::new();
        assert_eq!(router.route(down('a'), 0.0), Some(SynthMessage::NoteOn { key: 'a' }));
        assert_eq!(router.route(InputEvent::KeyDown { key: 'a', repeat: true }, 0.1), None);
        assert_eq!(router.route(down('a'), 0.2), None);
        assert_eq!(
            router.route(InputEvent::KeyUp { key: 'a' }, 0.3),
            Some(SynthMessage::NoteOff { key: 'a' })
        );
    }

    #[test]
    fn unrecognized_keys_are_ignored() {
        let mut router = InputRouter::new();
        assert_eq!(router.route(down('z'), 0.0), None);
        assert_eq!(router.route(InputEvent::KeyUp { key: 'z' }, 0.0), None);
        assert_eq!(router.route(InputEvent::PointerDown { key: '1' }, 0.0), None);
        assert!(!router.is_held('z'));
    }

    #[test]
    fn uppercase_maps_to_same_note() {
        let mut router = InputRouter::new();
        assert_eq!(router.route(down('S'), 0.0), Some(SynthMessage::NoteOn { key: 's' }));
        assert_eq!(router.route(down('s'), 0.0), None);
        assert_eq!(
            router.route(InputEvent::KeyUp { key: 's' }, 0.0),
            Some(SynthMessage::NoteOff { key: 's' })
        );
    }

    #[test]
    fn stray_release_produces_nothing() {
        let mut router = InputRouter::new();
        assert_eq!(router.route(InputEvent::KeyUp { key: 'd' }, 0.0), None);
        assert_eq!(router.route(InputEvent::PointerUp, 0.0), None);
    }

    #[test]
    fn pointer_press_release_and_leave() {
        let mut router = InputRouter::new();
        assert_eq!(
            router.route(InputEvent::PointerDown { key: 'h' }, 0.0),
            Some(SynthMessage::NoteOn { key: 'h' })
        );
        assert_eq!(
            router.route(InputEvent::PointerLeave, 0.1),
            Some(SynthMessage::NoteOff { key: 'h' })
        );
        assert_eq!(router.route(InputEvent::PointerUp, 0.2), None);
    }

    #[test]
    fn pointer_slides_by_leave_then_press() {
        let mut router = InputRouter::new();
        router.route(InputEvent::PointerDown { key: 'a' }, 0.0);
        assert_eq!(router.route(InputEvent::PointerDown { key: 's' }, 0.1), None);
        assert_eq!(
            router.route(InputEvent::PointerLeave, 0.1),
            Some(SynthMessage::NoteOff { key: 'a' })
        );
        assert_eq!(
            router.route(InputEvent::PointerDown { key: 's' }, 0.1),
            Some(SynthMessage::NoteOn { key: 's' })
        );
    }

    #[test]
    fn pointer_release_keeps_keyboard_note() {
        let mut router = InputRouter::new();
        router.route(down('g'), 0.0);
        assert_eq!(
            router.route(InputEvent::PointerDown { key: 'g' }, 0.1),
            Some(SynthMessage::NoteOn { key: 'g' })
        );
        assert_eq!(router.route(InputEvent::PointerUp, 0.2), None);
        assert!(router.is_held('g'));
        assert_eq!(
            router.route(InputEvent::KeyUp { key: 'g' }, 0.3),
            Some(SynthMessage::NoteOff { key: 'g' })
        );
    }

    #[test]
    fn hold_fallback_releases_after_last_press() {
        let mut router = InputRouter::with_hold_fallback(0.35);
        assert_eq!(router.route(down('f'), 0.0), Some(SynthMessage::NoteOn { key: 'f' }));
        assert!(router.expire(0.3).is_empty());

        // Repeat extends the hold
        router.route(InputEvent::KeyDown { key: 'f', repeat: true }, 0.3);
        assert!(router.expire(0.5).is_empty());
        assert_eq!(router.expire(0.65), vec![SynthMessage::NoteOff { key: 'f' }]);
        assert!(!router.is_held('f'));
        assert!(router.expire(1.0).is_empty());
    }

    #[test]
    fn explicit_release_cancels_fallback() {
        let mut router = InputRouter::with_hold_fallback(0.35);
        router.route(down('j'), 0.0);
        assert_eq!(
            router.route(InputEvent::KeyUp { key: 'j' }, 0.1),
            Some(SynthMessage::NoteOff { key: 'j' })
        );
        assert!(router.expire(1.0).is_empty());
    }

    #[test]
    fn clear_forgets_everything() {
        let mut router = InputRouter::with_hold_fallback(0.35);
        router.route(down('a'), 0.0);
        router.route(InputEvent::PointerDown { key: 'k' }, 0.0);
        router.clear();
        assert!(!router.is_held('a'));
        assert_eq!(router.pointer_key(), None);
        assert!(router.expire(1.0).is_empty());
    }
}
