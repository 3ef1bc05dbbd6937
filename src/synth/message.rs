#[cfg(feature = "rtrb")]
use rtrb::Consumer;

/// Logical note events, produced by input routing and consumed by the engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SynthMessage {
    NoteOn { key: char },
    NoteOff { key: char },
    AllNotesOff,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

impl MessageReceiver for std::collections::VecDeque<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        self.pop_front()
    }
}
