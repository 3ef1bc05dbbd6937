use std::collections::BTreeMap;

use crate::synth::voice::{ToneVoice, VoiceId};

/// Key -> voice bookkeeping. At most one voice per key.
///
/// A voice stays registered from note-on until its release ramp has run to
/// completion, so `len()` counts held keys plus keys still fading out.
#[derive(Debug, Default)]
pub struct VoiceRegistry {
    voices: BTreeMap<char, ToneVoice>,
}

impl VoiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_voice(&self, key: char) -> bool {
        self.voices.contains_key(&key)
    }

    /// Register `voice` under its key. Refuses (and hands the voice back)
    /// when the key already has one.
    pub fn insert(&mut self, voice: ToneVoice) -> Result<(), ToneVoice> {
        if self.has_voice(voice.key()) {
            return Err(voice);
        }
        self.voices.insert(voice.key(), voice);
        Ok(())
    }

    pub fn get(&self, key: char) -> Option<&ToneVoice> {
        self.voices.get(&key)
    }

    pub fn get_mut(&mut self, key: char) -> Option<&mut ToneVoice> {
        self.voices.get_mut(&key)
    }

    /// Remove the voice under `key` only if it is still the instance `id`.
    pub fn remove_if(&mut self, key: char, id: VoiceId) -> Option<ToneVoice> {
        match self.voices.get(&key) {
            Some(voice) if voice.id() == id => self.voices.remove(&key),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToneVoice> {
        self.voices.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ToneVoice> {
        self.voices.values_mut()
    }

    /// Remove every voice, returning them in key order.
    pub fn drain(&mut self) -> Vec<ToneVoice> {
        std::mem::take(&mut self.voices).into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}
