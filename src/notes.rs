/*
Note Table
==========

The playable range is one octave and a step of the C major scale, laid out on
the home row of a QWERTY keyboard:

    key   a    s    d    f    g    h    j    k    l
    note  C4   D4   E4   F4   G4   A4   B4   C5   D5

Frequencies are equal-tempered with A4 = 440 Hz, rounded to two decimals.
The table is fixed at compile time; a key that is not in it simply has no
note.
*/

/// A playable note: the key that triggers it and its pitch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub key: char,
    pub name: &'static str,
    pub frequency: f32,
}

pub const NOTES: [Note; 9] = [
    Note { key: 'a', name: "C4", frequency: 261.63 },
    Note { key: 's', name: "D4", frequency: 293.66 },
    Note { key: 'd', name: "E4", frequency: 329.63 },
    Note { key: 'f', name: "F4", frequency: 349.23 },
    Note { key: 'g', name: "G4", frequency: 392.00 },
    Note { key: 'h', name: "A4", frequency: 440.00 },
    Note { key: 'j', name: "B4", frequency: 493.88 },
    Note { key: 'k', name: "C5", frequency: 523.25 },
    Note { key: 'l', name: "D5", frequency: 587.33 },
];

/// Look up the note bound to `key`. Upper-case keys map to the same note.
pub fn lookup(key: char) -> Option<&'static Note> {
    let key = key.to_ascii_lowercase();
    NOTES.iter().find(|note| note.key == key)
}

/// Canonical form of a key symbol, or `None` when the key plays nothing.
pub fn normalize(key: char) -> Option<char> {
    lookup(key).map(|note| note.key)
}
