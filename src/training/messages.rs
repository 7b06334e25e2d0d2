use std::fmt;

use serde::Serialize;

/// One decoded MIDI input message: status byte (channel voice status plus
/// channel nibble), identifier byte (note or controller number), value byte.
/// Equality is structural over all three bytes.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawMessage([u8; 3]);

impl RawMessage {
    pub fn new(status: u8, ident: u8, value: u8) -> Self {
        RawMessage([status, ident, value])
    }

    /// Messages shorter than three bytes carry no (status, identifier,
    /// value) tuple and are not trainable.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 3 {
            return None;
        }
        Some(RawMessage([bytes[0], bytes[1], bytes[2]]))
    }

    pub fn status(&self) -> u8 {
        self.0[0]
    }

    pub fn ident(&self) -> u8 {
        self.0[1]
    }

    pub fn value(&self) -> u8 {
        self.0[2]
    }
}

impl fmt::Display for RawMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:02X} {:02X} {:02X}]", self.0[0], self.0[1], self.0[2])
    }
}

/// Port index, raw message tuple
pub type MidiReceiverPayload = (usize, RawMessage);

/// Result of one finalize cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingOutcome {
    /// A new control was built and attached to the device.
    Trained { device: usize, control_id: u32 },
    /// One of the observed tuples is already bound on an existing control of
    /// the same classified type; nothing was attached. The host decides
    /// whether to merge, replace or reject.
    DuplicateBinding {
        device: usize,
        control_id: u32,
        binding: RawMessage,
    },
    /// No device in the registry matched the event source; buffered data was
    /// dropped.
    DeviceUnresolved,
}
