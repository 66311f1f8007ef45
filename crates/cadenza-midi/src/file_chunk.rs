//! Events stored in a Standard MIDI File track chunk.
//!
//! A file parser hands over each track event as a type byte, the bytes that
//! followed it in the file, and (for channel messages) the canonical message
//! with running status resolved. With the `smf` feature, [`FileChunkEvent`]
//! can be built straight from a `midly` track event.

#[cfg(feature = "smf")]
use midly::{MidiMessage, TrackEventKind};

use crate::status::SYSEX_START;

/// One stored track event, as produced by a file parser.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileChunkEvent {
    /// Leading type byte. `None` marks a corrupt chunk.
    pub type_byte: Option<u8>,
    /// Bytes that followed the type byte in the file.
    pub event_data: Vec<u8>,
    /// Complete message (status byte included) for channel events.
    pub computed_data: Vec<u8>,
}

impl FileChunkEvent {
    pub fn new(type_byte: Option<u8>, event_data: Vec<u8>, computed_data: Vec<u8>) -> Self {
        Self {
            type_byte,
            event_data,
            computed_data,
        }
    }

    /// Channel event whose canonical bytes are `message`.
    pub fn channel(message: &[u8]) -> Self {
        Self {
            type_byte: message.first().copied(),
            event_data: message.get(1..).unwrap_or_default().to_vec(),
            computed_data: message.to_vec(),
        }
    }

    /// Convert a `midly` track event. Meta events are not dispatched as MIDI
    /// and return `None`.
    #[cfg(feature = "smf")]
    pub fn from_track_event(kind: &TrackEventKind<'_>) -> Option<Self> {
        match kind {
            TrackEventKind::Midi { channel, message } => {
                Some(Self::channel(&midly_message_bytes(channel.as_int(), message)))
            }
            TrackEventKind::SysEx(data) => Some(Self {
                type_byte: Some(SYSEX_START),
                event_data: data.to_vec(),
                computed_data: Vec::new(),
            }),
            TrackEventKind::Escape(data) => Some(Self {
                type_byte: Some(crate::status::SYSEX_END),
                event_data: data.to_vec(),
                computed_data: Vec::new(),
            }),
            TrackEventKind::Meta(_) => None,
        }
    }

    /// SysEx payload with the start byte restored (`midly` and the file format
    /// both strip it).
    pub(crate) fn sysex_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.event_data.len() + 1);
        bytes.push(SYSEX_START);
        bytes.extend_from_slice(&self.event_data);
        bytes
    }
}

#[cfg(feature = "smf")]
fn midly_message_bytes(channel: u8, message: &MidiMessage) -> Vec<u8> {
    let channel = channel & 0x0F;
    match *message {
        MidiMessage::NoteOff { key, vel } => vec![0x80 | channel, key.as_int(), vel.as_int()],
        MidiMessage::NoteOn { key, vel } => vec![0x90 | channel, key.as_int(), vel.as_int()],
        MidiMessage::Aftertouch { key, vel } => {
            vec![0xA0 | channel, key.as_int(), vel.as_int()]
        }
        MidiMessage::Controller { controller, value } => {
            vec![0xB0 | channel, controller.as_int(), value.as_int()]
        }
        MidiMessage::ProgramChange { program } => vec![0xC0 | channel, program.as_int()],
        MidiMessage::ChannelAftertouch { vel } => vec![0xD0 | channel, vel.as_int()],
        MidiMessage::PitchBend { bend } => {
            let value = bend.0.as_int();
            vec![0xE0 | channel, (value & 0x7F) as u8, (value >> 7) as u8]
        }
    }
}
