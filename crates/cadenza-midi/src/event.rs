//! MIDI event record with transport timestamp.
//!
//! A [`MidiEvent`] owns the raw bytes of one complete message. Everything else
//! (status, channel, note number, pitch bend) is derived from those bytes on
//! demand.

use core::fmt;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::packet::PACKET_CAPACITY;
use crate::status::{
    self, Classification, Status, StatusType, SystemCommand, DATA_MASK, SYSEX_START,
};

/// Inline storage covers every non-sysex message.
pub(crate) type EventBytes = SmallVec<[u8; 3]>;

/// One decoded MIDI message.
///
/// The byte sequence is never empty. Constructors that cannot classify their
/// input return `None` instead of an empty event.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MidiEvent {
    /// Transport time. The unit is defined by the transport, not by this crate.
    pub timestamp: u64,
    bytes: EventBytes,
}

impl MidiEvent {
    /// Wrap bytes verbatim, without classification or masking.
    pub(crate) fn from_raw(bytes: &[u8], timestamp: u64) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }
        Some(Self {
            timestamp,
            bytes: EventBytes::from_slice(bytes),
        })
    }

    pub(crate) fn from_vec(bytes: Vec<u8>, timestamp: u64) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }
        Some(Self {
            timestamp,
            bytes: EventBytes::from_vec(bytes),
        })
    }

    /// Build an event from a raw byte sequence, classifying the leading byte.
    ///
    /// - SysEx start: every byte is kept verbatim.
    /// - Other system commands: the status byte plus as many data bytes as the
    ///   command defines (fewer if the input is short).
    /// - Channel voice: status byte plus every remaining byte masked to 7 bits.
    /// - Meta event types and unclassified bytes produce no event.
    ///
    /// This never consults sysex reassembly state; see
    /// [`MidiDecoder::decode_bytes`](crate::MidiDecoder::decode_bytes) for the
    /// stateful variant.
    pub fn parse(bytes: &[u8], timestamp: u64) -> Option<Self> {
        let (&first, rest) = bytes.split_first()?;

        match status::classify(first) {
            Classification::System(SystemCommand::Sysex) => Self::from_raw(bytes, timestamp),
            Classification::System(command) => {
                let data_len = command.length().fixed().unwrap_or(1) - 1;
                let take = data_len.min(rest.len());
                Some(Self::with_command(timestamp, command, &rest[..take]))
            }
            Classification::ChannelVoice(status) => {
                Some(Self::with_status(timestamp, status, rest))
            }
            Classification::Meta(meta) => {
                debug!("Ignoring meta event {} ({} bytes)", meta, bytes.len());
                None
            }
            Classification::Unclassified => {
                trace!("Unclassified leading byte 0x{:02X}, dropping", first);
                None
            }
        }
    }

    fn with_status(timestamp: u64, status: Status, data: &[u8]) -> Self {
        let mut bytes = EventBytes::with_capacity(data.len() + 1);
        bytes.push(status.byte());
        bytes.extend(data.iter().map(|b| b & DATA_MASK));
        Self { timestamp, bytes }
    }

    fn with_command(timestamp: u64, command: SystemCommand, data: &[u8]) -> Self {
        let mut bytes = EventBytes::with_capacity(data.len() + 1);
        bytes.push(command.byte());
        bytes.extend_from_slice(data);
        Self { timestamp, bytes }
    }

    /// Channel voice message from its parts. Data bytes are masked to 7 bits.
    pub fn from_status(timestamp: u64, kind: StatusType, channel: u8, data: &[u8]) -> Self {
        Self::with_status(timestamp, Status::new(kind, channel), data)
    }

    /// System message from its parts. Data bytes are copied verbatim.
    pub fn from_command(timestamp: u64, command: SystemCommand, byte1: u8, byte2: Option<u8>) -> Self {
        let mut bytes = EventBytes::new();
        bytes.push(command.byte());
        bytes.push(byte1);
        bytes.extend(byte2);
        Self { timestamp, bytes }
    }

    #[inline]
    pub fn note_on(timestamp: u64, channel: u8, note: u8, velocity: u8) -> Self {
        Self::from_status(timestamp, StatusType::NoteOn, channel, &[note, velocity])
    }

    #[inline]
    pub fn note_off(timestamp: u64, channel: u8, note: u8, velocity: u8) -> Self {
        Self::from_status(timestamp, StatusType::NoteOff, channel, &[note, velocity])
    }

    #[inline]
    pub fn program_change(timestamp: u64, channel: u8, program: u8) -> Self {
        Self::from_status(timestamp, StatusType::ProgramChange, channel, &[program])
    }

    #[inline]
    pub fn controller_change(timestamp: u64, channel: u8, controller: u8, value: u8) -> Self {
        Self::from_status(
            timestamp,
            StatusType::ControlChange,
            channel,
            &[controller, value],
        )
    }

    /// Pitch wheel from a 14-bit value (8192 = center).
    #[inline]
    pub fn pitch_bend(timestamp: u64, channel: u8, value: u16) -> Self {
        let lsb = (value & 0x7F) as u8;
        let msb = ((value >> 7) & 0x7F) as u8;
        Self::from_status(timestamp, StatusType::PitchWheel, channel, &[lsb, msb])
    }

    #[inline]
    pub fn note_on_builder(note: u8, velocity: u8) -> MidiEventBuilder {
        MidiEventBuilder::new(StatusType::NoteOn, [note, velocity])
    }

    #[inline]
    pub fn note_off_builder(note: u8) -> MidiEventBuilder {
        MidiEventBuilder::new(StatusType::NoteOff, [note, 0])
    }

    #[inline]
    pub fn cc_builder(controller: u8, value: u8) -> MidiEventBuilder {
        MidiEventBuilder::new(StatusType::ControlChange, [controller, value])
    }

    // ==================== Raw access ====================

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes.into_vec()
    }

    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Payload split into transport-sized chunks (256 bytes each).
    pub fn packets(&self) -> impl Iterator<Item = &[u8]> {
        self.bytes.chunks(PACKET_CAPACITY)
    }

    // ==================== Derived fields ====================

    /// Channel voice status, if the leading byte is `0x80..=0xEF`.
    #[inline]
    pub fn status(&self) -> Option<Status> {
        self.bytes.first().copied().and_then(Status::from_byte)
    }

    /// System command, if the leading byte is a system byte and data follows.
    ///
    /// A `0xFF` with payload is a stored meta event rather than a reset, so it
    /// is not reported.
    pub fn system_command(&self) -> Option<SystemCommand> {
        let first = *self.bytes.first()?;
        if self.bytes.len() <= 1 || first == SystemCommand::SystemReset.byte() {
            return None;
        }
        SystemCommand::from_byte(first)
    }

    #[inline]
    pub fn channel(&self) -> Option<u8> {
        self.status().map(|s| s.channel)
    }

    pub fn note_number(&self) -> Option<u8> {
        match self.status() {
            Some(status) if status.kind.is_note() && self.bytes.len() > 1 => Some(self.bytes[1]),
            _ => None,
        }
    }

    pub fn velocity(&self) -> Option<u8> {
        match self.status() {
            Some(status) if status.kind.is_note() && self.bytes.len() > 2 => Some(self.bytes[2]),
            _ => None,
        }
    }

    /// 14-bit pitch wheel value (0-16383, center 8192).
    pub fn pitch_bend_value(&self) -> Option<u16> {
        match self.status() {
            Some(status) if status.kind == StatusType::PitchWheel && self.bytes.len() > 2 => {
                let lsb = (self.bytes[1] & DATA_MASK) as u16;
                let msb = (self.bytes[2] & DATA_MASK) as u16;
                Some(lsb | (msb << 7))
            }
            _ => None,
        }
    }

    #[inline]
    pub fn is_sysex(&self) -> bool {
        self.bytes.first() == Some(&SYSEX_START)
    }

    #[inline]
    pub fn is_note_on(&self) -> bool {
        matches!(self.status(), Some(s) if s.kind == StatusType::NoteOn)
            && self.velocity().is_some_and(|v| v > 0)
    }

    #[inline]
    pub fn is_note_off(&self) -> bool {
        match self.status().map(|s| s.kind) {
            Some(StatusType::NoteOff) => true,
            Some(StatusType::NoteOn) => self.velocity() == Some(0),
            _ => false,
        }
    }
}

impl fmt::Display for MidiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(status) = self.status() {
            write!(f, "{} - {:?}", status, self.bytes())
        } else if let Some(command) = self.system_command() {
            write!(f, "{} - {:?}", command, self.bytes())
        } else {
            write!(f, "Unhandled event {:?}", self.bytes())
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MidiEventBuilder {
    timestamp: u64,
    channel: u8,
    kind: StatusType,
    data: [u8; 2],
}

impl MidiEventBuilder {
    fn new(kind: StatusType, data: [u8; 2]) -> Self {
        Self {
            timestamp: 0,
            channel: 0,
            kind,
            data,
        }
    }

    #[inline]
    pub fn channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    #[inline]
    pub fn timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[inline]
    pub fn build(self) -> MidiEvent {
        MidiEvent::from_status(self.timestamp, self.kind, self.channel, &self.data)
    }
}
