//! Status byte classification tables.
//!
//! Pure lookups from a leading MIDI byte to its message category and expected
//! length. Nothing here holds state.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Start of a System Exclusive message.
pub const SYSEX_START: u8 = 0xF0;

/// End of a System Exclusive message.
pub const SYSEX_END: u8 = 0xF7;

/// Mask for the 7 payload bits of a data byte.
pub const DATA_MASK: u8 = 0x7F;

#[inline]
pub fn is_status_byte(byte: u8) -> bool {
    byte & 0x80 != 0
}

/// Expected length of a message, including its status byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageLength {
    Fixed(usize),
    /// Sysex: runs until [`SYSEX_END`].
    Variable,
}

impl MessageLength {
    #[inline]
    pub fn fixed(self) -> Option<usize> {
        match self {
            MessageLength::Fixed(len) => Some(len),
            MessageLength::Variable => None,
        }
    }
}

/// Channel voice message type (high nibble of the status byte).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum StatusType {
    NoteOff = 0x8,
    NoteOn = 0x9,
    PolyPressure = 0xA,
    ControlChange = 0xB,
    ProgramChange = 0xC,
    ChannelPressure = 0xD,
    PitchWheel = 0xE,
}

impl StatusType {
    /// Classify the high nibble of `byte`. Returns `None` for data bytes and
    /// system bytes.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte >> 4 {
            0x8 => Some(StatusType::NoteOff),
            0x9 => Some(StatusType::NoteOn),
            0xA => Some(StatusType::PolyPressure),
            0xB => Some(StatusType::ControlChange),
            0xC => Some(StatusType::ProgramChange),
            0xD => Some(StatusType::ChannelPressure),
            0xE => Some(StatusType::PitchWheel),
            _ => None,
        }
    }

    #[inline]
    pub fn nibble(self) -> u8 {
        self as u8
    }

    /// Message length including the status byte.
    pub fn length(self) -> usize {
        match self {
            StatusType::ProgramChange | StatusType::ChannelPressure => 2,
            _ => 3,
        }
    }

    #[inline]
    pub fn is_note(self) -> bool {
        matches!(self, StatusType::NoteOn | StatusType::NoteOff)
    }

    pub fn name(self) -> &'static str {
        match self {
            StatusType::NoteOff => "Note Off",
            StatusType::NoteOn => "Note On",
            StatusType::PolyPressure => "Polyphonic Aftertouch",
            StatusType::ControlChange => "Control Change",
            StatusType::ProgramChange => "Program Change",
            StatusType::ChannelPressure => "Channel Aftertouch",
            StatusType::PitchWheel => "Pitch Wheel",
        }
    }
}

impl fmt::Display for StatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A channel voice status: message type plus channel (0-15).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Status {
    pub kind: StatusType,
    pub channel: u8,
}

impl Status {
    #[inline]
    pub fn new(kind: StatusType, channel: u8) -> Self {
        Self {
            kind,
            channel: channel & 0x0F,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        StatusType::from_byte(byte).map(|kind| Self::new(kind, byte & 0x0F))
    }

    #[inline]
    pub fn byte(self) -> u8 {
        (self.kind.nibble() << 4) | self.channel
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Channels are shown one-based, the way hardware labels them.
        write!(f, "{} channel {}", self.kind, self.channel + 1)
    }
}

/// System common and system real-time messages (`0xF0..=0xFF`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SystemCommand {
    Sysex = 0xF0,
    TimeCodeQuarterFrame = 0xF1,
    SongPosition = 0xF2,
    SongSelect = 0xF3,
    TuneRequest = 0xF6,
    SysexEnd = 0xF7,
    Clock = 0xF8,
    Start = 0xFA,
    Continue = 0xFB,
    Stop = 0xFC,
    ActiveSensing = 0xFE,
    SystemReset = 0xFF,
}

impl SystemCommand {
    /// `0xF4`, `0xF5`, `0xF9` and `0xFD` are undefined and return `None`.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0xF0 => Some(SystemCommand::Sysex),
            0xF1 => Some(SystemCommand::TimeCodeQuarterFrame),
            0xF2 => Some(SystemCommand::SongPosition),
            0xF3 => Some(SystemCommand::SongSelect),
            0xF6 => Some(SystemCommand::TuneRequest),
            0xF7 => Some(SystemCommand::SysexEnd),
            0xF8 => Some(SystemCommand::Clock),
            0xFA => Some(SystemCommand::Start),
            0xFB => Some(SystemCommand::Continue),
            0xFC => Some(SystemCommand::Stop),
            0xFE => Some(SystemCommand::ActiveSensing),
            0xFF => Some(SystemCommand::SystemReset),
            _ => None,
        }
    }

    #[inline]
    pub fn byte(self) -> u8 {
        self as u8
    }

    pub fn length(self) -> MessageLength {
        match self {
            SystemCommand::Sysex => MessageLength::Variable,
            SystemCommand::SongPosition => MessageLength::Fixed(3),
            SystemCommand::TimeCodeQuarterFrame | SystemCommand::SongSelect => {
                MessageLength::Fixed(2)
            }
            _ => MessageLength::Fixed(1),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SystemCommand::Sysex => "SysEx",
            SystemCommand::TimeCodeQuarterFrame => "Time Code Quarter Frame",
            SystemCommand::SongPosition => "Song Position",
            SystemCommand::SongSelect => "Song Select",
            SystemCommand::TuneRequest => "Tune Request",
            SystemCommand::SysexEnd => "SysEx End",
            SystemCommand::Clock => "Clock",
            SystemCommand::Start => "Start",
            SystemCommand::Continue => "Continue",
            SystemCommand::Stop => "Stop",
            SystemCommand::ActiveSensing => "Active Sensing",
            SystemCommand::SystemReset => "System Reset",
        }
    }
}

impl fmt::Display for SystemCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Standard MIDI File meta event types.
///
/// These share the data-byte range, so they only make sense as the type byte
/// of a stored file event, never on a live wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MetaEventType {
    SequenceNumber = 0x00,
    Text = 0x01,
    Copyright = 0x02,
    TrackName = 0x03,
    InstrumentName = 0x04,
    Lyric = 0x05,
    Marker = 0x06,
    CuePoint = 0x07,
    ProgramName = 0x08,
    DeviceName = 0x09,
    ChannelPrefix = 0x20,
    MidiPort = 0x21,
    EndOfTrack = 0x2F,
    SetTempo = 0x51,
    SmpteOffset = 0x54,
    TimeSignature = 0x58,
    KeySignature = 0x59,
    SequencerSpecific = 0x7F,
}

impl MetaEventType {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(MetaEventType::SequenceNumber),
            0x01 => Some(MetaEventType::Text),
            0x02 => Some(MetaEventType::Copyright),
            0x03 => Some(MetaEventType::TrackName),
            0x04 => Some(MetaEventType::InstrumentName),
            0x05 => Some(MetaEventType::Lyric),
            0x06 => Some(MetaEventType::Marker),
            0x07 => Some(MetaEventType::CuePoint),
            0x08 => Some(MetaEventType::ProgramName),
            0x09 => Some(MetaEventType::DeviceName),
            0x20 => Some(MetaEventType::ChannelPrefix),
            0x21 => Some(MetaEventType::MidiPort),
            0x2F => Some(MetaEventType::EndOfTrack),
            0x51 => Some(MetaEventType::SetTempo),
            0x54 => Some(MetaEventType::SmpteOffset),
            0x58 => Some(MetaEventType::TimeSignature),
            0x59 => Some(MetaEventType::KeySignature),
            0x7F => Some(MetaEventType::SequencerSpecific),
            _ => None,
        }
    }

    #[inline]
    pub fn byte(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            MetaEventType::SequenceNumber => "Sequence Number",
            MetaEventType::Text => "Text",
            MetaEventType::Copyright => "Copyright",
            MetaEventType::TrackName => "Track Name",
            MetaEventType::InstrumentName => "Instrument Name",
            MetaEventType::Lyric => "Lyric",
            MetaEventType::Marker => "Marker",
            MetaEventType::CuePoint => "Cue Point",
            MetaEventType::ProgramName => "Program Name",
            MetaEventType::DeviceName => "Device Name",
            MetaEventType::ChannelPrefix => "Channel Prefix",
            MetaEventType::MidiPort => "MIDI Port",
            MetaEventType::EndOfTrack => "End of Track",
            MetaEventType::SetTempo => "Set Tempo",
            MetaEventType::SmpteOffset => "SMPTE Offset",
            MetaEventType::TimeSignature => "Time Signature",
            MetaEventType::KeySignature => "Key Signature",
            MetaEventType::SequencerSpecific => "Sequencer Specific",
        }
    }
}

impl fmt::Display for MetaEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of classifying a leading byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    ChannelVoice(Status),
    System(SystemCommand),
    Meta(MetaEventType),
    Unclassified,
}

impl Classification {
    /// Expected message length, or `None` when the category has no wire
    /// length (meta events, unclassified bytes).
    pub fn length(self) -> Option<MessageLength> {
        match self {
            Classification::ChannelVoice(status) => {
                Some(MessageLength::Fixed(status.kind.length()))
            }
            Classification::System(command) => Some(command.length()),
            Classification::Meta(_) | Classification::Unclassified => None,
        }
    }
}

/// Classify a leading byte. Total: anything unknown is `Unclassified`.
///
/// Status bytes take precedence; meta types are only considered for bytes in
/// the data range.
pub fn classify(byte: u8) -> Classification {
    if let Some(status) = Status::from_byte(byte) {
        Classification::ChannelVoice(status)
    } else if let Some(command) = SystemCommand::from_byte(byte) {
        Classification::System(command)
    } else if let Some(meta) = MetaEventType::from_byte(byte) {
        Classification::Meta(meta)
    } else {
        Classification::Unclassified
    }
}
