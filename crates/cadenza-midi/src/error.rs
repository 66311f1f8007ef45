//! Error types for the MIDI decoding subsystem.
//!
//! Most decode failures never reach the caller: a packet that cannot be
//! classified simply produces no event. These variants cover the paths that
//! do report failures (stored file chunks, SMF parsing, configuration) and the
//! sysex state rejections that decoders log and absorb.

use crate::sysex::TransportId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Malformed MIDI file chunk: missing type byte")]
    MalformedChunk,

    #[error("SysEx already in progress on transport {owner} (requested by {requested})")]
    SysexInProgress {
        owner: TransportId,
        requested: TransportId,
    },

    #[error("SysEx message exceeded {limit} bytes")]
    SysexOverflow { limit: usize },

    #[error("MIDI parse error: {0}")]
    MidiFileParse(String),

    #[error("Unsupported MIDI timing format")]
    UnsupportedTiming,

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

#[cfg(feature = "smf")]
impl From<midly::Error> for Error {
    fn from(e: midly::Error) -> Self {
        Error::MidiFileParse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
