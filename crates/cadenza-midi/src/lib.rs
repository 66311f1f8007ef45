//! MIDI decoding subsystem for the Cadenza audio engine.
//!
//! Turns raw MIDI bytes into typed [`MidiEvent`]s and reassembles SysEx
//! messages that span several transport deliveries.
//!
//! # Sources
//!
//! - **Hardware packets**: fixed-capacity [`MidiPacket`]s with a valid-byte count
//! - **Bluetooth LE MIDI**: timestamped notifications with running status
//! - **Stored files**: [`FileChunkEvent`]s, or whole Standard MIDI Files
//!   (feature: `smf`)
//!
//! # Example
//!
//! ```
//! use cadenza_midi::{MidiInput, MidiPacket, TransportId};
//!
//! let input = MidiInput::builder().build()?;
//! let decoder = input.decoder(TransportId::new(0));
//!
//! // SysEx split over two packets
//! assert!(decoder.decode_packet(&MidiPacket::new(0, &[0xF0, 0x01, 0x02])).is_none());
//! let sysex = decoder
//!     .decode_packet(&MidiPacket::new(1, &[0x03, 0xF7]))
//!     .unwrap();
//! assert_eq!(sysex.bytes(), &[0xF0, 0x01, 0x02, 0x03, 0xF7]);
//! # Ok::<(), cadenza_midi::Error>(())
//! ```

pub mod error;
pub use error::{Error, Result};

mod input;
pub use input::{MidiInput, MidiInputBuilder, DEFAULT_MAX_SYSEX_LEN, DEFAULT_SYSEX_CAPACITY};

mod decoder;
pub use decoder::MidiDecoder;

pub(crate) mod event;
pub use event::{MidiEvent, MidiEventBuilder};

pub mod status;
pub use status::{
    classify, Classification, MessageLength, MetaEventType, Status, StatusType, SystemCommand,
};

pub mod packet;
pub use packet::{decode_packet, MidiPacket, PACKET_CAPACITY};

pub mod sysex;
pub use sysex::{SysexReassembly, TransportId};

pub mod bluetooth;
pub use bluetooth::{BleMidiParser, BleParseState};

pub(crate) mod file_chunk;
pub use file_chunk::FileChunkEvent;

pub(crate) mod serde_support;
