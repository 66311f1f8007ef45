//! # Cadenza - audio engine MIDI front end
//!
//! Umbrella crate re-exporting the Cadenza subsystems.
//!
//! ## Architecture
//!
//! - **cadenza-midi** - MIDI event model, packet/Bluetooth/file decoders, SysEx reassembly
//!
//! ## Quick Start
//!
//! ```
//! use cadenza::prelude::*;
//!
//! let input = MidiInput::builder().build()?;
//! let decoder = input.decoder(TransportId::new(0));
//!
//! let event = decoder.decode_bytes(&[0x90, 60, 100], 0).unwrap();
//! assert_eq!(event.note_number(), Some(60));
//! # Ok::<(), cadenza::midi::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - `midi` + `smf`
//! - `midi` - MIDI decoding subsystem
//! - `smf` - Standard MIDI File decoding

// MIDI subsystem
#[cfg(feature = "midi")]
pub use cadenza_midi as midi;

#[cfg(feature = "midi")]
pub use cadenza_midi::{
    FileChunkEvent, MidiDecoder, MidiEvent, MidiInput, MidiInputBuilder, MidiPacket, TransportId,
};

/// Common imports.
pub mod prelude {
    #[cfg(feature = "midi")]
    pub use cadenza_midi::{
        FileChunkEvent, MidiDecoder, MidiEvent, MidiInput, MidiPacket, Status, StatusType,
        SystemCommand, TransportId,
    };
}
