//! MIDI input subsystem: owns the shared SysEx state and hands out one
//! decoder per transport.
//!
//! ## Quick Start
//!
//! ```
//! use cadenza_midi::{MidiInput, MidiPacket, TransportId};
//!
//! let input = MidiInput::builder().max_sysex_len(4096).build()?;
//!
//! let usb = input.decoder(TransportId::new(0));
//! let ble = input.decoder(TransportId::new(1));
//!
//! let note = usb.decode_packet(&MidiPacket::new(0, &[0x90, 60, 100]));
//! assert_eq!(note.and_then(|e| e.note_number()), Some(60));
//!
//! let batch = ble.decode_bluetooth(&[0x80, 0x80, 0x90, 0x40, 0x7F, 0x3C, 0x7F]);
//! assert_eq!(batch.len(), 2);
//! # Ok::<(), cadenza_midi::Error>(())
//! ```

mod builder;

pub use builder::MidiInputBuilder;

use std::sync::Arc;

use crate::decoder::MidiDecoder;
use crate::sysex::{SysexReassembly, TransportId};

/// Default upper bound for a reassembled SysEx message.
pub const DEFAULT_MAX_SYSEX_LEN: usize = 64 * 1024;

/// Default initial allocation of the reassembly buffer.
pub const DEFAULT_SYSEX_CAPACITY: usize = 256;

/// MIDI input subsystem.
///
/// Clone is cheap (Arc internally). Every decoder created from the same input,
/// or from a clone of it, shares one SysEx reassembly state.
#[derive(Clone, Debug)]
pub struct MidiInput {
    sysex: Arc<SysexReassembly>,
}

impl MidiInput {
    pub fn builder() -> MidiInputBuilder {
        MidiInputBuilder::default()
    }

    /// Decoder for one transport. Create one per transport and keep it on
    /// that transport's callback.
    pub fn decoder(&self, transport: TransportId) -> MidiDecoder {
        MidiDecoder::new(transport, Arc::clone(&self.sysex))
    }

    pub fn sysex(&self) -> &Arc<SysexReassembly> {
        &self.sysex
    }

    pub fn is_receiving_sysex(&self) -> bool {
        self.sysex.is_receiving()
    }

    pub fn sysex_owner(&self) -> Option<TransportId> {
        self.sysex.owner()
    }

    /// Abort any in-progress SysEx message, whichever transport owns it.
    pub fn reset_sysex(&self) {
        self.sysex.reset();
    }
}

impl Default for MidiInput {
    fn default() -> Self {
        Self {
            sysex: Arc::new(SysexReassembly::default()),
        }
    }
}
