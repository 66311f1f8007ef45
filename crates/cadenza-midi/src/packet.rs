//! Fixed-capacity transport packets.
//!
//! Hardware transports hand over a padded buffer plus a count of valid bytes.
//! This is the only place that knows about the padding.

use crate::status::SystemCommand;

/// Physical size of a packet's data area.
pub const PACKET_CAPACITY: usize = 256;

/// First `count` bytes of `buffer`. A count past the end is truncated to the
/// buffer's length rather than treated as an error.
#[inline]
pub fn decode_packet(buffer: &[u8], count: usize) -> &[u8] {
    &buffer[..count.min(buffer.len())]
}

/// One packet as delivered by a hardware or virtual MIDI source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MidiPacket {
    pub timestamp: u64,
    /// Declared number of valid bytes in `data`.
    pub length: u16,
    pub data: [u8; PACKET_CAPACITY],
}

impl MidiPacket {
    /// Copy `bytes` into a zero-padded packet. Anything past
    /// [`PACKET_CAPACITY`] is dropped.
    pub fn new(timestamp: u64, bytes: &[u8]) -> Self {
        let len = bytes.len().min(PACKET_CAPACITY);
        let mut data = [0u8; PACKET_CAPACITY];
        data[..len].copy_from_slice(&bytes[..len]);
        Self {
            timestamp,
            length: len as u16,
            data,
        }
    }

    /// Valid payload of this packet.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        decode_packet(&self.data, self.length as usize)
    }

    /// Transport-level flag: the packet carries a system message.
    #[inline]
    pub fn is_system_command(&self) -> bool {
        self.data[0] >= SystemCommand::Sysex.byte()
    }
}

impl Default for MidiPacket {
    fn default() -> Self {
        Self {
            timestamp: 0,
            length: 0,
            data: [0u8; PACKET_CAPACITY],
        }
    }
}
