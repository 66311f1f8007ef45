//! Bluetooth LE MIDI packet splitting.
//!
//! A BLE MIDI notification starts with two timestamp bytes (header and
//! timestamp-low, both with the high bit set). After that, messages follow
//! with running status: a repeated status byte may be omitted, and a
//! timestamp byte may precede each new message.
//!
//! [`BleMidiParser`] splits the payload into raw messages. Classification is
//! left to the caller.

use tracing::debug;

use crate::status::{is_status_byte, SYSEX_END, SYSEX_START};

/// Parser state between two bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BleParseState {
    /// No message in progress.
    #[default]
    Idle,
    /// At least one byte of the current message is buffered.
    AccumulatingMessage,
    /// A message was emitted and no status byte has been seen since. The next
    /// status byte is the timestamp of the following message and is absorbed.
    /// Running-status data bytes accumulate without leaving this state.
    JustCompleted,
}

#[derive(Debug, Default)]
pub struct BleMidiParser {
    state: BleParseState,
    last_status: u8,
    current: Vec<u8>,
}

impl BleMidiParser {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> BleParseState {
        self.state
    }

    /// Feed one byte. Returns the raw message it completes, if any.
    ///
    /// A message completes after three bytes (unless the running status is
    /// SysEx) or on a SysEx end byte.
    pub fn feed(&mut self, byte: u8) -> Option<Vec<u8>> {
        let is_status = is_status_byte(byte);
        match (self.state, is_status) {
            (BleParseState::JustCompleted, true) => {
                self.state = BleParseState::Idle;
                return None;
            }
            (BleParseState::JustCompleted, false) => {}
            (_, true) => {
                self.last_status = byte;
                self.state = BleParseState::AccumulatingMessage;
            }
            (_, false) => self.state = BleParseState::AccumulatingMessage,
        }

        if !is_status && self.current.is_empty() {
            // Running status: the status byte was omitted
            self.current.push(self.last_status);
        }
        self.current.push(byte);

        let complete = (self.current.len() == 3 && self.last_status != SYSEX_START)
            || byte == SYSEX_END;
        if complete {
            self.state = BleParseState::JustCompleted;
            Some(std::mem::take(&mut self.current))
        } else {
            None
        }
    }

    /// Split a full notification (timestamp bytes included) into raw
    /// messages, in the order they complete.
    ///
    /// A packet whose second byte is below 128 continues a SysEx message from
    /// an earlier packet. Those are not reassembled here and yield nothing.
    /// A trailing incomplete message is dropped.
    pub fn split_packet(packet: &[u8]) -> Vec<Vec<u8>> {
        if packet.len() < 2 {
            return Vec::new();
        }
        if !is_status_byte(packet[1]) {
            debug!(
                "BLE MIDI SysEx continuation ({} bytes) not reassembled, dropping",
                packet.len()
            );
            return Vec::new();
        }

        let mut parser = Self::new();
        packet[2..].iter().filter_map(|&b| parser.feed(b)).collect()
    }
}
