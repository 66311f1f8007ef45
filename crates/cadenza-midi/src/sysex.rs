//! SysEx reassembly state shared by every decoder of one MIDI input.
//!
//! A SysEx message can span many transport deliveries, so the bytes seen since
//! the last `0xF0` have to outlive a single decode call. The state is tagged
//! with the transport that started the message: only that transport may
//! continue or restart it, and a start from any other transport is rejected
//! until the message terminates or is reset.

use core::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::status::SYSEX_END;

/// Identifies the transport a decoder reads from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransportId(pub u32);

impl TransportId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for TransportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of feeding bytes into the reassembly buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SysexProgress {
    /// The transport is not receiving SysEx; nothing was buffered.
    Idle,
    /// Bytes were buffered; no end byte yet.
    Pending,
    /// The message terminated. Holds everything from `0xF0` through the first
    /// `0xF7`, and the state is cleared.
    Complete(Vec<u8>),
}

/// Result of checking an unbuffered chunk for the end of a SysEx message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Continuation {
    NotReceiving,
    /// No end byte in the chunk; the state stays receiving.
    Unterminated,
    /// The chunk's first `len` bytes end the message; the state is cleared.
    Terminated(usize),
}

#[derive(Debug, Default)]
struct SysexState {
    owner: Option<TransportId>,
    buffer: Vec<u8>,
}

impl SysexState {
    fn clear(&mut self) {
        self.owner = None;
        self.buffer.clear();
    }

    /// Append `bytes`, enforcing `limit`. On completion the buffer is handed
    /// out and the state cleared.
    fn push(&mut self, bytes: &[u8], limit: usize) -> Result<SysexProgress> {
        let end = bytes.iter().position(|&b| b == SYSEX_END);
        let take = end.map_or(bytes.len(), |i| i + 1);

        if self.buffer.len() + take > limit {
            self.clear();
            return Err(Error::SysexOverflow { limit });
        }
        self.buffer.extend_from_slice(&bytes[..take]);

        if end.is_some() {
            let message = std::mem::take(&mut self.buffer);
            self.owner = None;
            Ok(SysexProgress::Complete(message))
        } else {
            Ok(SysexProgress::Pending)
        }
    }
}

/// Shared SysEx reassembly state.
///
/// One instance belongs to a [`MidiInput`](crate::MidiInput) and is shared by
/// all of its decoders. Every operation takes the lock once, so a decode call
/// sees a consistent state even when transports deliver on different threads.
#[derive(Debug)]
pub struct SysexReassembly {
    state: Mutex<SysexState>,
    max_len: usize,
    capacity: usize,
}

impl SysexReassembly {
    pub fn new(max_len: usize, capacity: usize) -> Self {
        Self {
            state: Mutex::new(SysexState {
                owner: None,
                buffer: Vec::with_capacity(capacity),
            }),
            max_len,
            capacity,
        }
    }

    #[inline]
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn is_receiving(&self) -> bool {
        self.state.lock().owner.is_some()
    }

    pub fn is_receiving_from(&self, transport: TransportId) -> bool {
        self.state.lock().owner == Some(transport)
    }

    /// Transport currently receiving SysEx, if any.
    pub fn owner(&self) -> Option<TransportId> {
        self.state.lock().owner
    }

    pub fn buffered_len(&self) -> usize {
        self.state.lock().buffer.len()
    }

    /// Copy of the bytes accumulated so far.
    pub fn pending_bytes(&self) -> Vec<u8> {
        self.state.lock().buffer.clone()
    }

    /// Start a message with `bytes` (which should begin with `0xF0`).
    ///
    /// Discards anything previously buffered by the same transport. Fails with
    /// [`Error::SysexInProgress`] if another transport owns the state.
    pub fn begin(&self, transport: TransportId, bytes: &[u8]) -> Result<SysexProgress> {
        let mut state = self.state.lock();
        if let Some(owner) = state.owner {
            if owner != transport {
                return Err(Error::SysexInProgress {
                    owner,
                    requested: transport,
                });
            }
            debug!(
                "Transport {} restarted SysEx, discarding {} buffered bytes",
                transport,
                state.buffer.len()
            );
        }

        state.clear();
        if state.buffer.capacity() == 0 {
            state.buffer.reserve(self.capacity);
        }
        state.owner = Some(transport);
        state.push(bytes, self.max_len)
    }

    /// Append a continuation chunk from `transport`.
    ///
    /// Returns [`SysexProgress::Idle`] without buffering when the transport is
    /// not the one receiving.
    pub fn append(&self, transport: TransportId, bytes: &[u8]) -> Result<SysexProgress> {
        let mut state = self.state.lock();
        if state.owner != Some(transport) {
            return Ok(SysexProgress::Idle);
        }
        state.push(bytes, self.max_len)
    }

    /// Check a chunk for the end byte without buffering it.
    ///
    /// When `transport` is receiving and the chunk holds `0xF7`, the state is
    /// cleared and the length of the terminating prefix returned.
    pub fn terminate(&self, transport: TransportId, bytes: &[u8]) -> Continuation {
        let mut state = self.state.lock();
        if state.owner != Some(transport) {
            return Continuation::NotReceiving;
        }
        match bytes.iter().position(|&b| b == SYSEX_END) {
            Some(end) => {
                state.clear();
                Continuation::Terminated(end + 1)
            }
            None => Continuation::Unterminated,
        }
    }

    /// Abort any in-progress message.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        if let Some(owner) = state.owner {
            debug!(
                "Aborting SysEx from transport {} ({} bytes buffered)",
                owner,
                state.buffer.len()
            );
        }
        state.clear();
    }
}

impl Default for SysexReassembly {
    fn default() -> Self {
        Self::new(crate::input::DEFAULT_MAX_SYSEX_LEN, crate::input::DEFAULT_SYSEX_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: TransportId = TransportId::new(1);
    const B: TransportId = TransportId::new(2);

    #[test]
    fn test_two_chunk_message() {
        let sysex = SysexReassembly::default();
        assert_eq!(sysex.begin(A, &[0xF0, 0x01, 0x02]), Ok(SysexProgress::Pending));
        assert!(sysex.is_receiving());
        assert!(sysex.is_receiving_from(A));
        assert_eq!(sysex.buffered_len(), 3);

        let done = sysex.append(A, &[0x03, 0xF7]).unwrap();
        assert_eq!(
            done,
            SysexProgress::Complete(vec![0xF0, 0x01, 0x02, 0x03, 0xF7])
        );
        assert!(!sysex.is_receiving());
        assert_eq!(sysex.buffered_len(), 0);
    }

    #[test]
    fn test_single_chunk_message_truncates_after_end() {
        let sysex = SysexReassembly::default();
        let done = sysex.begin(A, &[0xF0, 0x01, 0xF7, 0x90, 0x40]).unwrap();
        assert_eq!(done, SysexProgress::Complete(vec![0xF0, 0x01, 0xF7]));
        assert!(!sysex.is_receiving());
    }

    #[test]
    fn test_other_transport_rejected() {
        let sysex = SysexReassembly::default();
        sysex.begin(A, &[0xF0, 0x01]).unwrap();

        let err = sysex.begin(B, &[0xF0, 0x02]).unwrap_err();
        assert_eq!(
            err,
            Error::SysexInProgress {
                owner: A,
                requested: B
            }
        );
        // A's message is untouched
        assert_eq!(sysex.pending_bytes(), vec![0xF0, 0x01]);
        assert_eq!(sysex.append(B, &[0xF7]), Ok(SysexProgress::Idle));
        assert_eq!(sysex.owner(), Some(A));
    }

    #[test]
    fn test_same_transport_restart() {
        let sysex = SysexReassembly::default();
        sysex.begin(A, &[0xF0, 0x01, 0x02]).unwrap();
        sysex.begin(A, &[0xF0, 0x09]).unwrap();
        assert_eq!(sysex.pending_bytes(), vec![0xF0, 0x09]);
    }

    #[test]
    fn test_overflow_clears_state() {
        let sysex = SysexReassembly::new(4, 4);
        sysex.begin(A, &[0xF0, 0x01, 0x02]).unwrap();
        let err = sysex.append(A, &[0x03, 0x04]).unwrap_err();
        assert_eq!(err, Error::SysexOverflow { limit: 4 });
        assert!(!sysex.is_receiving());

        // An end byte that fits exactly is fine
        sysex.begin(A, &[0xF0, 0x01, 0x02]).unwrap();
        assert!(matches!(
            sysex.append(A, &[0xF7, 0x55, 0x66]),
            Ok(SysexProgress::Complete(_))
        ));
    }

    #[test]
    fn test_terminate() {
        let sysex = SysexReassembly::default();
        assert_eq!(sysex.terminate(A, &[0x01, 0xF7]), Continuation::NotReceiving);

        sysex.begin(A, &[0xF0, 0x01]).unwrap();
        assert_eq!(sysex.terminate(A, &[0x02, 0x03]), Continuation::Unterminated);
        assert!(sysex.is_receiving());
        assert_eq!(sysex.terminate(B, &[0xF7]), Continuation::NotReceiving);
        assert_eq!(sysex.terminate(A, &[0x04, 0xF7, 0x00]), Continuation::Terminated(2));
        assert!(!sysex.is_receiving());
    }

    #[test]
    fn test_reset() {
        let sysex = SysexReassembly::default();
        sysex.begin(A, &[0xF0, 0x01]).unwrap();
        sysex.reset();
        assert!(!sysex.is_receiving());
        assert!(sysex.pending_bytes().is_empty());
        // B may start now
        assert!(sysex.begin(B, &[0xF0]).is_ok());
    }

    #[test]
    fn test_transport_display() {
        assert_eq!(TransportId::new(7).to_string(), "#7");
    }
}
