//! MidiInput builder for configuring SysEx limits.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::sysex::SysexReassembly;

use super::{MidiInput, DEFAULT_MAX_SYSEX_LEN, DEFAULT_SYSEX_CAPACITY};

pub struct MidiInputBuilder {
    pub(super) max_sysex_len: usize,
    pub(super) sysex_capacity: usize,
}

impl Default for MidiInputBuilder {
    fn default() -> Self {
        Self {
            max_sysex_len: DEFAULT_MAX_SYSEX_LEN,
            sysex_capacity: DEFAULT_SYSEX_CAPACITY,
        }
    }
}

impl MidiInputBuilder {
    /// Longest SysEx message (start and end bytes included) that will be
    /// reassembled. Longer messages are dropped.
    pub fn max_sysex_len(mut self, len: usize) -> Self {
        self.max_sysex_len = len;
        self
    }

    /// Initial allocation for the reassembly buffer.
    pub fn sysex_capacity(mut self, capacity: usize) -> Self {
        self.sysex_capacity = capacity;
        self
    }

    pub fn build(self) -> Result<MidiInput> {
        if self.max_sysex_len < 2 {
            return Err(Error::InvalidConfig(format!(
                "max_sysex_len must be at least 2, got {}",
                self.max_sysex_len
            )));
        }
        if self.sysex_capacity > self.max_sysex_len {
            return Err(Error::InvalidConfig(format!(
                "sysex_capacity ({}) exceeds max_sysex_len ({})",
                self.sysex_capacity, self.max_sysex_len
            )));
        }

        Ok(MidiInput {
            sysex: Arc::new(SysexReassembly::new(
                self.max_sysex_len,
                self.sysex_capacity,
            )),
        })
    }
}
