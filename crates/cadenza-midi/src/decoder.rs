//! Per-transport MIDI decoder.
//!
//! Three input shapes are handled: hardware packets ([`MidiPacket`]),
//! Bluetooth LE MIDI notifications, and stored file-chunk events. Raw byte
//! sequences from any other source go through [`MidiDecoder::decode_bytes`].
//!
//! Decoding never fails loudly. Input that cannot be classified, or that only
//! extends a pending SysEx message, produces no event. The file-chunk path is
//! the exception: a chunk without a type byte is reported as
//! [`Error::MalformedChunk`].

use std::sync::Arc;

use tracing::{trace, warn};

use crate::bluetooth::BleMidiParser;
use crate::error::{Error, Result};
use crate::event::MidiEvent;
use crate::file_chunk::FileChunkEvent;
use crate::packet::MidiPacket;
use crate::status::{
    is_status_byte, MessageLength, StatusType, SystemCommand, SYSEX_END, SYSEX_START,
};
use crate::sysex::{Continuation, SysexProgress, SysexReassembly, TransportId};

/// Decoder bound to one transport.
///
/// Decoders created from the same [`MidiInput`](crate::MidiInput) share one
/// SysEx reassembly state. Clone is cheap (Arc internally).
#[derive(Clone, Debug)]
pub struct MidiDecoder {
    transport: TransportId,
    sysex: Arc<SysexReassembly>,
}

impl MidiDecoder {
    pub fn new(transport: TransportId, sysex: Arc<SysexReassembly>) -> Self {
        Self { transport, sysex }
    }

    #[inline]
    pub fn transport(&self) -> TransportId {
        self.transport
    }

    #[inline]
    pub fn sysex(&self) -> &Arc<SysexReassembly> {
        &self.sysex
    }

    /// True while a SysEx message started by this decoder's transport is
    /// pending.
    pub fn is_receiving_sysex(&self) -> bool {
        self.sysex.is_receiving_from(self.transport)
    }

    // ==================== Hardware packets ====================

    /// Decode one hardware packet into at most one event.
    ///
    /// While this transport is receiving SysEx, a packet that does not start
    /// with `0xF0` is treated as a continuation and the whole message is
    /// emitted once its end byte arrives. Otherwise:
    /// - channel packets are taken as exactly three bytes,
    /// - packets led by a data byte produce no event,
    /// - SysEx start packets begin reassembly, discarding anything this
    ///   transport had buffered (and complete it immediately if the end byte
    ///   is in the same packet),
    /// - other system packets keep as many bytes as the command defines. Two-
    ///   byte commands skip slot 1, which carries a transport timing byte.
    pub fn decode_packet(&self, packet: &MidiPacket) -> Option<MidiEvent> {
        let timestamp = packet.timestamp;

        // A new start byte restarts reassembly instead of continuing it
        let starts_sysex = packet.length > 0 && packet.data[0] == SYSEX_START;
        if !starts_sysex {
            match self.sysex.append(self.transport, packet.bytes()) {
                Ok(SysexProgress::Idle) => {}
                progress => return self.complete_sysex(progress, timestamp),
            }
        }

        if packet.length == 0 {
            trace!("Empty packet on transport {}", self.transport);
            return None;
        }

        if !packet.is_system_command() {
            if !is_status_byte(packet.data[0]) {
                trace!(
                    "Packet on transport {} starts with data byte 0x{:02X}, dropping",
                    self.transport,
                    packet.data[0]
                );
                return None;
            }
            return MidiEvent::from_raw(&packet.data[..3], timestamp);
        }

        let status = packet.data[0];
        let Some(command) = SystemCommand::from_byte(status) else {
            trace!("Undefined system byte 0x{:02X}, dropping", status);
            return None;
        };

        match command.length() {
            MessageLength::Variable => {
                let progress = self.sysex.begin(self.transport, packet.bytes());
                self.complete_sysex(progress, timestamp)
            }
            MessageLength::Fixed(1) => MidiEvent::from_raw(&[status], timestamp),
            MessageLength::Fixed(2) => MidiEvent::from_raw(&[status, packet.data[2]], timestamp),
            MessageLength::Fixed(_) => MidiEvent::from_raw(&packet.data[..3], timestamp),
        }
    }

    /// Decode a packet list in order, keeping the packets that produced an
    /// event.
    pub fn decode_packet_list(&self, packets: &[MidiPacket]) -> Vec<MidiEvent> {
        packets
            .iter()
            .filter_map(|packet| self.decode_packet(packet))
            .collect()
    }

    fn complete_sysex(&self, progress: Result<SysexProgress>, timestamp: u64) -> Option<MidiEvent> {
        match progress {
            Ok(SysexProgress::Complete(bytes)) => {
                trace!(
                    "SysEx complete on transport {} ({} bytes)",
                    self.transport,
                    bytes.len()
                );
                MidiEvent::from_vec(bytes, timestamp)
            }
            Ok(SysexProgress::Pending | SysexProgress::Idle) => None,
            Err(e) => {
                warn!("Dropping SysEx on transport {}: {}", self.transport, e);
                None
            }
        }
    }

    // ==================== Raw bytes ====================

    /// Decode a raw byte sequence into at most one event.
    ///
    /// While this transport is receiving SysEx, the bytes are checked for the
    /// end byte only: if present, the event holds the bytes up to and
    /// including it and the pending state is cleared. The chunk is not added
    /// to the reassembly buffer. Otherwise the bytes are classified by
    /// [`MidiEvent::parse`].
    pub fn decode_bytes(&self, bytes: &[u8], timestamp: u64) -> Option<MidiEvent> {
        match self.sysex.terminate(self.transport, bytes) {
            Continuation::NotReceiving => MidiEvent::parse(bytes, timestamp),
            Continuation::Terminated(len) => MidiEvent::from_raw(&bytes[..len], timestamp),
            Continuation::Unterminated => {
                trace!(
                    "SysEx continuation without end byte on transport {}",
                    self.transport
                );
                None
            }
        }
    }

    // ==================== Bluetooth LE ====================

    /// Decode one BLE MIDI notification (timestamp bytes included).
    pub fn decode_bluetooth(&self, packet: &[u8]) -> Vec<MidiEvent> {
        self.decode_bluetooth_with_timestamp(packet, 0)
    }

    /// Decode one BLE MIDI notification, stamping every event with
    /// `timestamp`.
    pub fn decode_bluetooth_with_timestamp(&self, packet: &[u8], timestamp: u64) -> Vec<MidiEvent> {
        BleMidiParser::split_packet(packet)
            .iter()
            .filter_map(|raw| self.decode_bytes(raw, timestamp))
            .collect()
    }

    // ==================== File chunks ====================

    /// Decode a stored file-chunk event.
    ///
    /// SysEx chunks (type `0xF0` or `0xF7`) get their start byte restored,
    /// channel chunks use their canonical bytes, and anything else is kept
    /// verbatim for the caller to interpret.
    pub fn decode_file_chunk(
        &self,
        chunk: &FileChunkEvent,
        timestamp: u64,
    ) -> Result<Option<MidiEvent>> {
        let Some(type_byte) = chunk.type_byte else {
            warn!(
                "Bad MIDI file chunk - no type byte for data {:02X?}",
                chunk.event_data
            );
            return Err(Error::MalformedChunk);
        };

        let event = if type_byte == SYSEX_START || type_byte == SYSEX_END {
            self.decode_bytes(&chunk.sysex_bytes(), timestamp)
        } else if StatusType::from_byte(type_byte).is_some() {
            self.decode_bytes(&chunk.computed_data, timestamp)
        } else {
            MidiEvent::from_raw(&chunk.event_data, timestamp)
        };
        Ok(event)
    }

    /// Parse a Standard MIDI File and decode every track event.
    ///
    /// Events are stamped with their absolute tick and merged across tracks in
    /// tick order. Meta events are skipped.
    #[cfg(feature = "smf")]
    pub fn decode_smf(&self, data: &[u8]) -> Result<Vec<MidiEvent>> {
        let smf = midly::Smf::parse(data)?;
        if let midly::Timing::Timecode(_, _) = smf.header.timing {
            return Err(Error::UnsupportedTiming);
        }

        let mut events = Vec::new();
        for track in smf.tracks.iter() {
            let mut tick = 0u64;
            for event in track.iter() {
                tick += event.delta.as_int() as u64;
                let Some(chunk) = FileChunkEvent::from_track_event(&event.kind) else {
                    continue;
                };
                if let Some(decoded) = self.decode_file_chunk(&chunk, tick)? {
                    events.push(decoded);
                }
            }
        }

        // Stable: events at the same tick keep track order
        events.sort_by_key(|e| e.timestamp);

        tracing::debug!(
            "Decoded {} MIDI events from {} tracks",
            events.len(),
            smf.tracks.len()
        );
        Ok(events)
    }
}

impl Default for MidiDecoder {
    /// Standalone decoder with its own SysEx state.
    fn default() -> Self {
        Self::new(TransportId::default(), Arc::new(SysexReassembly::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet(bytes: &[u8]) -> MidiPacket {
        MidiPacket::new(0, bytes)
    }

    #[test]
    fn test_channel_packet_takes_three_bytes() {
        let decoder = MidiDecoder::default();
        let event = decoder.decode_packet(&packet(&[0x91, 60, 100, 0x55])).unwrap();
        assert_eq!(event.bytes(), &[0x91, 60, 100]);
        assert_eq!(event.channel(), Some(1));
        assert_eq!(event.note_number(), Some(60));
    }

    #[test]
    fn test_two_byte_channel_packet_keeps_padding() {
        let decoder = MidiDecoder::default();
        let event = decoder.decode_packet(&packet(&[0xC0, 5])).unwrap();
        assert_eq!(event.bytes(), &[0xC0, 5, 0]);
    }

    #[test]
    fn test_empty_packet() {
        let decoder = MidiDecoder::default();
        assert!(decoder.decode_packet(&MidiPacket::default()).is_none());
    }

    #[test]
    fn test_system_packet_lengths() {
        let decoder = MidiDecoder::default();

        let clock = decoder.decode_packet(&packet(&[0xF8, 0x11, 0x22])).unwrap();
        assert_eq!(clock.bytes(), &[0xF8]);

        // Slot 1 is skipped for two-byte commands
        let select = decoder.decode_packet(&packet(&[0xF3, 0x99, 0x07])).unwrap();
        assert_eq!(select.bytes(), &[0xF3, 0x07]);

        let position = decoder.decode_packet(&packet(&[0xF2, 0x01, 0x02])).unwrap();
        assert_eq!(position.bytes(), &[0xF2, 0x01, 0x02]);

        assert!(decoder.decode_packet(&packet(&[0xF4, 0x01])).is_none());
    }

    #[test]
    fn test_sysex_across_packets() {
        let decoder = MidiDecoder::default();
        assert!(decoder.decode_packet(&packet(&[0xF0, 0x01, 0x02])).is_none());
        assert!(decoder.is_receiving_sysex());

        let event = decoder
            .decode_packet(&MidiPacket::new(99, &[0x03, 0xF7]))
            .unwrap();
        assert_eq!(event.bytes(), &[0xF0, 0x01, 0x02, 0x03, 0xF7]);
        assert_eq!(event.timestamp, 99);
        assert!(!decoder.is_receiving_sysex());
    }

    #[test]
    fn test_sysex_single_packet() {
        let decoder = MidiDecoder::default();
        let event = decoder.decode_packet(&packet(&[0xF0, 0x01, 0xF7])).unwrap();
        assert_eq!(event.bytes(), &[0xF0, 0x01, 0xF7]);
        assert!(!decoder.is_receiving_sysex());
    }

    #[test]
    fn test_sysex_restart_from_same_transport() {
        let decoder = MidiDecoder::default();
        assert!(decoder.decode_packet(&packet(&[0xF0, 0x01, 0x02])).is_none());

        let event = decoder.decode_packet(&packet(&[0xF0, 0x05, 0xF7])).unwrap();
        assert_eq!(event.bytes(), &[0xF0, 0x05, 0xF7]);
        assert!(!decoder.is_receiving_sysex());
    }

    #[test]
    fn test_sysex_restart_keeps_receiving() {
        let decoder = MidiDecoder::default();
        decoder.decode_packet(&packet(&[0xF0, 0x01, 0x02]));
        assert!(decoder.decode_packet(&packet(&[0xF0, 0x09])).is_none());
        assert_eq!(decoder.sysex().pending_bytes(), vec![0xF0, 0x09]);

        let event = decoder.decode_packet(&packet(&[0x0A, 0xF7])).unwrap();
        assert_eq!(event.bytes(), &[0xF0, 0x09, 0x0A, 0xF7]);
    }

    #[test]
    fn test_data_led_packet_dropped() {
        let decoder = MidiDecoder::default();
        assert!(decoder.decode_packet(&packet(&[0x02, 0xF7])).is_none());
        assert!(decoder.decode_packet(&packet(&[0x40, 0x7F, 0x00])).is_none());
    }

    #[test]
    fn test_sysex_overflow_is_dropped() {
        let sysex = Arc::new(SysexReassembly::new(4, 4));
        let decoder = MidiDecoder::new(TransportId::new(1), sysex);
        assert!(decoder.decode_packet(&packet(&[0xF0, 0x01, 0x02])).is_none());
        assert!(decoder.decode_packet(&packet(&[0x03, 0x04, 0xF7])).is_none());
        assert!(!decoder.is_receiving_sysex());

        // Normal traffic resumes
        assert!(decoder.decode_packet(&packet(&[0x90, 60, 1])).is_some());
    }

    #[test]
    fn test_decode_bytes_unclassified() {
        let decoder = MidiDecoder::default();
        assert!(decoder.decode_bytes(&[0x00], 0).is_none());
        assert!(decoder.decode_bytes(&[], 0).is_none());
    }

    #[test]
    fn test_decode_bytes_terminates_pending_sysex() {
        let decoder = MidiDecoder::default();
        decoder.decode_packet(&packet(&[0xF0, 0x01]));

        assert!(decoder.decode_bytes(&[0x02, 0x03], 0).is_none());
        assert!(decoder.is_receiving_sysex());

        let tail = decoder.decode_bytes(&[0x04, 0xF7, 0x90], 5).unwrap();
        assert_eq!(tail.bytes(), &[0x04, 0xF7]);
        assert!(!decoder.is_receiving_sysex());
    }

    #[test]
    fn test_bluetooth_batch() {
        let decoder = MidiDecoder::default();
        let events = decoder.decode_bluetooth(&[0x80, 0x80, 0x90, 0x40, 0x7F, 0x3C, 0x7F]);
        let notes: Vec<_> = events.iter().map(|e| e.note_number()).collect();
        assert_eq!(notes, vec![Some(0x40), Some(0x3C)]);
        assert!(events.iter().all(MidiEvent::is_note_on));
    }

    #[test]
    fn test_bluetooth_timestamp() {
        let decoder = MidiDecoder::default();
        let events =
            decoder.decode_bluetooth_with_timestamp(&[0x80, 0x80, 0xB0, 0x07, 0x64], 1234);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].timestamp, 1234);
    }

    #[test]
    fn test_bluetooth_continuation_is_known_gap() {
        let decoder = MidiDecoder::default();
        assert!(decoder.decode_bluetooth(&[0x80, 0x10, 0x11, 0xF7]).is_empty());
    }

    #[test]
    fn test_file_chunk_missing_type() {
        let decoder = MidiDecoder::default();
        let chunk = FileChunkEvent::new(None, vec![1, 2, 3], Vec::new());
        assert_eq!(decoder.decode_file_chunk(&chunk, 0), Err(Error::MalformedChunk));
    }

    #[test]
    fn test_file_chunk_sysex() {
        let decoder = MidiDecoder::default();
        let chunk = FileChunkEvent::new(Some(0xF0), vec![0x43, 0x12, 0xF7], Vec::new());
        let event = decoder.decode_file_chunk(&chunk, 10).unwrap().unwrap();
        assert_eq!(event.bytes(), &[0xF0, 0x43, 0x12, 0xF7]);
        assert_eq!(event.timestamp, 10);

        let escape = FileChunkEvent::new(Some(0xF7), vec![0x01, 0x02], Vec::new());
        let event = decoder.decode_file_chunk(&escape, 0).unwrap().unwrap();
        assert_eq!(event.bytes(), &[0xF0, 0x01, 0x02]);
    }

    #[test]
    fn test_file_chunk_channel_uses_computed_data() {
        let decoder = MidiDecoder::default();
        let chunk = FileChunkEvent::new(Some(0x90), vec![0x3C], vec![0x90, 0x3C, 0x40]);
        let event = decoder.decode_file_chunk(&chunk, 0).unwrap().unwrap();
        assert_eq!(event.bytes(), &[0x90, 0x3C, 0x40]);
    }

    #[test]
    fn test_file_chunk_unknown_type_kept_raw() {
        let decoder = MidiDecoder::default();
        let chunk = FileChunkEvent::new(Some(0xFF), vec![0x2F, 0x00], Vec::new());
        let event = decoder.decode_file_chunk(&chunk, 0).unwrap().unwrap();
        assert_eq!(event.bytes(), &[0x2F, 0x00]);

        let empty = FileChunkEvent::new(Some(0xFF), Vec::new(), Vec::new());
        assert_eq!(decoder.decode_file_chunk(&empty, 0), Ok(None));
    }
}
