//! MIDI integration tests (requires the "midi" feature)
//!
//! Drives all three input paths through one MidiInput, the way an engine
//! wires its hardware port, Bluetooth characteristic and file loader.
//!
//! Run with:
//! ```bash
//! cargo test -p cadenza --test midi_integration
//! ```

#![cfg(feature = "midi")]

use cadenza::prelude::*;

#[test]
fn test_three_sources_one_input() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let input = MidiInput::builder().build().unwrap();
    let hardware = input.decoder(TransportId::new(0));
    let bluetooth = input.decoder(TransportId::new(1));
    let file = input.decoder(TransportId::new(2));

    let mut dispatched: Vec<MidiEvent> = Vec::new();

    // Hardware SysEx starts, Bluetooth notes arrive meanwhile
    dispatched.extend(hardware.decode_packet(&MidiPacket::new(1, &[0xF0, 0x43, 0x10])));
    dispatched.extend(bluetooth.decode_bluetooth_with_timestamp(
        &[0x80, 0x80, 0x90, 0x40, 0x7F, 0x3C, 0x7F],
        2,
    ));
    dispatched.extend(hardware.decode_packet(&MidiPacket::new(3, &[0x4C, 0xF7])));

    // A stored program change
    let chunk = FileChunkEvent::channel(&[0xC2, 0x05]);
    dispatched.extend(file.decode_file_chunk(&chunk, 4).unwrap());

    assert_eq!(dispatched.len(), 4);
    assert_eq!(dispatched[0].note_number(), Some(0x40));
    assert_eq!(dispatched[1].note_number(), Some(0x3C));
    assert_eq!(dispatched[2].bytes(), &[0xF0, 0x43, 0x10, 0x4C, 0xF7]);
    assert_eq!(dispatched[2].timestamp, 3);
    assert_eq!(
        dispatched[3].status(),
        Some(Status {
            kind: StatusType::ProgramChange,
            channel: 2
        })
    );
    assert!(!input.is_receiving_sysex());
}

#[test]
fn test_system_realtime_through_packets() {
    let decoder = MidiDecoder::default();
    let clock = decoder
        .decode_packet(&MidiPacket::new(0, &[0xF8]))
        .unwrap();
    assert_eq!(clock.bytes(), &[SystemCommand::Clock as u8]);

    let start = decoder
        .decode_packet(&MidiPacket::new(0, &[0xFA]))
        .unwrap();
    assert_eq!(start.bytes(), &[0xFA]);
}

#[cfg(feature = "smf")]
#[test]
fn test_file_decoding_through_umbrella() {
    let data = [
        0x4D, 0x54, 0x68, 0x64, 0x00, 0x00, 0x00, 0x06, // MThd
        0x00, 0x00, 0x00, 0x01, 0x00, 0x60, // format 0, 1 track, 96 tpq
        0x4D, 0x54, 0x72, 0x6B, 0x00, 0x00, 0x00, 0x08, // MTrk
        0x00, 0xB0, 0x07, 0x64, // volume
        0x00, 0xFF, 0x2F, 0x00, // end of track
    ];
    let events = cadenza::midi::MidiDecoder::default()
        .decode_smf(&data)
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].bytes(), &[0xB0, 0x07, 0x64]);
}
