//! Serde support for MIDI events
//!
//! `MidiEvent` keeps its bytes private to guarantee they are never empty, so
//! it is (de)serialized through a plain mirror struct. Deserialization
//! rejects an empty byte sequence.

use crate::event::MidiEvent;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Serialize)]
struct SerializableMidiEventRef<'a> {
    timestamp: u64,
    bytes: &'a [u8],
}

#[derive(Deserialize)]
struct SerializableMidiEvent {
    timestamp: u64,
    bytes: Vec<u8>,
}

impl Serialize for MidiEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        SerializableMidiEventRef {
            timestamp: self.timestamp,
            bytes: self.bytes(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MidiEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let serializable = SerializableMidiEvent::deserialize(deserializer)?;
        MidiEvent::from_vec(serializable.bytes, serializable.timestamp)
            .ok_or_else(|| D::Error::custom("MIDI event must contain at least one byte"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bincode_roundtrip() {
        let events = vec![
            MidiEvent::note_on(100, 5, 60, 100),
            MidiEvent::pitch_bend(200, 0, 8192),
            MidiEvent::parse(&[0xF0, 0x7E, 0x00, 0xF7], 300).unwrap(),
        ];

        for event in events {
            let encoded = bincode::serialize(&event).unwrap();
            let decoded: MidiEvent = bincode::deserialize(&encoded).unwrap();
            assert_eq!(decoded, event);
        }
    }

    #[test]
    fn test_empty_bytes_rejected() {
        let empty = SerializableMidiEventRef {
            timestamp: 0,
            bytes: &[],
        };
        let encoded = bincode::serialize(&empty).unwrap();
        assert!(bincode::deserialize::<MidiEvent>(&encoded).is_err());
    }
}
