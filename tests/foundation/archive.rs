//! Integration tests for binary archive framing
//!
//! Tests layout, limits, and truncation handling of the reader and writer.

use serde::{Deserialize, Serialize};
use tessera_foundation::{BinaryReader, BinaryWriter, DEFAULT_MAX_SEQUENCE_LEN, Entity, ErrorKind};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Transform {
    position: [f32; 3],
    scale: f32,
}

#[test]
fn mixed_stream_reads_back_in_order() {
    let transform = Transform {
        position: [1.0, 2.0, 3.0],
        scale: 0.5,
    };

    let mut writer = BinaryWriter::new(Vec::new());
    writer.write_entities(&[Entity::from_raw(4)]).unwrap();
    writer.write_str("transform").unwrap();
    writer.write_value(&transform).unwrap();
    writer.write_indices(&[u32::MAX, 0]).unwrap();
    let bytes = writer.into_inner();

    let mut reader = BinaryReader::new(bytes.as_slice());
    assert_eq!(reader.read_entities().unwrap(), vec![Entity::from_raw(4)]);
    assert_eq!(reader.read_string().unwrap(), "transform");
    assert_eq!(reader.read_value::<Transform>().unwrap(), transform);
    assert_eq!(reader.read_indices().unwrap(), vec![u32::MAX, 0]);
}

#[test]
fn string_layout_is_length_prefixed_utf8() {
    let mut writer = BinaryWriter::new(Vec::new());
    writer.write_str("ab").unwrap();
    assert_eq!(writer.into_inner(), vec![2, 0, 0, 0, b'a', b'b']);
}

#[test]
fn default_limit_applies() {
    let reader = BinaryReader::new(std::io::empty());
    assert_eq!(reader.max_sequence_len(), DEFAULT_MAX_SEQUENCE_LEN);
}

#[test]
fn oversized_prefix_is_rejected_before_allocation() {
    // A length prefix of u32::MAX with no payload behind it.
    let bytes = [0xFF, 0xFF, 0xFF, 0xFF];
    let mut reader = BinaryReader::new(bytes.as_slice());
    let err = reader.read_entities().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::SequenceTooLong { .. }));
}

#[test]
fn invalid_utf8_is_codec_error() {
    let bytes = [2, 0, 0, 0, 0xC3, 0x28];
    let mut reader = BinaryReader::new(bytes.as_slice());
    let err = reader.read_string().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Codec(_)));
}

#[test]
fn empty_input_is_truncated() {
    let mut reader = BinaryReader::new(std::io::empty());
    let err = reader.read_u32().unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::Truncated {
            expected: 4,
            available: 0
        }
    ));
}
