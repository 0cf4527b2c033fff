use framewire::core::{AudioBlock, Buffer, DataType, Payload, VideoFrame};

fn frame_buffer(sequence: u64) -> Buffer {
    let frame = VideoFrame::with_pixels(2, 2, vec![1, 2, 3, 4]);
    Buffer::new(Payload::Frame(frame), sequence)
}

#[test]
fn test_buffer_creation() {
    let buffer = frame_buffer(7);

    assert_eq!(buffer.data_type(), DataType::Frame);
    assert_eq!(buffer.sequence(), 7);
    assert_eq!(buffer.ref_count(), 1);
    assert!(buffer.is_exclusive());
}

#[test]
fn test_buffer_clone_shares_payload() {
    let buffer = frame_buffer(0);
    let clone = buffer.clone();

    assert_eq!(buffer.ref_count(), 2);
    assert_eq!(clone.ref_count(), 2);

    // both handles point at the same pixel storage
    let (Payload::Frame(a), Payload::Frame(b)) = (buffer.payload(), clone.payload()) else {
        panic!("expected frame payloads");
    };
    assert_eq!(a.pixels.as_ptr(), b.pixels.as_ptr());
}

#[test]
fn test_mutation_denied_while_shared() {
    let mut buffer = frame_buffer(0);
    let clone = buffer.clone();

    assert!(buffer.try_payload_mut().is_none());

    drop(clone);
    assert!(buffer.try_payload_mut().is_some());
}

#[test]
fn test_owned_payload_is_a_copy() {
    let buffer = frame_buffer(0);
    let clone = buffer.clone();

    let mut owned = buffer.to_owned_payload();
    if let Payload::Frame(frame) = &mut owned {
        frame.pixels[0] = 99;
    }

    let Payload::Frame(original) = clone.payload() else {
        panic!("expected frame payload");
    };
    assert_eq!(original.pixels[0], 1);
}

#[test]
fn test_payload_type_tags() {
    let frame = frame_buffer(0);
    assert_eq!(frame.data_type(), DataType::Frame);

    let audio = Buffer::new(
        Payload::Audio(AudioBlock {
            sample_rate: 48000,
            samples: vec![0.0; 16],
        }),
        0,
    );
    assert_eq!(audio.data_type(), DataType::Audio);

    let trigger = Buffer::new(Payload::Trigger, 0);
    assert_eq!(trigger.data_type(), DataType::Trigger);
}

#[test]
fn test_data_type_parse_roundtrip() {
    for data_type in [DataType::Frame, DataType::Audio, DataType::Trigger] {
        assert_eq!(DataType::parse(data_type.as_str()), Some(data_type));
    }
    assert_eq!(DataType::parse("bogus"), None);
}
