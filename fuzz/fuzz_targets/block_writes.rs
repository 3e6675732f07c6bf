#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use blockrs::{BlockConfig, BlockProcessor, StreamEvent};

fuzz_target!(|input: (u8, Vec<u8>, Vec<u8>)| {
    let (block_size, splits, data) = input;
    let block_size = usize::from(block_size).max(1);
    let config = BlockConfig::new(block_size).unwrap();
    let data = Bytes::from(data);

    // Feed the input in fuzzer-chosen pieces, pausing on every odd piece.
    let mut processor = BlockProcessor::new(config, Vec::new()).unwrap();
    let mut pos = 0;
    for (i, step) in splits.iter().map(|&s| usize::from(s)).enumerate() {
        if pos >= data.len() {
            break;
        }
        let end = (pos + step).min(data.len());
        if i % 2 == 1 {
            processor.pause();
        }
        processor.write(data.slice(pos..end)).unwrap();
        processor.resume();
        pos = end;
    }
    processor.end_with(data.slice(pos..));

    let events = processor.into_sink();
    assert!(matches!(events.last(), Some(StreamEvent::End)));
    assert!(!events.iter().any(|e| matches!(e, StreamEvent::Error(_))));

    // Verify: re-chunking never loses, reorders or invents bytes
    let joined: Vec<u8> = events
        .into_iter()
        .filter_map(StreamEvent::into_block)
        .flat_map(|b| b.data.to_vec())
        .collect();
    assert_eq!(joined, data);
});
