#![no_main]

use libfuzzer_sys::fuzz_target;
use blockrs::{BlockConfig, BlockReader, HashConfig, Padding};

fuzz_target!(|data: Vec<u8>| {
    let configs = vec![
        BlockConfig::new(1).unwrap(),
        BlockConfig::new(7).unwrap(),
        BlockConfig::new(512).unwrap(),
        BlockConfig::new(16)
            .unwrap()
            .with_emit_partial(false)
            .with_padding(Padding::pattern("XYZ")),
        BlockConfig::default(),
    ];

    for config in configs {
        let block_size = config.block_size();
        let padded = !config.emit_partial();
        let blocks = BlockReader::new(config.clone())
            .block_bytes(data.clone())
            .unwrap();

        // Verify: every block but the last is full; padded streams are all full
        for (i, block) in blocks.iter().enumerate() {
            if padded || i + 1 < blocks.len() {
                assert_eq!(block.len(), block_size);
            } else {
                assert!(block.len() <= block_size && !block.is_empty());
            }
        }

        // Verify: input is a prefix of the output, and exact without padding
        let joined: Vec<u8> = blocks.iter().flat_map(|b| b.data.iter().copied()).collect();
        assert!(joined.starts_with(&data));
        if !padded {
            assert_eq!(joined, data);
        }

        // Verify: offsets are correct
        let mut expected_offset = 0u64;
        for block in &blocks {
            assert_eq!(block.offset, Some(expected_offset));
            expected_offset += block.len().min(data.len() - expected_offset as usize) as u64;
        }
    }

    // Test with hashing enabled
    let config = BlockConfig::new(64)
        .unwrap()
        .with_hash_config(HashConfig::enabled());
    let reader = BlockReader::new(config);
    let blocks = reader.block_bytes(data.clone()).unwrap();
    let again = reader.block_bytes(data).unwrap();

    // Verify: same content produces same hash
    for (b1, b2) in blocks.iter().zip(again.iter()) {
        assert!(b1.hash.is_some());
        assert_eq!(b1.hash, b2.hash);
    }
});
