#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use radix_index::{IndexError, RadixIndex};
use std::collections::BTreeMap;

#[derive(Arbitrary, Debug)]
enum MapMethod {
    Get { key: u64 },
    Insert { key: u64, val: usize },
    Delete { key: u64 },
}

#[derive(Arbitrary, Debug)]
struct Input {
    height: u8,
    methods: Vec<MapMethod>,
}

fuzz_target!(|input: Input| {
    let height = input.height % (radix_index::MAX_HEIGHT + 1);
    let mut tree = RadixIndex::new(height);
    let mut bt_map = BTreeMap::new();

    for m in input.methods.iter() {
        match m {
            MapMethod::Get { key } => {
                assert_eq!(tree.get(*key), bt_map.get(key).copied());
            }
            MapMethod::Insert { key, val } => {
                let rv = tree.insert(*key, *val);
                if *key > tree.max_key() {
                    assert_eq!(rv, Err(IndexError::InvalidKey { key: *key, height }));
                } else if bt_map.contains_key(key) {
                    assert_eq!(rv, Err(IndexError::DuplicateKey { key: *key }));
                } else {
                    assert_eq!(rv, Ok(()));
                    bt_map.insert(*key, *val);
                }
            }
            MapMethod::Delete { key } => {
                assert_eq!(tree.remove(*key), bt_map.remove(key));
            }
        }
    }

    assert_eq!(tree.len(), bt_map.len());
    for (k, v) in bt_map.iter() {
        assert_eq!(tree.get(*k).unwrap(), *v);
    }
});
