use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread;

use rand::prelude::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::{IndexError, MAX_HEIGHT, RadixIndex};

#[test]
fn small_insert() {
    let key_cnt = 10_000u64;
    let mut tree = RadixIndex::default();

    for k in 0..key_cnt {
        tree.insert(k, k as usize).unwrap();
        let v = tree.get(k).unwrap();
        assert_eq!(v, k as usize);
    }
    assert_eq!(tree.len(), key_cnt as usize);
    tree.validate();
}

#[test]
fn reference_scenario() {
    let mut tree = RadixIndex::new(2);
    assert_eq!(tree.max_key(), (1 << 18) - 1);

    for i in 0..100u64 {
        tree.insert(i, i as usize + 1).unwrap();
    }
    for i in 0..100u64 {
        assert_eq!(tree.get(i), Some(i as usize + 1));
    }

    // root, one node at height 1, two at height 0 (keys 0..64 and 64..100)
    assert_eq!(tree.node_count(), (4, 100));
    tree.validate();

    for i in 0..100u64 {
        assert_eq!(tree.remove(i), Some(i as usize + 1));
    }
    for i in 0..100u64 {
        assert!(tree.get(i).is_none());
    }

    // internal nodes are not collapsed on delete
    assert_eq!(tree.node_count(), (4, 0));
    assert!(tree.is_empty());
    tree.validate();
}

#[test]
fn test_sparse_keys() {
    let key_cnt = 50_000;
    let mut tree = RadixIndex::default();
    let mut r = StdRng::seed_from_u64(42);

    let mut seen = HashSet::with_capacity(key_cnt);
    let mut keys = Vec::<u64>::with_capacity(key_cnt);
    while keys.len() < key_cnt {
        let k = r.r#gen::<u64>();
        if seen.insert(k) {
            keys.push(k);
            tree.insert(k, k as usize).unwrap();
        }
    }

    let delete_cnt = key_cnt / 2;

    for k in keys.iter().take(delete_cnt) {
        assert_eq!(tree.remove(*k), Some(*k as usize));
    }

    for k in keys.iter().take(delete_cnt) {
        assert!(tree.get(*k).is_none());
    }

    for k in keys.iter().skip(delete_cnt) {
        assert_eq!(tree.get(*k), Some(*k as usize));
    }

    assert_eq!(tree.len(), key_cnt - delete_cnt);
    tree.validate();
}

#[test]
fn duplicate_insert_leaves_tree_untouched() {
    let mut tree = RadixIndex::new(2);

    // 5 sits as a compressed leaf right under the root
    tree.insert(5, 50).unwrap();
    let before = tree.node_count();
    assert_eq!(tree.insert(5, 51), Err(IndexError::DuplicateKey { key: 5 }));
    assert_eq!(tree.node_count(), before);
    assert_eq!(tree.get(5), Some(50));

    // and at the bottom of the tree, after a split
    tree.insert(6, 60).unwrap();
    let before = tree.node_count();
    assert_eq!(tree.insert(6, 61), Err(IndexError::DuplicateKey { key: 6 }));
    assert_eq!(tree.insert(5, 52), Err(IndexError::DuplicateKey { key: 5 }));
    assert_eq!(tree.node_count(), before);
    assert_eq!(tree.get(5), Some(50));
    assert_eq!(tree.get(6), Some(60));
    assert_eq!(tree.len(), 2);
    tree.validate();
}

#[test]
fn lookup_checks_compressed_leaf() {
    let mut tree = RadixIndex::new(3);
    tree.insert(0x10, 1).unwrap();

    // same root digit, different residual
    assert_eq!(tree.get(0x11), None);
    assert_eq!(tree.get(0x1_0010), None);
    assert_eq!(tree.remove(0x11), None);
    assert_eq!(tree.get(0x10), Some(1));
}

#[test]
fn remove_detaches_the_right_slot() {
    let mut tree = RadixIndex::new(1);
    let base = 5 << 6;
    for d in [0u64, 3, 17, 63] {
        tree.insert(base + d, d as usize).unwrap();
    }

    assert_eq!(tree.remove(base + 17), Some(17));
    assert_eq!(tree.get(base), Some(0));
    assert_eq!(tree.get(base + 3), Some(3));
    assert_eq!(tree.get(base + 63), Some(63));
    assert_eq!(tree.get(base + 17), None);

    assert_eq!(tree.remove(base), Some(0));
    assert_eq!(tree.get(base + 3), Some(3));
    assert_eq!(tree.get(base + 63), Some(63));
    tree.validate();
}

#[test]
fn remove_absent_key_is_noop() {
    let mut tree = RadixIndex::new(4);
    tree.insert(1000, 1).unwrap();
    let before = tree.node_count();

    assert_eq!(tree.remove(1001), None);
    assert_eq!(tree.remove(tree.max_key() + 1), None);
    assert_eq!(tree.node_count(), before);
    assert_eq!(tree.len(), 1);
}

#[test]
fn reinsert_after_remove() {
    let mut tree = RadixIndex::new(2);
    for round in 0..3usize {
        for k in (0..200u64).step_by(7) {
            tree.insert(k, k as usize + round).unwrap();
        }
        for k in (0..200u64).step_by(7) {
            assert_eq!(tree.remove(k), Some(k as usize + round));
        }
    }
    assert!(tree.is_empty());
    tree.validate();
}

#[test]
fn lone_keys_stay_compressed() {
    let mut tree = RadixIndex::new(MAX_HEIGHT);

    // the top digit only has 4 bits at height 10
    for i in 0..16u64 {
        tree.insert(i << 60 | 0xdead_beef, i as usize).unwrap();
    }
    assert_eq!(tree.node_count(), (1, 16));

    for i in 0..16u64 {
        assert_eq!(tree.get(i << 60 | 0xdead_beef), Some(i as usize));
    }
    tree.validate();
}

#[test]
fn sparse_keys_scale_with_key_count() {
    let key_cnt = 1_000;
    let mut tree = RadixIndex::new(MAX_HEIGHT);
    let mut r = StdRng::seed_from_u64(7);
    let mut inserted = 0;
    while inserted < key_cnt {
        if tree.insert(r.r#gen::<u64>(), 0).is_ok() {
            inserted += 1;
        }
    }

    // without compression every key would sit under ten internal nodes
    let (internal, leaves) = tree.node_count();
    assert_eq!(leaves, key_cnt);
    assert!(internal < key_cnt, "{internal} internal nodes for {key_cnt} keys");
}

#[test]
fn height_zero_tree() {
    let mut tree = RadixIndex::new(0);
    assert_eq!(tree.max_key(), 63);

    for k in 0..64u64 {
        tree.insert(k, k as usize).unwrap();
    }
    assert_eq!(
        tree.insert(64, 0),
        Err(IndexError::InvalidKey { key: 64, height: 0 })
    );
    assert_eq!(tree.node_count(), (1, 64));

    for k in 0..64u64 {
        assert_eq!(tree.get(k), Some(k as usize));
    }
    assert_eq!(tree.get(64), None);
    tree.validate();
}

#[test]
fn full_width_keys() {
    let mut tree = RadixIndex::new(MAX_HEIGHT);
    let keys = [
        0,
        1,
        u64::MAX,
        u64::MAX - 1,
        1 << 63,
        (1 << 63) + 1,
        0x0fff_ffff_ffff_ffff,
    ];
    for (i, k) in keys.iter().enumerate() {
        tree.insert(*k, i).unwrap();
    }
    for (i, k) in keys.iter().enumerate() {
        assert_eq!(tree.get(*k), Some(i));
    }
    tree.validate();

    for k in keys.iter() {
        assert!(tree.remove(*k).is_some());
    }
    assert!(tree.is_empty());
}

#[test]
fn invalid_key_rejected() {
    let mut tree = RadixIndex::new(2);
    let before = tree.node_count();

    let too_wide = 1 << 18;
    assert_eq!(
        tree.insert(too_wide, 1),
        Err(IndexError::InvalidKey {
            key: too_wide,
            height: 2
        })
    );
    assert_eq!(tree.node_count(), before);
    assert!(tree.get(too_wide).is_none());
    assert!(!tree.contains_key(too_wide));

    // the low bits alone are a different, valid key
    tree.insert(0, 1).unwrap();
    assert!(tree.get(too_wide).is_none());
}

#[test]
fn invalid_height_rejected() {
    assert!(matches!(
        RadixIndex::try_new(MAX_HEIGHT + 1),
        Err(IndexError::InvalidHeight { height: 11, max: 10 })
    ));
}

#[should_panic]
#[test]
fn new_panics_on_invalid_height() {
    let _tree = RadixIndex::new(u8::MAX);
}

#[test]
fn test_rng_insert_read_back() {
    let key_cnt = 30_000;
    let mut key_space: Vec<u64> = (0..key_cnt).collect();

    let mut r = StdRng::seed_from_u64(42);
    key_space.shuffle(&mut r);

    let mut tree = RadixIndex::new(3);

    for v in key_space.iter() {
        tree.insert(*v, *v as usize).unwrap();
    }

    for i in 0..key_cnt {
        assert_eq!(tree.get(i), Some(i as usize));
    }

    for i in key_cnt..2 * key_cnt {
        assert!(tree.get(i).is_none());
    }
    tree.validate();
}

#[test]
fn shared_behind_mutex() {
    let key_cnt_per_thread = 2_000;
    let n_thread = 3;
    let mut key_space: Vec<u64> = (0..(key_cnt_per_thread * n_thread) as u64).collect();
    let mut r = StdRng::seed_from_u64(42);
    key_space.shuffle(&mut r);

    let key_space = Arc::new(key_space);
    let tree = Arc::new(Mutex::new(RadixIndex::new(4)));

    let mut handlers = Vec::new();
    for t in 0..n_thread {
        let key_space = key_space.clone();
        let tree = tree.clone();

        handlers.push(thread::spawn(move || {
            for i in 0..key_cnt_per_thread {
                let idx = t * key_cnt_per_thread + i;
                let val = key_space[idx];
                tree.lock().unwrap().insert(val, val as usize).unwrap();
            }
        }));
    }

    for h in handlers.into_iter() {
        h.join().unwrap();
    }

    let tree = tree.lock().unwrap();
    for v in key_space.iter() {
        assert_eq!(tree.get(*v), Some(*v as usize));
    }
    tree.validate();
}
