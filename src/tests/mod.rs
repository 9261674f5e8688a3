use std::sync::{Arc, Mutex};

use crate::{DefaultTracker, RadixIndex};

mod tree;


#[test]
fn drop_with_drainer() {
    let drained = Arc::new(Mutex::new(Vec::new()));

    let drained_inner = drained.clone();
    let drain_function = move |k: u64, v: usize| {
        drained_inner.lock().unwrap().push((k, v));
    };

    let mut tree = RadixIndex::new_with_drainer(3, DefaultTracker {}, drain_function).unwrap();
    tree.insert(1, 42).unwrap();
    drop(tree);
    assert_eq!(*drained.lock().unwrap(), vec![(1, 42)]);
}
