use radix_index::RadixIndex;
use rand::{Rng, thread_rng};
use serde::{Deserialize, Serialize};
use shumai::{ShumaiBench, config};
use std::{
    cell::UnsafeCell,
    collections::{BTreeMap, HashMap},
    fmt::Display,
};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Serialize, Clone, Copy, Debug, Deserialize)]
pub enum Workload {
    ReadOnly,
    InsertOnly,
    DeleteInsert,
}

impl Display for Workload {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Serialize, Clone, Copy, Debug, Deserialize)]
pub enum IndexType {
    SingleHashMap,
    BTree,
    Radix,
}

impl Display for IndexType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[config(path = "bench/benchmark.toml")]
pub struct Basic {
    pub name: String,
    pub threads: Vec<usize>,
    pub time: usize,
    #[matrix]
    pub workload: Workload,
    #[matrix]
    pub index_type: IndexType,
}

struct TestBench<Index: DBIndex> {
    index: Index,
    initial_cnt: usize,
}

/// Every index here is single threaded; shumai only needs to hand it to the
/// one worker thread.
trait DBIndex: Send + Sync {
    fn insert(&self, key: u64, v: usize) -> bool;
    fn get(&self, key: u64) -> Option<usize>;
    fn remove(&self, key: u64) -> Option<usize>;
}

struct BTreeMapWrapper {
    map: UnsafeCell<BTreeMap<u64, usize>>, // only allow single thread access
}

impl BTreeMapWrapper {
    fn new() -> Self {
        Self {
            map: UnsafeCell::new(BTreeMap::new()),
        }
    }
}

unsafe impl Send for BTreeMapWrapper {}
unsafe impl Sync for BTreeMapWrapper {}

impl DBIndex for BTreeMapWrapper {
    fn insert(&self, key: u64, v: usize) -> bool {
        unsafe { (*self.map.get()).insert(key, v).is_none() }
    }

    fn get(&self, key: u64) -> Option<usize> {
        unsafe { (*self.map.get()).get(&key).cloned() }
    }

    fn remove(&self, key: u64) -> Option<usize> {
        unsafe { (*self.map.get()).remove(&key) }
    }
}

/// A single thread hash map, the usual baseline for point lookups.
struct SingleThreadHashMap {
    map: UnsafeCell<HashMap<u64, usize>>, // only allow single thread access
}

impl SingleThreadHashMap {
    fn new(cap: usize) -> Self {
        Self {
            map: UnsafeCell::new(HashMap::with_capacity(cap)),
        }
    }
}

unsafe impl Send for SingleThreadHashMap {}
unsafe impl Sync for SingleThreadHashMap {}

impl DBIndex for SingleThreadHashMap {
    fn insert(&self, key: u64, v: usize) -> bool {
        unsafe { (*self.map.get()).insert(key, v).is_none() }
    }

    fn get(&self, key: u64) -> Option<usize> {
        unsafe { (*self.map.get()).get(&key).cloned() }
    }

    fn remove(&self, key: u64) -> Option<usize> {
        unsafe { (*self.map.get()).remove(&key) }
    }
}

struct RadixWrapper {
    index: UnsafeCell<RadixIndex>, // only allow single thread access
}

impl RadixWrapper {
    fn new() -> Self {
        Self {
            index: UnsafeCell::new(RadixIndex::default()),
        }
    }
}

unsafe impl Send for RadixWrapper {}
unsafe impl Sync for RadixWrapper {}

impl DBIndex for RadixWrapper {
    fn insert(&self, key: u64, v: usize) -> bool {
        unsafe { (*self.index.get()).insert(key, v).is_ok() }
    }

    fn get(&self, key: u64) -> Option<usize> {
        unsafe { (*self.index.get()).get(key) }
    }

    fn remove(&self, key: u64) -> Option<usize> {
        unsafe { (*self.index.get()).remove(key) }
    }
}

impl<Index: DBIndex> ShumaiBench for TestBench<Index> {
    type Config = Basic;
    type Result = usize;

    fn load(&mut self) -> Option<serde_json::Value> {
        for i in 0..self.initial_cnt {
            self.index.insert(hash_key(i), i);
        }
        None
    }

    fn run(&self, context: shumai::Context<Self::Config>) -> Self::Result {
        let mut op_cnt = 0;
        let mut rng = thread_rng();

        context.wait_for_start();

        let mut i = 0;
        while context.is_running() {
            match context.config.workload {
                Workload::ReadOnly => {
                    if i == self.initial_cnt {
                        i = 0;
                    }
                    match self.index.get(hash_key(i)) {
                        Some(r) => assert_eq!(r, i),
                        None => {
                            println!("Reached here for key: {}", i);
                            continue;
                        }
                    };
                    i += 1;
                }
                Workload::InsertOnly => {
                    let val = rng.r#gen::<u64>();
                    self.index.insert(val, val as usize);
                }
                Workload::DeleteInsert => {
                    let v = rng.gen_range(0..self.initial_cnt);
                    let key = hash_key(v);
                    if let Some(old) = self.index.remove(key) {
                        assert_eq!(old, v);
                        self.index.insert(key, v);
                    }
                }
            }

            op_cnt += 1;
        }
        op_cnt
    }

    fn cleanup(&mut self) -> Option<serde_json::Value> {
        None
    }
}

fn hash_key(key: usize) -> u64 {
    const MULTIPLIER: u64 = 0x9e3779b97f4a7c15;
    (key as u64).wrapping_mul(MULTIPLIER)
}

fn main() {
    let config = Basic::load().expect("Failed to parse config!");
    let repeat = 3;
    let initial_cnt = 10_000_000;

    for c in config.iter() {
        if c.threads.len() > 1 || c.threads[0] != 1 {
            panic!("{} only support single thread!", c.index_type);
        }
        match c.index_type {
            IndexType::BTree => {
                let mut test_bench = TestBench {
                    index: BTreeMapWrapper::new(),
                    initial_cnt,
                };
                let result = shumai::run(&mut test_bench, c, repeat);
                result.write_json().unwrap();
            }
            IndexType::SingleHashMap => {
                let mut test_bench = TestBench {
                    index: SingleThreadHashMap::new(initial_cnt),
                    initial_cnt,
                };
                let result = shumai::run(&mut test_bench, c, repeat);
                result.write_json().unwrap();
            }
            IndexType::Radix => {
                let mut test_bench = TestBench {
                    index: RadixWrapper::new(),
                    initial_cnt,
                };
                let result = shumai::run(&mut test_bench, c, repeat);
                result.write_json().unwrap();
            }
        }
    }
}
