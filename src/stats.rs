use std::fmt::Display;

use crate::{
    NodeKind, NodeTracker,
    index_inner::{IndexInner, IndexVisitor},
    nodes::NodeId,
    utils::RADIX_SIZE,
};

/// Node counts per tree level, root level first.
#[derive(Default, Debug, serde::Serialize)]
pub struct NodeStats(Vec<LevelStats>);

impl Display for NodeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for l in self.0.iter() {
            writeln!(
                f,
                "Height: {:2} --- || Internal: {:8}, {:8.2} || Leaf: {:8} ||",
                l.height,
                l.internal.0,
                l.load_factor(),
                l.leaves,
            )?;
        }

        let load_factor = self.load_factor();
        if load_factor < 0.5 {
            writeln!(f, "Load factor: {:.2} (too low)", load_factor)?;
        } else {
            writeln!(f, "Load factor: {:.2}", load_factor)?;
        }

        Ok(())
    }
}

impl NodeStats {
    pub fn levels(&self) -> &[LevelStats] {
        &self.0
    }

    pub fn total_nodes(&self) -> usize {
        self.0.iter().map(|l| l.internal.0 + l.leaves).sum()
    }

    pub fn internal_nodes(&self) -> usize {
        self.0.iter().map(|l| l.internal.0).sum()
    }

    pub fn kv_pairs(&self) -> usize {
        self.0.iter().map(|l| l.leaves).sum()
    }

    pub fn total_memory_bytes(&self) -> usize {
        self.internal_nodes() * NodeKind::Internal.node_size()
            + self.kv_pairs() * NodeKind::Leaf.node_size()
    }

    /// Occupied slots over available slots, across all internal nodes.
    pub fn load_factor(&self) -> f64 {
        let (nodes, occupied) = self
            .0
            .iter()
            .fold((0, 0), |acc, l| (acc.0 + l.internal.0, acc.1 + l.internal.1));
        if nodes == 0 {
            return 0.0;
        }
        occupied as f64 / (nodes * RADIX_SIZE) as f64
    }
}

#[derive(Debug, serde::Serialize, Clone)]
pub struct LevelStats {
    height: u8,
    internal: (usize, usize), // (node count, occupied slots)
    leaves: usize,
}

impl LevelStats {
    fn new_level(height: u8) -> Self {
        Self {
            height,
            internal: (0, 0),
            leaves: 0,
        }
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn internal_nodes(&self) -> usize {
        self.internal.0
    }

    /// Leaves whose parent sits at this height.
    pub fn leaves(&self) -> usize {
        self.leaves
    }

    pub fn load_factor(&self) -> f64 {
        if self.internal.0 == 0 {
            return 0.0;
        }
        self.internal.1 as f64 / (self.internal.0 * RADIX_SIZE) as f64
    }
}

struct StatsVisitor {
    root_height: u8,
    levels: Vec<LevelStats>,
}

impl StatsVisitor {
    fn level(&mut self, height: u8) -> &mut LevelStats {
        let idx = (self.root_height - height) as usize;
        while self.levels.len() <= idx {
            let h = self.root_height - self.levels.len() as u8;
            self.levels.push(LevelStats::new_level(h));
        }
        &mut self.levels[idx]
    }
}

impl IndexVisitor for StatsVisitor {
    fn visit_leaf(&mut self, _node: NodeId, _key: u64, _payload: usize, height: u8) {
        self.level(height).leaves += 1;
    }

    fn pre_visit_internal(&mut self, _node: NodeId, height: u8, occupied: usize) {
        let level = self.level(height);
        level.internal.0 += 1;
        level.internal.1 += occupied;
    }
}

impl<T: NodeTracker> IndexInner<T> {
    pub(crate) fn stats(&self) -> NodeStats {
        let mut visitor = StatsVisitor {
            root_height: self.height(),
            levels: Vec::new(),
        };
        self.dfs_visitor(&mut visitor);
        NodeStats(visitor.levels)
    }
}
