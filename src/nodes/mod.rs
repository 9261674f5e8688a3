mod arena;
mod node;

pub(crate) use arena::NodeArena;
pub(crate) use node::{Node, NodeId};
pub use node::NodeKind;
