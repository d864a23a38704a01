pub mod ghost_store;
pub mod node_arena;

pub use ghost_store::GhostStore;
pub use node_arena::{NodeArena, NodeId};
