pub mod chips;
pub mod graph;

pub use graph::Direction;
