pub mod edge;
pub mod graph;
pub mod traversal;

pub use edge::*;
pub use graph::*;
pub use traversal::*;
