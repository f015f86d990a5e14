//! Stakeholder negotiation engine: analysis, session caching and leverage planning.

pub mod engine;
pub mod landscape;
pub mod leverage;

pub use engine::*;
pub use landscape::*;
pub use leverage::*;
