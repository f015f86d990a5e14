pub mod cache;
pub mod session_cache;

pub use cache::*;
pub use session_cache::*;
