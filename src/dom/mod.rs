pub mod classify;
pub mod tree;

pub use classify::*;
pub use tree::*;
