mod container;
mod rewrite;

pub use container::*;
pub use rewrite::*;
