//! API endpoint modules.

mod rewrite;

pub use rewrite::RewriteApi;
