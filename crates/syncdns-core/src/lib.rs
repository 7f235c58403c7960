//! Core types and traits for syncdns.
//!
//! This crate provides the foundational pieces shared by the client and the
//! reconciliation engine:
//!
//! - **Types**: [`RewriteRule`], [`ContainerId`] and [`ContainerEvent`]
//! - **Label grammar**: [`label::parse`] turns a declaration label into rules
//! - **Authority seam**: the [`RewriteAuthority`] trait
//! - **Errors**: the [`SyncError`] taxonomy
//!
//! # Example
//!
//! ```rust
//! use syncdns_core::{label, RewriteRule};
//!
//! let rules = label::parse("Rewrite(app.local, 10.0.0.5)");
//! assert_eq!(rules, vec![RewriteRule::new("app.local", "10.0.0.5")]);
//! ```

mod authority;
mod error;
pub mod label;
pub mod types;

pub use authority::RewriteAuthority;
pub use error::{Result, SyncError};
pub use types::*;
