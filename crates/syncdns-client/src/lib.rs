//! HTTP client for the AdGuard Home rewrite API.
//!
//! This crate provides [`AuthorityClient`], which lists, adds and deletes DNS
//! rewrites and implements [`syncdns_core::RewriteAuthority`] for the engine.
//!
//! ```rust,ignore
//! use syncdns_client::AuthorityClient;
//!
//! let client = AuthorityClient::builder("http://adguard.lan:3000", "admin", "secret").build()?;
//! for rule in client.rewrites().list().await? {
//!     println!("{rule}");
//! }
//! ```

mod client;
pub mod api;

pub use client::{AuthorityClient, AuthorityClientBuilder};
pub use syncdns_core::{Result, SyncError};
