//! Keeps AdGuard Home DNS rewrites in sync with Docker container labels.
//!
//! A container asks for rewrites with a label such as
//! `syncdns.rewrites="Rewrite(app.local,10.0.0.5)"`. While it runs, the
//! rewrite exists in AdGuard Home; when it stops, the rewrite is removed again.
//! Only rewrites this process created are ever removed.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use syncdns::{daemon, SyncConfig};
//!
//! #[tokio::main]
//! async fn main() -> syncdns::Result<()> {
//!     let config = SyncConfig::new(
//!         std::env::var("AdguardURL").ok(),
//!         std::env::var("AdguardUser").ok(),
//!         std::env::var("AdguardPassword").ok(),
//!     )?;
//!     daemon::run(config).await
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS

pub mod config;
pub mod daemon;
pub mod reconciler;
pub mod runtime;
pub mod store;

pub use config::SyncConfig;
pub use reconciler::{CreateOutcome, DeleteOutcome, Reconciler};
pub use runtime::{ContainerRuntime, DockerRuntime};
pub use store::StateStore;

// Re-export core types
pub use syncdns_core::*;

// Re-export client
pub use syncdns_client::{AuthorityClient, AuthorityClientBuilder};
