//! # syncdns-cli
//!
//! The `syncdnsd` daemon: reads its settings from flags or the environment,
//! sets up logging, and hands over to the [`syncdns`] engine.

pub mod cli;

pub use cli::run;
