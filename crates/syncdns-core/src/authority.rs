//! The seam between the reconciler and the external rewrite authority.

use async_trait::async_trait;

use crate::{Result, RewriteRule};

/// An external service that stores DNS rewrite rules.
///
/// The authority only knows whether a rule exists. It has no idea which
/// container asked for it; ownership is tracked by the engine's state store.
///
/// Implementations perform exactly one remote call per method and never
/// retry.
#[async_trait]
pub trait RewriteAuthority: Send + Sync {
    /// List every rewrite currently configured
    async fn list_rules(&self) -> Result<Vec<RewriteRule>>;

    /// Create one rewrite
    async fn create_rule(&self, rule: &RewriteRule) -> Result<()>;

    /// Delete the rewrite matching both domain and answer
    async fn delete_rule(&self, rule: &RewriteRule) -> Result<()>;

    /// Whether the authority currently holds exactly this rule
    async fn contains(&self, rule: &RewriteRule) -> Result<bool> {
        Ok(self.list_rules().await?.iter().any(|r| r == rule))
    }
}
