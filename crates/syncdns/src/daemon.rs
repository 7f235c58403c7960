//! Process wiring: open state, check the authority, reconcile, then watch.

use syncdns_core::{Result, RewriteAuthority};
use tracing::info;

use crate::config::SyncConfig;
use crate::reconciler::Reconciler;
use crate::runtime::{ContainerRuntime, DockerRuntime};
use crate::store::StateStore;

/// Run the engine against the local Docker daemon.
///
/// Returns only on a startup failure or when the event stream ends.
pub async fn run(config: SyncConfig) -> Result<()> {
    // Configuration errors surface before the state file is touched.
    let authority = config.authority_client()?;

    let store = StateStore::open(&config.state_path)?;
    info!(
        path = %store.path().display(),
        containers = store.len(),
        "loaded ownership state"
    );

    let runtime = DockerRuntime::connect()?;

    run_with(authority, &runtime, store, &config.label).await
}

/// Run the engine with explicit collaborators.
///
/// The authority is listed once up front: if that fails, the URL or the
/// credentials are wrong and nothing else can work.
pub async fn run_with<A, R>(authority: A, runtime: &R, store: StateStore, label: &str) -> Result<()>
where
    A: RewriteAuthority,
    R: ContainerRuntime + ?Sized,
{
    let existing = authority.list_rules().await?;
    info!(count = existing.len(), "rewrites currently in authority");
    for rule in &existing {
        info!(domain = %rule.domain, answer = %rule.target, "existing rewrite");
    }

    let mut reconciler = Reconciler::new(authority, store, label);
    reconciler.reconcile_running(runtime).await?;
    reconciler.run(runtime).await
}
