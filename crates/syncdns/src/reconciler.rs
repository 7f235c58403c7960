//! The reconciliation engine.
//!
//! For every rule a running container declares, make sure the authority has
//! it; for every rule a stopped container owns, make sure it is gone. Calls
//! are issued only when the state store and the authority's listing show
//! they are needed.
//!
//! All work happens on one logical thread: the startup pass finishes before
//! the event loop starts, and each event is handled to completion (including
//! every authority call it causes) before the next one is read. Failures end
//! the step that hit them and are only logged; nothing is retried until a
//! later event asks for the same state again.

use futures_util::StreamExt;
use syncdns_core::{
    label, ContainerEvent, ContainerId, Result, RewriteAuthority, RewriteRule, SyncError,
    Transition,
};
use tracing::{debug, error, info, warn};

use crate::runtime::ContainerRuntime;
use crate::store::StateStore;

/// Result of trying to bring one declared rule into existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The container already owns the rule; no call was made
    AlreadyOwned,
    /// The authority already has the rule from elsewhere; it was not claimed
    PresentRemotely,
    /// The rule was created and recorded as owned
    Created,
    /// The listing or the create call failed; state is unchanged
    Failed,
}

/// Result of trying to remove one owned rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The authority no longer has the rule; no call was made
    Absent,
    /// The rule was deleted
    Deleted,
    /// The listing or the delete call failed
    Failed,
}

/// Drives the authority towards the rules declared by running containers.
pub struct Reconciler<A> {
    authority: A,
    store: StateStore,
    label: String,
}

impl<A: RewriteAuthority> Reconciler<A> {
    /// Create a reconciler reading declarations from the `label` key
    pub fn new(authority: A, store: StateStore, label: impl Into<String>) -> Self {
        Self {
            authority,
            store,
            label: label.into(),
        }
    }

    /// Ownership state as it currently stands
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Give back the state store
    pub fn into_store(self) -> StateStore {
        self.store
    }

    /// Startup pass: apply the declarations of every running container.
    ///
    /// Fails only if the runtime cannot list containers; individual rule
    /// failures are logged and skipped.
    pub async fn reconcile_running<R>(&mut self, runtime: &R) -> Result<()>
    where
        R: ContainerRuntime + ?Sized,
    {
        let containers = runtime.running_containers().await?;
        info!(count = containers.len(), "checking running containers");

        let mut created = 0;
        for container in &containers {
            debug!(container = container.id.short(), "checking container");
            if let Some(text) = container.labels.get(&self.label) {
                created += self.declare(&container.id, text).await;
            }
        }

        info!(
            containers = containers.len(),
            created,
            owned = self.store.len(),
            "startup reconciliation complete"
        );
        Ok(())
    }

    /// Consume lifecycle events until the stream ends.
    ///
    /// Stream errors are logged and the loop keeps going. The stream ending
    /// means the runtime went away, which is reported as an error.
    pub async fn run<R>(&mut self, runtime: &R) -> Result<()>
    where
        R: ContainerRuntime + ?Sized,
    {
        info!("watching container events");
        let mut events = runtime.events();

        while let Some(item) = events.next().await {
            match item {
                Ok(event) => self.handle_event(runtime, &event).await,
                Err(e) => warn!(error = %e, "error receiving container events"),
            }
        }

        Err(SyncError::Runtime(String::from("container event stream ended")))
    }

    /// Apply a single lifecycle event.
    pub async fn handle_event<R>(&mut self, runtime: &R, event: &ContainerEvent)
    where
        R: ContainerRuntime + ?Sized,
    {
        match event.transition() {
            Transition::Activate => {
                let labels = match runtime.container_labels(&event.id).await {
                    Ok(labels) => labels,
                    Err(e) => {
                        warn!(container = event.id.short(), error = %e, "failed to inspect container");
                        return;
                    }
                };
                if let Some(text) = labels.get(&self.label) {
                    info!(
                        container = event.id.short(),
                        action = %event.action,
                        "container with rewrite label started"
                    );
                    self.declare(&event.id, text).await;
                }
            }
            Transition::Deactivate => self.release(&event.id, &event.action).await,
            Transition::Ignore => {
                debug!(container = event.id.short(), action = %event.action, "ignoring event");
            }
        }
    }

    /// Create transition for one declared rule.
    ///
    /// A rule the authority already has but this container does not own is
    /// left alone and not recorded. Its container therefore cannot remove it
    /// later, even if that container is the one that originally declared it.
    pub async fn create(&mut self, id: &ContainerId, rule: &RewriteRule) -> CreateOutcome {
        if self.store.has(id, rule) {
            debug!(container = id.short(), domain = %rule.domain, answer = %rule.target, "rewrite already owned");
            return CreateOutcome::AlreadyOwned;
        }

        match self.authority.contains(rule).await {
            Ok(true) => {
                info!(
                    container = id.short(),
                    domain = %rule.domain,
                    answer = %rule.target,
                    "rewrite already present in authority, not claiming it"
                );
                return CreateOutcome::PresentRemotely;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(
                    container = id.short(),
                    domain = %rule.domain,
                    answer = %rule.target,
                    error = %e,
                    "could not list authority rewrites, skipping create"
                );
                return CreateOutcome::Failed;
            }
        }

        if let Err(e) = self.authority.create_rule(rule).await {
            warn!(
                container = id.short(),
                domain = %rule.domain,
                answer = %rule.target,
                error = %e,
                "failed to create rewrite"
            );
            return CreateOutcome::Failed;
        }

        info!(container = id.short(), domain = %rule.domain, answer = %rule.target, "rewrite created");
        if let Err(e) = self.store.append(id, rule.clone()) {
            error!(container = id.short(), error = %e, "failed to save state");
        }
        CreateOutcome::Created
    }

    /// Delete transition for one owned rule.
    ///
    /// Never touches the state store; the caller drops the whole entry once
    /// every owned rule has been tried.
    pub async fn delete(&self, id: &ContainerId, rule: &RewriteRule) -> DeleteOutcome {
        match self.authority.contains(rule).await {
            Ok(true) => {}
            Ok(false) => {
                info!(container = id.short(), domain = %rule.domain, answer = %rule.target, "rewrite not in authority");
                return DeleteOutcome::Absent;
            }
            Err(e) => {
                warn!(
                    container = id.short(),
                    domain = %rule.domain,
                    answer = %rule.target,
                    error = %e,
                    "could not list authority rewrites, skipping delete"
                );
                return DeleteOutcome::Failed;
            }
        }

        match self.authority.delete_rule(rule).await {
            Ok(()) => {
                info!(container = id.short(), domain = %rule.domain, answer = %rule.target, "rewrite removed");
                DeleteOutcome::Deleted
            }
            Err(e) => {
                warn!(
                    container = id.short(),
                    domain = %rule.domain,
                    answer = %rule.target,
                    error = %e,
                    "failed to remove rewrite"
                );
                DeleteOutcome::Failed
            }
        }
    }

    /// Run the create transition for each rule in a declaration label.
    ///
    /// Returns how many rules were newly created.
    async fn declare(&mut self, id: &ContainerId, text: &str) -> usize {
        let rules = label::parse(text);
        if rules.is_empty() {
            warn!(container = id.short(), label = %text, "rewrite label declares no rewrites");
            return 0;
        }

        let mut created = 0;
        for rule in &rules {
            if self.create(id, rule).await == CreateOutcome::Created {
                created += 1;
            }
        }
        created
    }

    /// Remove every rule `id` owns, then forget the container.
    ///
    /// The entry is dropped whatever the individual deletes returned.
    async fn release(&mut self, id: &ContainerId, action: &str) {
        let owned = self.store.get(id).to_vec();
        for rule in &owned {
            self.delete(id, rule).await;
        }

        match self.store.remove(id) {
            Ok(true) => info!(container = id.short(), action, released = owned.len(), "container released its rewrites"),
            Ok(false) => debug!(container = id.short(), action, "container owns no rewrites"),
            Err(e) => error!(container = id.short(), error = %e, "failed to save state"),
        }
    }
}
