//! In-memory stand-ins for the authority and the container runtime.

#![allow(dead_code)]

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use syncdns::{
    ContainerEvent, ContainerId, ContainerRuntime, Result, RewriteAuthority, RewriteRule,
    RunningContainer, StateStore, SyncError,
};
use tempfile::TempDir;

pub const LABEL: &str = "syncdns.rewrites";

/// Authority that keeps rules in memory and records every call.
#[derive(Clone, Default)]
pub struct FakeAuthority {
    inner: Arc<Mutex<AuthorityState>>,
}

#[derive(Default)]
pub struct AuthorityState {
    pub rules: Vec<RewriteRule>,
    pub lists: usize,
    pub creates: Vec<RewriteRule>,
    pub deletes: Vec<RewriteRule>,
    pub fail_list: bool,
    pub fail_create: bool,
    pub fail_delete: bool,
}

impl FakeAuthority {
    pub fn with_rules(rules: Vec<RewriteRule>) -> Self {
        let authority = Self::default();
        authority.state().rules = rules;
        authority
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, AuthorityState> {
        self.inner.lock().unwrap()
    }
}

#[async_trait]
impl RewriteAuthority for FakeAuthority {
    async fn list_rules(&self) -> Result<Vec<RewriteRule>> {
        let mut state = self.state();
        state.lists += 1;
        if state.fail_list {
            return Err(SyncError::BadResponse(String::from("expected value at line 1")));
        }
        Ok(state.rules.clone())
    }

    async fn create_rule(&self, rule: &RewriteRule) -> Result<()> {
        let mut state = self.state();
        state.creates.push(rule.clone());
        if state.fail_create {
            return Err(SyncError::Rejected {
                code: 400,
                message: String::from("rejected"),
            });
        }
        state.rules.push(rule.clone());
        Ok(())
    }

    async fn delete_rule(&self, rule: &RewriteRule) -> Result<()> {
        let mut state = self.state();
        state.deletes.push(rule.clone());
        if state.fail_delete {
            return Err(SyncError::Unreachable(String::from("connection reset")));
        }
        state.rules.retain(|r| r != rule);
        Ok(())
    }
}

/// Runtime with a fixed set of containers and a scripted event feed.
#[derive(Default)]
pub struct FakeRuntime {
    pub running: Vec<RunningContainer>,
    pub labels: HashMap<ContainerId, HashMap<String, String>>,
    events: Mutex<Vec<Result<ContainerEvent>>>,
}

impl FakeRuntime {
    /// Register a running container with the given declaration label.
    pub fn with_container(mut self, id: &str, declaration: Option<&str>) -> Self {
        let labels = labels(declaration);
        self.running.push(RunningContainer {
            id: ContainerId::new(id),
            labels: labels.clone(),
        });
        self.labels.insert(ContainerId::new(id), labels);
        self
    }

    /// Make a container inspectable without it being in the running list.
    pub fn with_inspectable(mut self, id: &str, declaration: Option<&str>) -> Self {
        self.labels.insert(ContainerId::new(id), labels(declaration));
        self
    }

    pub fn with_events(self, events: Vec<Result<ContainerEvent>>) -> Self {
        *self.events.lock().unwrap() = events;
        self
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn running_containers(&self) -> Result<Vec<RunningContainer>> {
        Ok(self.running.clone())
    }

    async fn container_labels(&self, id: &ContainerId) -> Result<HashMap<String, String>> {
        self.labels
            .get(id)
            .cloned()
            .ok_or_else(|| SyncError::Runtime(format!("No such container: {id}")))
    }

    fn events(&self) -> BoxStream<'_, Result<ContainerEvent>> {
        let events = std::mem::take(&mut *self.events.lock().unwrap());
        stream::iter(events).boxed()
    }
}

pub fn labels(declaration: Option<&str>) -> HashMap<String, String> {
    let mut labels = HashMap::new();
    labels.insert(String::from("com.docker.compose.service"), String::from("app"));
    if let Some(text) = declaration {
        labels.insert(String::from(LABEL), text.to_string());
    }
    labels
}

pub fn rule(domain: &str, target: &str) -> RewriteRule {
    RewriteRule::new(domain, target)
}

pub fn id(s: &str) -> ContainerId {
    ContainerId::new(s)
}

pub fn event(container: &str, action: &str) -> Result<ContainerEvent> {
    Ok(ContainerEvent::new(container, action))
}

/// A fresh state store inside `dir`.
pub fn store(dir: &TempDir) -> StateStore {
    StateStore::open(dir.path().join("state.json")).unwrap()
}

/// Parse the state file straight from disk.
pub fn on_disk(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}
