//! Project context cache: the open project and its fetched resources.
//!
//! None of these operations perform network I/O. Commands fetch first, then
//! apply the result here.

use serde::{Deserialize, Serialize};

use crate::models::{ProjectPatch, ProjectRef, Resource};
use crate::store::{StateStore, StoreError};

/// Storage key of the persisted project context.
pub const PROJECT_CONTEXT_KEY: &str = "atlas_project_context";

/// What gets persisted: the project reference with its resource list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectState {
    #[serde(flatten)]
    pub project: ProjectRef,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// Issued before a resource fetch; see [`ProjectContext::apply_fetched`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    project_id: String,
    generation: u64,
}

impl FetchTicket {
    pub fn project_id(&self) -> &str {
        &self.project_id
    }
}

#[derive(Debug)]
pub struct ProjectContext<S> {
    store: S,
    state: ProjectState,
    /// Bumped whenever the active project changes identity.
    generation: u64,
}

impl<S: StateStore> ProjectContext<S> {
    /// Load the persisted context. Unreadable state starts empty.
    pub fn load(store: S) -> Self {
        let state = match store.get(PROJECT_CONTEXT_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to parse saved project");
                ProjectState::default()
            }),
            Ok(None) => ProjectState::default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read saved project");
                ProjectState::default()
            }
        };
        Self {
            store,
            state,
            generation: 0,
        }
    }

    /// The active project, if one is open.
    pub fn active(&self) -> Option<&ProjectRef> {
        Some(&self.state.project).filter(|p| p.is_set())
    }

    pub const fn project(&self) -> &ProjectRef {
        &self.state.project
    }

    pub fn resources(&self) -> &[Resource] {
        &self.state.resources
    }

    /// Shallow-merge `patch` into the held project, last write wins.
    ///
    /// Switching to a different project id drops the cached resources, which
    /// belong to the old project.
    pub fn set_active_project(&mut self, patch: ProjectPatch) -> Result<(), StoreError> {
        if let Some(id) = &patch.id {
            if *id != self.state.project.id {
                tracing::debug!(from = %self.state.project.id, to = %id, "switching project");
                self.state.resources.clear();
                self.generation += 1;
            }
        }
        self.state.project.merge(patch);
        self.persist()
    }

    /// Replace the resource list wholesale.
    pub fn set_resources(&mut self, resources: Vec<Resource>) -> Result<(), StoreError> {
        self.state.resources = resources;
        self.persist()
    }

    /// Append one resource. Entries with a duplicate id are kept.
    pub fn add_resource(&mut self, resource: Resource) -> Result<(), StoreError> {
        self.state.resources.push(resource);
        self.persist()
    }

    /// First resource with the given id.
    pub fn get_resource_by_id(&self, id: &str) -> Option<&Resource> {
        self.state.resources.iter().find(|r| r.id == id)
    }

    /// Forget the active project.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.state = ProjectState::default();
        self.generation += 1;
        self.persist()
    }

    /// Ticket for a resource fetch against the active project.
    pub fn begin_fetch(&self) -> Option<FetchTicket> {
        self.active().map(|p| FetchTicket {
            project_id: p.id.clone(),
            generation: self.generation,
        })
    }

    /// Apply a fetched list if the project is still the one it was fetched
    /// for. Returns false when the response arrived late and was dropped.
    pub fn apply_fetched(
        &mut self,
        ticket: &FetchTicket,
        resources: Vec<Resource>,
    ) -> Result<bool, StoreError> {
        if ticket.generation != self.generation || ticket.project_id != self.state.project.id {
            tracing::debug!(project_id = %ticket.project_id, "dropping late resource list");
            return Ok(false);
        }
        self.set_resources(resources)?;
        Ok(true)
    }

    fn persist(&self) -> Result<(), StoreError> {
        if self.state.project.is_set() {
            let raw = serde_json::to_string(&self.state)?;
            self.store.set(PROJECT_CONTEXT_KEY, &raw)
        } else {
            self.store.remove(PROJECT_CONTEXT_KEY)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::store::MemoryStore;

    fn resource(id: &str) -> Resource {
        Resource {
            id: id.to_string(),
            file_name: format!("{id}.pdf"),
            file_type: "pdf".to_string(),
            file_url: None,
            parsed_text: None,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            created_by: "ada".to_string(),
            project_id: Some("p1".to_string()),
        }
    }

    fn open_p1(store: MemoryStore) -> ProjectContext<MemoryStore> {
        let mut ctx = ProjectContext::load(store);
        ctx.set_active_project(ProjectPatch::default().id("p1").name("Alpha"))
            .unwrap();
        ctx
    }

    #[test]
    fn test_merge_not_replace() {
        let mut ctx = open_p1(MemoryStore::default());
        ctx.set_active_project(ProjectPatch::default().description("x"))
            .unwrap();

        let project = ctx.active().unwrap();
        assert_eq!(project.id, "p1");
        assert_eq!(project.name, "Alpha");
        assert_eq!(project.description, "x");
    }

    #[test]
    fn test_added_resource_is_found() {
        let mut ctx = open_p1(MemoryStore::default());
        ctx.set_resources(vec![resource("r1"), resource("r2")]).unwrap();
        ctx.add_resource(resource("r3")).unwrap();

        assert_eq!(ctx.get_resource_by_id("r3").map(|r| r.id.as_str()), Some("r3"));
        assert!(ctx.get_resource_by_id("missing").is_none());
    }

    #[test]
    fn test_add_resource_does_not_dedup() {
        let mut ctx = open_p1(MemoryStore::default());
        ctx.add_resource(resource("r1")).unwrap();
        ctx.add_resource(resource("r1")).unwrap();

        assert_eq!(ctx.resources().iter().filter(|r| r.id == "r1").count(), 2);
    }

    #[test]
    fn test_persisted_and_reloaded() {
        let store = MemoryStore::default();
        let mut ctx = open_p1(store.clone());
        ctx.add_resource(resource("r1")).unwrap();

        let raw = store.get(PROJECT_CONTEXT_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["id"], "p1");
        assert_eq!(value["resources"][0]["id"], "r1");

        let reloaded = ProjectContext::load(store);
        assert_eq!(reloaded.project().name, "Alpha");
        assert_eq!(reloaded.resources().len(), 1);
    }

    #[test]
    fn test_nothing_persisted_without_id() {
        let store = MemoryStore::default();
        let mut ctx = ProjectContext::load(store.clone());
        ctx.set_active_project(ProjectPatch::default().name("no id yet"))
            .unwrap();
        assert!(ctx.active().is_none());
        assert_eq!(store.get(PROJECT_CONTEXT_KEY).unwrap(), None);
    }

    #[test]
    fn test_corrupt_saved_project_is_ignored() {
        let store = MemoryStore::default();
        store.set(PROJECT_CONTEXT_KEY, "{oops").unwrap();
        let ctx = ProjectContext::load(store);
        assert!(ctx.active().is_none());
        assert!(ctx.resources().is_empty());
    }

    #[test]
    fn test_switching_project_drops_resources() {
        let mut ctx = open_p1(MemoryStore::default());
        ctx.add_resource(resource("r1")).unwrap();

        ctx.set_active_project(ProjectPatch::default().id("p1").doc_url("https://d"))
            .unwrap();
        assert_eq!(ctx.resources().len(), 1);

        ctx.set_active_project(ProjectPatch::default().id("p2").name("Beta"))
            .unwrap();
        assert!(ctx.resources().is_empty());
        assert_eq!(ctx.project().doc_url.as_deref(), Some("https://d"));
    }

    #[test]
    fn test_late_fetch_is_dropped() {
        let mut ctx = open_p1(MemoryStore::default());
        let ticket = ctx.begin_fetch().unwrap();
        assert_eq!(ticket.project_id(), "p1");

        ctx.set_active_project(ProjectPatch::default().id("p2")).unwrap();
        assert!(!ctx.apply_fetched(&ticket, vec![resource("r1")]).unwrap());
        assert!(ctx.resources().is_empty());

        let ticket = ctx.begin_fetch().unwrap();
        assert!(ctx.apply_fetched(&ticket, vec![resource("r1")]).unwrap());
        assert_eq!(ctx.resources().len(), 1);
    }

    #[test]
    fn test_clear_removes_saved_state() {
        let store = MemoryStore::default();
        let mut ctx = open_p1(store.clone());
        let ticket = ctx.begin_fetch().unwrap();

        ctx.clear().unwrap();
        assert!(ctx.active().is_none());
        assert!(ctx.begin_fetch().is_none());
        assert_eq!(store.get(PROJECT_CONTEXT_KEY).unwrap(), None);
        assert!(!ctx.apply_fetched(&ticket, vec![resource("r1")]).unwrap());
    }
}
