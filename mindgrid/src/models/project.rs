//! Project reference model.

use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Identifying metadata of a project as cached client-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    #[serde(default, deserialize_with = "super::string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Linked Google Doc, if the project has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_url: Option<String>,
}

impl ProjectRef {
    /// Shallow-merge a patch into this reference. Fields set in the patch win.
    pub fn merge(&mut self, patch: ProjectPatch) {
        if let Some(id) = patch.id {
            self.id = id;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(doc_url) = patch.doc_url {
            self.doc_url = Some(doc_url);
        }
    }

    /// Whether this reference points at a project at all.
    pub fn is_set(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Partial update for the active project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub doc_url: Option<String>,
}

impl ProjectPatch {
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn doc_url(mut self, doc_url: impl Into<String>) -> Self {
        self.doc_url = Some(doc_url.into());
        self
    }
}

impl From<ProjectRef> for ProjectPatch {
    fn from(project: ProjectRef) -> Self {
        Self {
            id: Some(project.id),
            name: Some(project.name),
            description: Some(project.description),
            doc_url: project.doc_url,
        }
    }
}

/// Body of `POST /projects/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut project = ProjectRef::default();
        project.merge(ProjectPatch::default().id("p1").name("Alpha"));
        project.merge(ProjectPatch::default().description("x"));

        assert_eq!(project.id, "p1");
        assert_eq!(project.name, "Alpha");
        assert_eq!(project.description, "x");
        assert_eq!(project.doc_url, None);
    }

    #[test]
    fn test_backend_row_with_extra_columns() {
        let row = r#"{"id": 7, "name": "Atlas", "description": null, "created_at": "2025-01-01"}"#;
        let project: ProjectRef = serde_json::from_str(row).unwrap();
        assert_eq!(project.id, "7");
        assert_eq!(project.description, "");
        assert!(project.is_set());
    }
}
