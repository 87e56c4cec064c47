//! Data models for MindGrid entities.

mod doc;
mod graph;
mod project;
mod resource;
mod session;
mod workflow;

pub use doc::{DocsResponse, GoogleDoc};
pub use graph::{GraphData, GraphLink, GraphNode};
pub use project::{NewProject, ProjectPatch, ProjectRef};
pub use resource::{NewResource, Resource, ResourceList};
pub use session::{Credentials, Session, UserProfile};
pub use workflow::{
    FlowEdge, FlowGraph, FlowNode, NewWorkflow, OutputMode, OutputRule, Workflow, WorkflowAction,
};

use serde::{Deserialize, Deserializer};

/// Deserialize a nullable field into its default value.
///
/// The backend returns `null` for empty text columns.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize an identifier that may arrive as a JSON string or number.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(i) => i.to_string(),
        Id::Float(f) => f.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Row {
        #[serde(deserialize_with = "string_or_number")]
        id: String,
        #[serde(default, deserialize_with = "null_as_default")]
        note: String,
    }

    #[test]
    fn test_numeric_id_and_null_text() {
        let row: Row = serde_json::from_str(r#"{"id": 42, "note": null}"#).unwrap();
        assert_eq!(row.id, "42");
        assert_eq!(row.note, "");

        let row: Row = serde_json::from_str(r#"{"id": "abc"}"#).unwrap();
        assert_eq!(row.id, "abc");
        assert_eq!(row.note, "");
    }
}
