//! Knowledge graph payload for a project.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Nodes and links as returned by `GET /graph`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub links: Vec<GraphLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    #[serde(deserialize_with = "super::string_or_number")]
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// One of `Project`, `Resource` or `Concept`.
    #[serde(default)]
    pub group: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphLink {
    #[serde(deserialize_with = "super::string_or_number")]
    pub source: String,
    #[serde(deserialize_with = "super::string_or_number")]
    pub target: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl GraphData {
    /// Number of nodes per group.
    pub fn group_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for node in &self.nodes {
            *counts.entry(node.group.as_str()).or_insert(0) += 1;
        }
        counts
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Links leaving `id`.
    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a GraphLink> + 'a {
        self.links.iter().filter(move |l| l.source == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_counts_and_outgoing() {
        let body = r#"{
            "nodes": [
                {"id": 1, "label": "Atlas", "group": "Project"},
                {"id": 2, "label": "notes.pdf", "group": "Resource"},
                {"id": "c1", "label": "Rust", "group": "Concept"},
                {"id": "c2", "label": "Graphs", "group": "Concept"}
            ],
            "links": [
                {"source": 1, "target": 2, "type": "HAS_RESOURCE"},
                {"source": 2, "target": "c1"},
                {"source": 2, "target": "c2"}
            ]
        }"#;
        let graph: GraphData = serde_json::from_str(body).unwrap();

        let counts = graph.group_counts();
        assert_eq!(counts.get("Concept"), Some(&2));
        assert_eq!(counts.get("Project"), Some(&1));

        let targets: Vec<_> = graph.outgoing("2").map(|l| l.target.as_str()).collect();
        assert_eq!(targets, vec!["c1", "c2"]);
        assert_eq!(graph.node("1").map(|n| n.label.as_str()), Some("Atlas"));
    }
}
