//! Resource model: a project-scoped file or document record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::null_as_default;

/// A file or document belonging to one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(deserialize_with = "super::string_or_number")]
    pub id: String,
    #[serde(alias = "name")]
    pub file_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_text: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl Resource {
    /// First `max` characters of the parsed text, with an ellipsis when cut.
    pub fn preview(&self, max: usize) -> Option<String> {
        let text = self.parsed_text.as_deref()?;
        if text.chars().count() > max {
            let head: String = text.chars().take(max).collect();
            Some(format!("{head}..."))
        } else {
            Some(text.to_string())
        }
    }
}

/// Resource listings arrive either bare or wrapped in `{"resources": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ResourceList {
    Bare(Vec<Resource>),
    Wrapped { resources: Vec<Resource> },
}

impl ResourceList {
    pub fn into_vec(self) -> Vec<Resource> {
        match self {
            Self::Bare(resources) | Self::Wrapped { resources } => resources,
        }
    }
}

/// Body of `POST /resources/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewResource {
    pub name: String,
    pub description: String,
    pub link: Option<String>,
    pub project_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource_json(text: Option<&str>) -> String {
        serde_json::json!({
            "id": "r1",
            "file_name": "notes.pdf",
            "file_type": "pdf",
            "parsed_text": text,
            "created_at": "2025-03-01T10:00:00+00:00",
            "created_by": null,
        })
        .to_string()
    }

    #[test]
    fn test_preview_truncates_long_text() {
        let text = "a".repeat(40);
        let resource: Resource = serde_json::from_str(&resource_json(Some(&text))).unwrap();
        assert_eq!(resource.preview(30).unwrap(), format!("{}...", "a".repeat(30)));

        let resource: Resource = serde_json::from_str(&resource_json(Some("short"))).unwrap();
        assert_eq!(resource.preview(30).unwrap(), "short");

        let resource: Resource = serde_json::from_str(&resource_json(None)).unwrap();
        assert!(resource.preview(30).is_none());
        assert_eq!(resource.created_by, "");
    }

    #[test]
    fn test_missing_timestamp_is_rejected() {
        let body = r#"{"id": "r1", "file_name": "a", "file_type": "pdf"}"#;
        assert!(serde_json::from_str::<Resource>(body).is_err());
    }

    #[test]
    fn test_resource_list_shapes() {
        let one = resource_json(None);
        let bare: ResourceList = serde_json::from_str(&format!("[{one}]")).unwrap();
        assert_eq!(bare.into_vec().len(), 1);

        let wrapped: ResourceList =
            serde_json::from_str(&format!(r#"{{"resources": [{one}, {one}]}}"#)).unwrap();
        assert_eq!(wrapped.into_vec().len(), 2);
    }
}
