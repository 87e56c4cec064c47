//! Google Docs listed through the backend's Google integration.

use serde::{Deserialize, Serialize};

/// A Google Doc that can be imported into a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoogleDoc {
    pub id: String,
    pub name: String,
    pub modified_time: String,
    /// Owner display names joined with ", ".
    #[serde(skip_serializing)]
    pub owners: String,
}

/// Raw payload of `GET /google-services/docs` (Drive `files.list` wrapped once).
#[derive(Debug, Deserialize)]
pub struct DocsResponse {
    documents: DriveFiles,
}

#[derive(Debug, Deserialize)]
struct DriveFiles {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    #[serde(default)]
    modified_time: String,
    #[serde(default)]
    owners: Vec<DriveOwner>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveOwner {
    #[serde(default)]
    display_name: String,
}

impl DocsResponse {
    pub fn into_docs(self) -> Vec<GoogleDoc> {
        self.documents
            .files
            .into_iter()
            .map(|file| GoogleDoc {
                id: file.id,
                name: file.name,
                modified_time: file.modified_time,
                owners: file
                    .owners
                    .into_iter()
                    .map(|o| o.display_name)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
            .collect()
    }
}
