use crate::shopify::ShopifyError;
use crate::shopify::graphql::{UserError, reject_user_errors};
use serde::{Deserialize, Serialize};

pub const FILE_CREATE: &str = r#"
mutation fileCreate($files: [FileCreateInput!]!) {
  fileCreate(files: $files) {
    files { id fileStatus }
    userErrors { field message }
  }
}
"#;

pub const MEDIA_STATUS: &str = r#"
query getFile($id: ID!) {
  node(id: $id) {
    ... on MediaImage {
      fileStatus
      image { url }
    }
  }
}
"#;

#[derive(Debug, Serialize)]
pub struct FileCreateVariables<'a> {
    pub files: Vec<FileCreateInput<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCreateInput<'a> {
    pub original_source: &'a str,
    pub content_type: &'static str,
}

impl<'a> FileCreateVariables<'a> {
    pub fn image(source_url: &'a str) -> Self {
        Self {
            files: vec![FileCreateInput {
                original_source: source_url,
                content_type: "IMAGE",
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCreateData {
    pub file_create: Option<FileCreatePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCreatePayload {
    #[serde(default)]
    pub files: Vec<CreatedFile>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
pub struct CreatedFile {
    pub id: Option<String>,
}

impl FileCreateData {
    pub fn into_file_id(self) -> Result<String, ShopifyError> {
        let payload = self
            .file_create
            .ok_or(ShopifyError::MissingData("fileCreate"))?;
        reject_user_errors(payload.user_errors)?;
        payload
            .files
            .into_iter()
            .find_map(|file| file.id)
            .ok_or(ShopifyError::MissingData("fileCreate.files"))
    }
}

#[derive(Debug, Serialize)]
pub struct NodeVariables<'a> {
    pub id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct MediaStatusData {
    pub node: Option<MediaNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaNode {
    #[serde(default)]
    pub file_status: Option<FileStatus>,
    #[serde(default)]
    pub image: Option<MediaImage>,
}

#[derive(Debug, Deserialize)]
pub struct MediaImage {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileStatus {
    Uploaded,
    Processing,
    Ready,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Processing state of an uploaded media object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaStatus {
    pub status: FileStatus,
    pub url: Option<String>,
}

impl MediaStatusData {
    pub fn into_status(self) -> MediaStatus {
        let Some(node) = self.node else {
            return MediaStatus {
                status: FileStatus::Unknown,
                url: None,
            };
        };
        MediaStatus {
            status: node.file_status.unwrap_or(FileStatus::Unknown),
            url: node
                .image
                .and_then(|image| image.url)
                .filter(|url| !url.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_create_variables_match_wire_shape() {
        let value = serde_json::to_value(FileCreateVariables::image("https://img.test/a.png")).unwrap();
        assert_eq!(
            value,
            json!({"files": [{"originalSource": "https://img.test/a.png", "contentType": "IMAGE"}]})
        );
    }

    #[test]
    fn created_file_id_extracted() {
        let data: FileCreateData = serde_json::from_value(json!({
            "fileCreate": {
                "files": [{"id": "gid://shopify/MediaImage/1", "fileStatus": "UPLOADED"}],
                "userErrors": []
            }
        }))
        .unwrap();
        assert_eq!(data.into_file_id().unwrap(), "gid://shopify/MediaImage/1");
    }

    #[test]
    fn user_errors_fail_even_with_files() {
        let data: FileCreateData = serde_json::from_value(json!({
            "fileCreate": {
                "files": [{"id": "gid://shopify/MediaImage/1"}],
                "userErrors": [{"field": ["files", "0", "originalSource"], "message": "invalid"}]
            }
        }))
        .unwrap();
        assert!(matches!(
            data.into_file_id(),
            Err(ShopifyError::UserErrors(errors)) if errors.len() == 1
        ));
    }

    #[test]
    fn empty_file_list_is_missing_data() {
        let data: FileCreateData =
            serde_json::from_value(json!({"fileCreate": {"files": [], "userErrors": []}})).unwrap();
        assert!(matches!(
            data.into_file_id(),
            Err(ShopifyError::MissingData("fileCreate.files"))
        ));
    }

    #[test]
    fn media_status_ready_with_url() {
        let data: MediaStatusData = serde_json::from_value(json!({
            "node": {"fileStatus": "READY", "image": {"url": "https://cdn.shopify.com/s/files/a.png"}}
        }))
        .unwrap();
        assert_eq!(
            data.into_status(),
            MediaStatus {
                status: FileStatus::Ready,
                url: Some("https://cdn.shopify.com/s/files/a.png".into()),
            }
        );
    }

    #[test]
    fn media_status_still_processing() {
        let data: MediaStatusData =
            serde_json::from_value(json!({"node": {"fileStatus": "PROCESSING", "image": null}}))
                .unwrap();
        let status = data.into_status();
        assert_eq!(status.status, FileStatus::Processing);
        assert!(status.url.is_none());
    }

    #[test]
    fn unknown_status_and_missing_node_tolerated() {
        let data: MediaStatusData =
            serde_json::from_value(json!({"node": {"fileStatus": "SOMETHING_NEW"}})).unwrap();
        assert_eq!(data.into_status().status, FileStatus::Unknown);

        let data: MediaStatusData = serde_json::from_value(json!({"node": null})).unwrap();
        assert_eq!(data.into_status().url, None);
    }
}
